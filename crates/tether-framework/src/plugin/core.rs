use tether_core::{BoxError, BoxedService, HookResult, Service};

use super::PluginContext;

// ─── ServiceEntry ─────────────────────────────────────────────────────────────

/// One service produced by a plugin's service factory, paired with its handle.
///
/// The handle is validated when the supervisor registers the entry, not here, so
/// an empty handle surfaces as a registration failure during `enable()`.
pub struct ServiceEntry {
    handle: String,
    service: BoxedService,
}

impl ServiceEntry {
    /// Pairs `service` with `handle`.
    pub fn new(handle: impl Into<String>, service: impl Service) -> Self {
        Self::boxed(handle, Box::new(service))
    }

    /// Pairs an already boxed service with `handle`.
    pub fn boxed(handle: impl Into<String>, service: BoxedService) -> Self {
        Self {
            handle: handle.into(),
            service,
        }
    }

    /// Returns the requested handle.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub(crate) fn into_parts(self) -> (String, BoxedService) {
        (self.handle, self.service)
    }
}

impl std::fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let service: &dyn Service = &*self.service;
        f.debug_struct("ServiceEntry")
            .field("handle", &self.handle)
            .field("service", &service.type_name())
            .finish()
    }
}

// ─── Plugin ───────────────────────────────────────────────────────────────────

/// The host plugin whose services a
/// [`LifecycleSupervisor`](crate::LifecycleSupervisor) manages.
///
/// Only [`name`](Plugin::name) and
/// [`register_services`](Plugin::register_services) are required; every
/// lifecycle hook defaults to a no-op.
///
/// # Hook order
///
/// ```text
/// enable():  init ─► register_services ─► (service init…) ─► load ─► (service load…) ─► ready
/// disable(): (service unload…) ─► unload
/// reload():  unload ─► (service unload+load…) ─► load
/// ```
pub trait Plugin {
    /// Human-readable plugin name, used in logs and as the context name.
    fn name(&self) -> &str;

    /// Called first during `enable()`. A failure aborts the enable.
    fn init(&mut self, ctx: &PluginContext) -> HookResult {
        let _ = ctx;
        Ok(())
    }

    /// Returns the plugin's services, in the order they should be registered.
    ///
    /// Called exactly once per `enable()`. A failure aborts the enable.
    fn register_services(&mut self, ctx: &PluginContext) -> Result<Vec<ServiceEntry>, BoxError>;

    /// Called before services are loaded. A failure aborts the enable; during
    /// `reload()` it is reported only.
    fn load(&mut self) -> HookResult {
        Ok(())
    }

    /// Called after every service has been loaded. Failures are reported only.
    fn ready(&mut self) -> HookResult {
        Ok(())
    }

    /// Called after services are unloaded on `disable()`, and before they are
    /// reloaded on `reload()`. Failures are reported only.
    fn unload(&mut self) -> HookResult {
        Ok(())
    }
}

impl<P: Plugin + ?Sized> Plugin for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self, ctx: &PluginContext) -> HookResult {
        (**self).init(ctx)
    }

    fn register_services(&mut self, ctx: &PluginContext) -> Result<Vec<ServiceEntry>, BoxError> {
        (**self).register_services(ctx)
    }

    fn load(&mut self) -> HookResult {
        (**self).load()
    }

    fn ready(&mut self) -> HookResult {
        (**self).ready()
    }

    fn unload(&mut self) -> HookResult {
        (**self).unload()
    }
}

/// Plugin trait object, as held by type-erased hosts.
pub type BoxedPlugin = Box<dyn Plugin>;
