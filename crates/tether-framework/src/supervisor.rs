//! Plugin lifecycle supervision.
//!
//! [`LifecycleSupervisor`] owns one [`Plugin`], the [`ServiceRegistry`] holding
//! its services, and the two host collaborators: an [`EventBinder`] for
//! listener services and a [`DiagnosticSink`] for failures. It:
//!
//! - Runs `enable()` as one ordered sequence of plugin and service hooks.
//!   Plugin-level steps and service `init` are **fatal**: the first failure
//!   aborts the sequence and is returned. Service `load` failures are
//!   **isolated**: they are recorded in the error map and the remaining
//!   services keep loading.
//! - Runs `disable()` as a best-effort teardown. Every service is unloaded even
//!   if earlier ones fail, then the registry is dropped.
//! - Runs `reload()` per service as an `unload` + `load` unit. A service whose
//!   unit succeeds has its recorded error cleared.
//! - Hands every failure to the sink as a [`Diagnostic`], and returns the
//!   non-fatal ones in a [`LifecycleReport`] as well.
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_framework::LifecycleSupervisor;
//!
//! let mut supervisor = LifecycleSupervisor::new(MyPlugin::default())
//!     .with_binder(my_event_bus)
//!     .with_sink(my_sink);
//! supervisor.enable()?;
//! // …later…
//! supervisor.reload()?;
//! supervisor.disable()?;
//! ```

use std::collections::HashMap;

use tether_core::{
    Diagnostic, DiagnosticSink, EventBinder, LifecycleError, LifecycleResult, LifecycleState,
    RegistryError, Service, ServiceHandle, Stage,
};
use tracing::{debug, info, info_span};

use crate::binder::NoopBinder;
use crate::plugin::{Plugin, PluginContext};
use crate::registry::ServiceRegistry;
use crate::sink::TracingSink;

// =============================================================================
// LifecycleReport
// =============================================================================

/// Outcome of a lifecycle operation that ran to completion.
///
/// `processed` lists every service the operation visited, in order, whether or
/// not its hook succeeded. `diagnostics` holds the non-fatal failures, already
/// delivered to the sink.
#[derive(Debug)]
pub struct LifecycleReport {
    operation: &'static str,
    processed: Vec<ServiceHandle>,
    diagnostics: Vec<Diagnostic>,
}

impl LifecycleReport {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            processed: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// `"enable"`, `"disable"` or `"reload"`.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Handles the operation visited, in registry order.
    pub fn processed(&self) -> &[ServiceHandle] {
        &self.processed
    }

    /// Every diagnostic emitted during the operation.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Handles of the services that failed, in the order they failed.
    pub fn failed_services(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.iter().filter_map(Diagnostic::handle)
    }
}

// =============================================================================
// LifecycleSupervisor
// =============================================================================

/// Drives a plugin and its services through enable, reload and disable.
///
/// Defaults to [`NoopBinder`] and [`TracingSink`]; hosts replace them with
/// [`with_binder`](Self::with_binder) and [`with_sink`](Self::with_sink).
pub struct LifecycleSupervisor<P: Plugin> {
    plugin: P,
    context: PluginContext,
    registry: ServiceRegistry,
    binder: Box<dyn EventBinder>,
    sink: Box<dyn DiagnosticSink>,
    state: LifecycleState,
}

impl<P: Plugin> LifecycleSupervisor<P> {
    /// Creates a supervisor with an empty context named after the plugin.
    pub fn new(plugin: P) -> Self {
        let context = PluginContext::new(plugin.name());
        Self {
            plugin,
            context,
            registry: ServiceRegistry::new(),
            binder: Box::new(NoopBinder),
            sink: Box::new(TracingSink),
            state: LifecycleState::Uninitialized,
        }
    }

    /// Replaces the context passed to `init` and the service factory.
    pub fn with_context(mut self, context: PluginContext) -> Self {
        self.context = context;
        self
    }

    /// Sets the binder that attaches listener services to the host's bus.
    pub fn with_binder(mut self, binder: impl EventBinder + 'static) -> Self {
        self.binder = Box::new(binder);
        self
    }

    /// Sets where diagnostics are reported.
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns a reference to the plugin.
    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    /// Returns the context handed to the plugin.
    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    /// Read-only view of the registry. Empty before `enable()` and after
    /// `disable()`.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    // ─── enable ──────────────────────────────────────────────────────────────

    /// Enables the plugin.
    ///
    /// Order: plugin `init` → service factory → per service (registration
    /// order) register + `init` → plugin `load` → per service `load` (+ bind)
    /// → plugin `ready`.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`] unless the state is
    ///   `Uninitialized` or `Unloaded`.
    /// - The first fatal failure. Services registered before it stay
    ///   registered and the state stays at the step that failed.
    pub fn enable(&mut self) -> LifecycleResult<LifecycleReport> {
        self.ensure(self.state.can_enable(), "enable")?;
        let _span = info_span!("enable", plugin = %self.context.name()).entered();
        let mut report = LifecycleReport::new("enable");

        self.state = LifecycleState::Initializing;
        if let Err(source) = self.plugin.init(&self.context) {
            let cause = LifecycleError::plugin(self.context.name(), Stage::Init, source);
            return Err(self.fatal("Failed to initialize plugin", cause));
        }

        let entries = match self.plugin.register_services(&self.context) {
            Ok(entries) => entries,
            Err(source) => {
                let cause = LifecycleError::Factory {
                    plugin: self.context.name().to_string(),
                    source,
                };
                return Err(self.fatal("Failed to create services", cause));
            }
        };
        debug!(count = entries.len(), "Service factory returned");

        for entry in entries {
            let (handle, service) = entry.into_parts();
            if let Err(err) = self.registry.register(handle, service) {
                let message = match err.handle() {
                    Some(handle) => format!("Failed to register service: {handle}"),
                    None => "Failed to register service".to_string(),
                };
                return Err(self.fatal(message, err.into()));
            }
        }

        self.state = LifecycleState::Loading;
        if let Err(source) = self.plugin.load() {
            let cause = LifecycleError::plugin(self.context.name(), Stage::Load, source);
            return Err(self.fatal("Failed to load plugin", cause));
        }

        for handle in self.handles() {
            if let Err(err) = self.registry.load_service(&handle, &mut *self.binder) {
                let diagnostic = Diagnostic::isolated(format!("Failed to load service: {handle}"), err);
                report.diagnostics.push(self.emit(diagnostic));
            }
            report.processed.push(handle);
        }

        self.state = LifecycleState::Ready;
        if let Err(source) = self.plugin.ready() {
            let cause = LifecycleError::plugin(self.context.name(), Stage::Ready, source);
            report
                .diagnostics
                .push(self.emit(Diagnostic::reported("Plugin ready hook failed", cause)));
        }

        info!(
            services = self.registry.len(),
            failed = self.registry.all_errors().len(),
            "Plugin enabled"
        );
        Ok(report)
    }

    // ─── disable ─────────────────────────────────────────────────────────────

    /// Disables the plugin.
    ///
    /// Unloads every registered service in registration order, whatever
    /// happens to its siblings, then runs plugin `unload` and drops the
    /// registry. Failures are reported, never recorded, and never abort.
    ///
    /// Also accepted after an aborted `enable()`, to release whatever was
    /// registered before the failure.
    ///
    /// # Errors
    ///
    /// Only [`LifecycleError::InvalidTransition`].
    pub fn disable(&mut self) -> LifecycleResult<LifecycleReport> {
        self.ensure(self.state.can_disable(), "disable")?;
        let _span = info_span!("disable", plugin = %self.context.name()).entered();
        let mut report = LifecycleReport::new("disable");

        self.state = LifecycleState::Unloading;
        for handle in self.handles() {
            if let Err(err) = self.registry.unload_service(&handle) {
                let diagnostic = Diagnostic::isolated(format!("Failed to unload service: {handle}"), err);
                report.diagnostics.push(self.emit(diagnostic));
            }
            report.processed.push(handle);
        }

        if let Err(source) = self.plugin.unload() {
            let cause = LifecycleError::plugin(self.context.name(), Stage::Unload, source);
            report
                .diagnostics
                .push(self.emit(Diagnostic::reported("Failed to unload plugin", cause)));
        }

        let released = self.registry.len();
        self.registry.clear();
        self.state = LifecycleState::Unloaded;
        info!(services = released, "Plugin disabled");
        Ok(report)
    }

    // ─── reload ──────────────────────────────────────────────────────────────

    /// Reloads the plugin in place.
    ///
    /// Order: plugin `unload` → per service: clear its error, then `unload` +
    /// `load` as one unit → plugin `load`. A failing unit records its error and
    /// the next service is still reloaded. Listener bindings persist; only
    /// listeners that are not bound yet get bound.
    ///
    /// # Errors
    ///
    /// Only [`LifecycleError::InvalidTransition`] (the state must be `Ready`).
    pub fn reload(&mut self) -> LifecycleResult<LifecycleReport> {
        self.ensure(self.state.can_reload(), "reload")?;
        let _span = info_span!("reload", plugin = %self.context.name()).entered();
        let mut report = LifecycleReport::new("reload");

        if let Err(source) = self.plugin.unload() {
            let cause = LifecycleError::plugin(self.context.name(), Stage::Unload, source);
            report
                .diagnostics
                .push(self.emit(Diagnostic::reported("Failed to unload plugin", cause)));
        }

        for handle in self.handles() {
            if let Err(err) = self.registry.reload_service(&handle, &mut *self.binder) {
                let diagnostic = Diagnostic::isolated(format!("Failed to reload service: {handle}"), err);
                report.diagnostics.push(self.emit(diagnostic));
            }
            report.processed.push(handle);
        }

        if let Err(source) = self.plugin.load() {
            let cause = LifecycleError::plugin(self.context.name(), Stage::Load, source);
            report
                .diagnostics
                .push(self.emit(Diagnostic::reported("Failed to load plugin", cause)));
        }

        info!(
            services = self.registry.len(),
            failed = self.registry.all_errors().len(),
            "Plugin reloaded"
        );
        Ok(report)
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    /// Returns the service registered under `handle` as a `T`.
    ///
    /// `None` if the handle is unknown. A service of another type is reported
    /// to the sink as [`Severity::Reported`](tether_core::Severity::Reported)
    /// and also yields `None`.
    pub fn get_service<T: Service>(&self, handle: &str) -> Option<&T> {
        match self.registry.get::<T>(handle) {
            Ok(service) => Some(service),
            Err(RegistryError::NotFound { .. }) => {
                debug!(service = handle, "Service not registered");
                None
            }
            Err(err) => {
                self.sink.report(&mismatch(handle, err));
                None
            }
        }
    }

    /// Mutable variant of [`get_service`](Self::get_service).
    pub fn get_service_mut<T: Service>(&mut self, handle: &str) -> Option<&mut T> {
        match self.registry.get_mut::<T>(handle) {
            Ok(service) => Some(service),
            Err(RegistryError::NotFound { .. }) => {
                debug!(service = handle, "Service not registered");
                None
            }
            Err(err) => {
                self.sink.report(&mismatch(handle, err));
                None
            }
        }
    }

    /// Every recorded service error, keyed by handle.
    pub fn service_errors(&self) -> &HashMap<ServiceHandle, String> {
        self.registry.all_errors()
    }

    /// Returns the recorded error of one service, if any.
    pub fn service_error(&self, handle: &str) -> Option<&str> {
        self.registry.last_error(handle)
    }

    // ─── Internal ────────────────────────────────────────────────────────────

    fn ensure(&self, allowed: bool, operation: &'static str) -> LifecycleResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    /// Snapshot of the handles, so the registry can be mutated while iterating.
    fn handles(&self) -> Vec<ServiceHandle> {
        self.registry.handles().cloned().collect()
    }

    fn emit(&self, diagnostic: Diagnostic) -> Diagnostic {
        self.sink.report(&diagnostic);
        diagnostic
    }

    fn fatal(&self, message: impl Into<String>, cause: LifecycleError) -> LifecycleError {
        self.emit(Diagnostic::fatal(message, cause)).cause
    }
}

fn mismatch(handle: &str, err: RegistryError) -> Diagnostic {
    Diagnostic::reported(
        format!("Service {handle} cannot be used as the requested type"),
        err.into(),
    )
}

impl<P: Plugin> std::fmt::Debug for LifecycleSupervisor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleSupervisor")
            .field("plugin", &self.plugin.name())
            .field("state", &self.state)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
