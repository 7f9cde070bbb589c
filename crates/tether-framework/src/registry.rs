//! Service registry.
//!
//! [`ServiceRegistry`] owns every live service of a plugin, keyed by
//! [`ServiceHandle`], together with the last error recorded for each handle.
//!
//! - Iteration follows registration order; there is no dependency graph, so
//!   this order is what makes loading deterministic.
//! - The error map holds one message per failing handle. A load or reload
//!   failure writes it; a successful reload clears it.
//! - Services are never removed one by one. The supervisor tears the whole
//!   registry down on `disable()`.
//!
//! Only [`register`](ServiceRegistry::register) and the read-only views are
//! public. The per-service lifecycle steps are crate-private so that the
//! [`LifecycleSupervisor`](crate::LifecycleSupervisor) is the only writer once
//! a registry is in use.

use std::any::type_name;
use std::collections::HashMap;

use tether_core::{
    BoxedService, EventBinder, LifecycleError, LifecycleResult, RegistryError, RegistryResult,
    Service, ServiceHandle, Stage,
};
use tracing::{debug, debug_span};

struct RegisteredService {
    handle: ServiceHandle,
    service: BoxedService,
    /// Set once the event binder has accepted this listener.
    bound: bool,
}

impl RegisteredService {
    /// Runs `load` and, for listeners not yet bound, binds the service.
    fn load(&mut self, binder: &mut dyn EventBinder) -> LifecycleResult<()> {
        self.service
            .load()
            .map_err(|source| LifecycleError::service(self.handle.as_str(), Stage::Load, source))?;
        self.bind(binder)
    }

    fn unload(&mut self) -> LifecycleResult<()> {
        self.service
            .unload()
            .map_err(|source| LifecycleError::service(self.handle.as_str(), Stage::Unload, source))
    }

    fn bind(&mut self, binder: &mut dyn EventBinder) -> LifecycleResult<()> {
        if self.bound {
            return Ok(());
        }
        if let Some(listener) = self.service.as_listener() {
            binder
                .bind(&self.handle, listener)
                .map_err(|source| LifecycleError::Bind {
                    handle: self.handle.to_string(),
                    source,
                })?;
            self.bound = true;
            debug!(service = %self.handle, topics = ?listener.topics(), "Listener bound");
        }
        Ok(())
    }
}

/// Ordered map of handle → service, plus handle → last error message.
#[derive(Default)]
pub struct ServiceRegistry {
    services: Vec<RegisteredService>,
    index: HashMap<ServiceHandle, usize>,
    errors: HashMap<ServiceHandle, String>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Registration ────────────────────────────────────────────────────────

    /// Registers `service` under `handle` and runs its `init` hook.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EmptyHandle`] / [`RegistryError::DuplicateHandle`]:
    ///   nothing is stored.
    /// - [`RegistryError::Init`]: the service **stays registered**; the failed
    ///   `init` is not rolled back.
    pub fn register(&mut self, handle: impl Into<String>, service: BoxedService) -> RegistryResult<()> {
        let handle = ServiceHandle::new(handle)?;
        if self.index.contains_key(&handle) {
            return Err(RegistryError::DuplicateHandle {
                handle: handle.to_string(),
            });
        }

        let slot = self.services.len();
        self.index.insert(handle.clone(), slot);
        self.services.push(RegisteredService {
            handle: handle.clone(),
            service,
            bound: false,
        });
        debug!(service = %handle, slot, "Service registered");

        self.services[slot]
            .service
            .init()
            .map_err(|source| RegistryError::Init {
                handle: handle.to_string(),
                source,
            })
    }

    // ─── Lookup ──────────────────────────────────────────────────────────────

    /// Returns the service registered under `handle` as a `T`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if the handle is unknown,
    /// [`RegistryError::TypeMismatch`] if the service is not a `T`.
    pub fn get<T: Service>(&self, handle: &str) -> RegistryResult<&T> {
        let service: &dyn Service = &*self.entry(handle)?.service;
        service
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| RegistryError::TypeMismatch {
                handle: handle.to_string(),
                expected: type_name::<T>(),
                found: service.type_name(),
            })
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut<T: Service>(&mut self, handle: &str) -> RegistryResult<&mut T> {
        let slot = self.slot(handle)?;
        let found = {
            let service: &dyn Service = &*self.services[slot].service;
            service.type_name()
        };
        let service: &mut dyn Service = &mut *self.services[slot].service;
        service
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| RegistryError::TypeMismatch {
                handle: handle.to_string(),
                expected: type_name::<T>(),
                found,
            })
    }

    /// Returns `true` if a service is registered under `handle`.
    pub fn contains(&self, handle: &str) -> bool {
        self.index.contains_key(handle)
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no service is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns the registered handles in registration order.
    pub fn handles(&self) -> impl Iterator<Item = &ServiceHandle> {
        self.services.iter().map(|entry| &entry.handle)
    }

    /// Returns `(handle, service)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ServiceHandle, &dyn Service)> {
        self.services
            .iter()
            .map(|entry| (&entry.handle, &*entry.service as &dyn Service))
    }

    // ─── Error map ───────────────────────────────────────────────────────────

    /// Returns the last error recorded for `handle`, if any.
    pub fn last_error(&self, handle: &str) -> Option<&str> {
        self.errors.get(handle).map(String::as_str)
    }

    /// Returns every recorded error, keyed by handle.
    pub fn all_errors(&self) -> &HashMap<ServiceHandle, String> {
        &self.errors
    }

    // ─── Lifecycle steps (supervisor only) ───────────────────────────────────

    /// Loads one service and binds it if it is a listener.
    ///
    /// On failure the error message is written to the error map.
    pub(crate) fn load_service(
        &mut self,
        handle: &ServiceHandle,
        binder: &mut dyn EventBinder,
    ) -> LifecycleResult<()> {
        let slot = self.slot(handle.as_str())?;
        let _span = debug_span!("load_service", service = %handle).entered();

        let entry = &mut self.services[slot];
        let result = entry.load(binder);
        if let Err(err) = &result {
            self.errors.insert(entry.handle.clone(), err.cause_message());
        } else {
            debug!("Service loaded");
        }
        result
    }

    /// Unloads one service. Failures are returned but never recorded.
    pub(crate) fn unload_service(&mut self, handle: &ServiceHandle) -> LifecycleResult<()> {
        let slot = self.slot(handle.as_str())?;
        let _span = debug_span!("unload_service", service = %handle).entered();

        let result = self.services[slot].unload();
        if result.is_ok() {
            debug!("Service unloaded");
        }
        result
    }

    /// Clears the service's error, then runs `unload` followed by `load` as one
    /// unit. Any failure inside the unit is recorded, replacing the old error.
    pub(crate) fn reload_service(
        &mut self,
        handle: &ServiceHandle,
        binder: &mut dyn EventBinder,
    ) -> LifecycleResult<()> {
        let slot = self.slot(handle.as_str())?;
        let _span = debug_span!("reload_service", service = %handle).entered();

        self.errors.remove(handle);
        let entry = &mut self.services[slot];
        let result = entry.unload().and_then(|()| entry.load(binder));
        if let Err(err) = &result {
            self.errors.insert(entry.handle.clone(), err.cause_message());
        } else {
            debug!("Service reloaded");
        }
        result
    }

    /// Drops every service (in registration order) and every recorded error.
    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.errors.clear();
        self.services.clear();
    }

    // ─── Internal ────────────────────────────────────────────────────────────

    fn slot(&self, handle: &str) -> RegistryResult<usize> {
        self.index
            .get(handle)
            .copied()
            .ok_or_else(|| RegistryError::NotFound {
                handle: handle.to_string(),
            })
    }

    fn entry(&self, handle: &str) -> RegistryResult<&RegisteredService> {
        self.slot(handle).map(|slot| &self.services[slot])
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.handles().collect::<Vec<_>>())
            .field("errors", &self.errors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tether_core::{HookResult, Listener};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Tracked {
        name: &'static str,
        log: Log,
        fail_init: bool,
        fail_load: Option<&'static str>,
        fail_unload: Option<&'static str>,
    }

    impl Tracked {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Rc::clone(log),
                fail_init: false,
                fail_load: None,
                fail_unload: None,
            }
        }
    }

    impl Service for Tracked {
        fn init(&mut self) -> HookResult {
            self.log.borrow_mut().push(format!("{}.init", self.name));
            if self.fail_init {
                return Err("init failed".into());
            }
            Ok(())
        }

        fn load(&mut self) -> HookResult {
            self.log.borrow_mut().push(format!("{}.load", self.name));
            match self.fail_load {
                Some(msg) => Err(msg.into()),
                None => Ok(()),
            }
        }

        fn unload(&mut self) -> HookResult {
            self.log.borrow_mut().push(format!("{}.unload", self.name));
            match self.fail_unload {
                Some(msg) => Err(msg.into()),
                None => Ok(()),
            }
        }
    }

    struct Chat;

    impl Listener for Chat {
        fn topics(&self) -> &[&'static str] {
            &["player.chat"]
        }
    }

    impl Service for Chat {
        fn as_listener(&self) -> Option<&dyn Listener> {
            Some(self)
        }
    }

    #[derive(Default)]
    struct CountingBinder {
        bound: Vec<String>,
        reject: bool,
    }

    impl EventBinder for CountingBinder {
        fn bind(&mut self, handle: &ServiceHandle, _listener: &dyn Listener) -> HookResult {
            if self.reject {
                return Err("bus unavailable".into());
            }
            self.bound.push(handle.to_string());
            Ok(())
        }
    }

    fn handle(name: &str) -> ServiceHandle {
        ServiceHandle::new(name).unwrap()
    }

    #[test]
    fn test_register_then_get_returns_same_instance() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        registry
            .register("alpha", Box::new(Tracked::new("alpha", &log)))
            .unwrap();

        let tracked = registry.get::<Tracked>("alpha").unwrap();
        assert_eq!(tracked.name, "alpha");
        assert!(Rc::ptr_eq(&tracked.log, &log));
        assert_eq!(*log.borrow(), vec!["alpha.init"]);
    }

    #[test]
    fn test_duplicate_and_empty_handles_leave_registry_untouched() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        registry
            .register("alpha", Box::new(Tracked::new("alpha", &log)))
            .unwrap();

        let dup = registry.register("alpha", Box::new(Tracked::new("other", &log)));
        assert!(matches!(dup, Err(RegistryError::DuplicateHandle { .. })));

        let empty = registry.register("", Box::new(Tracked::new("empty", &log)));
        assert!(matches!(empty, Err(RegistryError::EmptyHandle)));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get::<Tracked>("alpha").unwrap().name, "alpha");
        // Neither rejected service was initialised.
        assert_eq!(*log.borrow(), vec!["alpha.init"]);
    }

    #[test]
    fn test_failed_init_keeps_registration() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        let mut tracked = Tracked::new("alpha", &log);
        tracked.fail_init = true;

        let result = registry.register("alpha", Box::new(tracked));
        match result {
            Err(RegistryError::Init { handle, source }) => {
                assert_eq!(handle, "alpha");
                assert_eq!(source.to_string(), "init failed");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(registry.contains("alpha"));
    }

    #[test]
    fn test_get_with_wrong_type() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        registry
            .register("alpha", Box::new(Tracked::new("alpha", &log)))
            .unwrap();

        match registry.get::<Chat>("alpha") {
            Err(RegistryError::TypeMismatch {
                handle,
                expected,
                found,
            }) => {
                assert_eq!(handle, "alpha");
                assert!(expected.ends_with("Chat"));
                assert!(found.ends_with("Tracked"));
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            registry.get_mut::<Chat>("alpha"),
            Err(RegistryError::TypeMismatch { .. })
        ));
        assert!(matches!(
            registry.get::<Tracked>("missing"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_handles_follow_registration_order() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        for name in ["zeta", "alpha", "mu"] {
            registry
                .register(name, Box::new(Tracked::new(name, &log)))
                .unwrap();
        }
        let handles: Vec<&str> = registry.handles().map(ServiceHandle::as_str).collect();
        assert_eq!(handles, vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_load_failure_is_recorded() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        let mut failing = Tracked::new("a", &log);
        failing.fail_load = Some("boom");
        registry.register("a", Box::new(failing)).unwrap();
        registry
            .register("b", Box::new(Tracked::new("b", &log)))
            .unwrap();

        let mut binder = CountingBinder::default();
        assert!(registry.load_service(&handle("a"), &mut binder).is_err());
        assert!(registry.load_service(&handle("b"), &mut binder).is_ok());

        assert_eq!(registry.last_error("a"), Some("boom"));
        assert_eq!(registry.last_error("b"), None);
        assert_eq!(registry.all_errors().len(), 1);
    }

    #[test]
    fn test_unload_failure_is_not_recorded() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        let mut failing = Tracked::new("a", &log);
        failing.fail_unload = Some("stuck");
        registry.register("a", Box::new(failing)).unwrap();

        let err = registry.unload_service(&handle("a")).unwrap_err();
        assert_eq!(err.cause_message(), "stuck");
        assert!(registry.all_errors().is_empty());
    }

    #[test]
    fn test_reload_stops_at_unload_failure() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        let mut tracked = Tracked::new("a", &log);
        tracked.fail_unload = Some("unload broke");
        registry.register("a", Box::new(tracked)).unwrap();

        let mut binder = CountingBinder::default();
        assert!(registry.reload_service(&handle("a"), &mut binder).is_err());
        assert_eq!(registry.last_error("a"), Some("unload broke"));
        // The unit stops at the first failure.
        assert_eq!(*log.borrow(), vec!["a.init", "a.unload"]);
    }

    #[test]
    fn test_reload_clears_error_on_success() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        let mut tracked = Tracked::new("a", &log);
        tracked.fail_load = Some("boom");
        registry.register("a", Box::new(tracked)).unwrap();

        let mut binder = CountingBinder::default();
        let _ = registry.load_service(&handle("a"), &mut binder);
        assert_eq!(registry.last_error("a"), Some("boom"));

        registry.get_mut::<Tracked>("a").unwrap().fail_load = None;
        assert!(registry.reload_service(&handle("a"), &mut binder).is_ok());
        assert_eq!(registry.last_error("a"), None);
    }

    #[test]
    fn test_listener_bound_once() {
        let mut registry = ServiceRegistry::new();
        registry.register("chat", Box::new(Chat)).unwrap();

        let mut binder = CountingBinder::default();
        registry.load_service(&handle("chat"), &mut binder).unwrap();
        registry.reload_service(&handle("chat"), &mut binder).unwrap();
        assert_eq!(binder.bound, vec!["chat"]);
    }

    #[test]
    fn test_bind_failure_recorded_like_load_failure() {
        let mut registry = ServiceRegistry::new();
        registry.register("chat", Box::new(Chat)).unwrap();

        let mut binder = CountingBinder {
            reject: true,
            ..Default::default()
        };
        let err = registry
            .load_service(&handle("chat"), &mut binder)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Bind { .. }));
        assert_eq!(registry.last_error("chat"), Some("bus unavailable"));

        // A later reload retries the binding.
        binder.reject = false;
        registry.reload_service(&handle("chat"), &mut binder).unwrap();
        assert_eq!(binder.bound, vec!["chat"]);
        assert_eq!(registry.last_error("chat"), None);
    }

    #[test]
    fn test_clear_drops_everything() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        let mut tracked = Tracked::new("a", &log);
        tracked.fail_load = Some("boom");
        registry.register("a", Box::new(tracked)).unwrap();
        let _ = registry.load_service(&handle("a"), &mut CountingBinder::default());

        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
        assert!(registry.all_errors().is_empty());
    }

    #[test]
    fn test_steps_look_up_by_handle() {
        let log = Log::default();
        let mut registry = ServiceRegistry::new();
        registry.register("a", Box::new(Tracked::new("a", &log))).unwrap();
        let mut binder = CountingBinder::default();

        assert!(registry.load_service(&handle("a"), &mut binder).is_ok());
        assert!(registry.reload_service(&handle("a"), &mut binder).is_ok());
        assert!(registry.unload_service(&handle("a")).is_ok());
        assert_eq!(
            *log.borrow(),
            vec!["a.init", "a.load", "a.unload", "a.load", "a.unload"]
        );

        let missing = handle("missing");
        assert!(matches!(
            registry.load_service(&missing, &mut binder),
            Err(LifecycleError::Registration(RegistryError::NotFound { .. }))
        ));
        assert!(matches!(
            registry.unload_service(&missing),
            Err(LifecycleError::Registration(RegistryError::NotFound { .. }))
        ));
        assert!(registry.all_errors().is_empty());
    }
}
