//! The service capability contract.
//!
//! A [`Service`] is a lifecycle-managed sub-component of a plugin. Every hook is
//! optional and defaults to a no-op, so the smallest possible service is an empty
//! `impl Service for MyService {}`.
//!
//! # Listener services
//!
//! A service that also wants to receive host events implements [`Listener`] and
//! returns itself from [`Service::as_listener`]. The supervisor hands that view
//! to the [`EventBinder`](crate::EventBinder) after a successful `load`; the
//! service never talks to the event bus directly.
//!
//! ```rust,ignore
//! struct Chat;
//!
//! impl Listener for Chat {
//!     fn topics(&self) -> &[&'static str] {
//!         &["player.chat"]
//!     }
//! }
//!
//! impl Service for Chat {
//!     fn as_listener(&self) -> Option<&dyn Listener> {
//!         Some(self)
//!     }
//! }
//! ```

use std::any::Any;

use crate::error::BoxError;

/// Result of a single lifecycle hook.
pub type HookResult = Result<(), BoxError>;

/// Object-safe access to [`Any`] for trait objects.
///
/// Implemented for every `'static` type, so services never implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the concrete type name, used in diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A unit with optional `init` / `load` / `unload` hooks.
///
/// Hooks are synchronous and run on the host's lifecycle thread. A hook that
/// blocks holds up the whole lifecycle transition.
pub trait Service: AsAny {
    /// Called once, right after the service is registered.
    fn init(&mut self) -> HookResult {
        Ok(())
    }

    /// Called when the service is loaded, and again on every reload.
    fn load(&mut self) -> HookResult {
        Ok(())
    }

    /// Called when the service is unloaded, and before every reload.
    fn unload(&mut self) -> HookResult {
        Ok(())
    }

    /// Returns the listener view of this service, if it has one.
    fn as_listener(&self) -> Option<&dyn Listener> {
        None
    }
}

/// Owned, type-erased service.
pub type BoxedService = Box<dyn Service>;

/// Capability of a service that receives events from the host's event bus.
pub trait Listener {
    /// Event topics this listener subscribes to.
    fn topics(&self) -> &[&'static str] {
        &[]
    }
}
