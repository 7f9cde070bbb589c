//! Event bus binding.

use crate::handle::ServiceHandle;
use crate::service::{HookResult, Listener};

/// Connects listener-capable services to the host's event bus.
///
/// The supervisor calls [`bind`](EventBinder::bind) after a listener service
/// loads successfully. A binding failure is recorded against the service exactly
/// like a load failure.
///
/// There is no `unbind`: the host drops every binding of the plugin when the
/// plugin is disabled.
pub trait EventBinder {
    /// Registers `listener` with the event bus under `handle`.
    fn bind(&mut self, handle: &ServiceHandle, listener: &dyn Listener) -> HookResult;
}

impl<B: EventBinder + ?Sized> EventBinder for Box<B> {
    fn bind(&mut self, handle: &ServiceHandle, listener: &dyn Listener) -> HookResult {
        (**self).bind(handle, listener)
    }
}
