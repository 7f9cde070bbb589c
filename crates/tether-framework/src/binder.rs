//! Default event binder.

use tether_core::{EventBinder, HookResult, Listener, ServiceHandle};
use tracing::debug;

/// Event binder for hosts without an event bus.
///
/// Accepts every listener and only logs the binding.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBinder;

impl EventBinder for NoopBinder {
    fn bind(&mut self, handle: &ServiceHandle, listener: &dyn Listener) -> HookResult {
        debug!(
            service = %handle,
            topics = ?listener.topics(),
            "No event bus configured, listener binding skipped"
        );
        Ok(())
    }
}
