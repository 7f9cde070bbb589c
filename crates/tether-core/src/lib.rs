//! # Tether Core
//!
//! Contracts shared by every layer of the Tether service lifecycle supervisor.
//!
//! This crate defines *what* a service is and how the supervisor talks to the
//! outside world; it contains no lifecycle logic of its own.
//!
//! ## Contents
//!
//! - **Identity**: [`ServiceHandle`], the stable, non-empty string key of a service.
//! - **Capabilities**: [`Service`] (optional `init` / `load` / `unload` hooks) and
//!   [`Listener`], exposed through [`Service::as_listener`].
//! - **External collaborators**: [`EventBinder`] (host event bus) and
//!   [`DiagnosticSink`] (host error reporting).
//! - **State**: [`LifecycleState`] and [`Stage`].
//! - **Errors**: [`RegistryError`], [`LifecycleError`] and the [`Severity`] that
//!   separates fatal from isolated failures.
//!
//! ```text
//! ┌────────────┐ register ┌─────────────────┐ bind ┌─────────────┐
//! │  Factory   │─────────▶│ ServiceRegistry │─────▶│ EventBinder │
//! └────────────┘          └─────────────────┘      └─────────────┘
//!                                 │ failures
//!                                 ▼
//!                         ┌────────────────┐
//!                         │ DiagnosticSink │
//!                         └────────────────┘
//! ```

pub mod binder;
pub mod diagnostic;
pub mod error;
pub mod handle;
pub mod service;
pub mod state;

pub use binder::EventBinder;
pub use diagnostic::{Diagnostic, DiagnosticSink, Severity};
pub use error::{BoxError, LifecycleError, LifecycleResult, RegistryError, RegistryResult};
pub use handle::ServiceHandle;
pub use service::{AsAny, BoxedService, HookResult, Listener, Service};
pub use state::{LifecycleState, Stage};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        BoxError, DiagnosticSink, EventBinder, HookResult, Listener, Service, ServiceHandle,
    };
}
