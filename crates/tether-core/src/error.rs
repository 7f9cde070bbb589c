//! Error types for the Tether core.
//!
//! Hook failures are carried as [`BoxError`] so services can return any error
//! type. The supervisor wraps them in [`LifecycleError`] together with the
//! service handle and the [`Stage`] they happened in.

use thiserror::Error;

use crate::state::{LifecycleState, Stage};

/// Type-erased error returned by lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors raised by the service registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A service was registered with an empty handle.
    #[error("service handle must not be empty")]
    EmptyHandle,

    /// A service with the same handle is already registered.
    #[error("service '{handle}' is already registered")]
    DuplicateHandle {
        /// The duplicate handle.
        handle: String,
    },

    /// No service is registered under the handle.
    #[error("service '{handle}' not found")]
    NotFound {
        /// The missing handle.
        handle: String,
    },

    /// The registered service is not of the requested type.
    #[error("service '{handle}' cannot be cast to '{expected}' (found '{found}')")]
    TypeMismatch {
        /// The requested handle.
        handle: String,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type actually registered.
        found: &'static str,
    },

    /// The service was registered but its `init` hook failed.
    ///
    /// The registration is kept.
    #[error("failed to initialise service '{handle}': {source}")]
    Init {
        /// The handle of the failing service.
        handle: String,
        /// The error returned by `init`.
        #[source]
        source: BoxError,
    },
}

impl RegistryError {
    /// Returns the handle this error refers to, if any.
    pub fn handle(&self) -> Option<&str> {
        match self {
            Self::EmptyHandle => None,
            Self::DuplicateHandle { handle }
            | Self::NotFound { handle }
            | Self::TypeMismatch { handle, .. }
            | Self::Init { handle, .. } => Some(handle),
        }
    }
}

// =============================================================================
// Lifecycle Errors
// =============================================================================

/// Errors raised while driving the plugin and service lifecycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The operation is not permitted in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        /// The attempted operation (`enable`, `disable`, `reload`).
        operation: &'static str,
        /// The state the supervisor was in.
        state: LifecycleState,
    },

    /// A plugin-level hook failed.
    #[error("plugin '{plugin}' failed during {stage}: {source}")]
    Plugin {
        /// Plugin name.
        plugin: String,
        /// The hook that failed.
        stage: Stage,
        /// The error returned by the hook.
        #[source]
        source: BoxError,
    },

    /// The plugin's service factory failed.
    #[error("service factory of plugin '{plugin}' failed: {source}")]
    Factory {
        /// Plugin name.
        plugin: String,
        /// The error returned by the factory.
        #[source]
        source: BoxError,
    },

    /// Registering a service failed.
    #[error(transparent)]
    Registration(#[from] RegistryError),

    /// A service-level hook failed.
    #[error("service '{handle}' failed during {stage}: {source}")]
    Service {
        /// The failing service.
        handle: String,
        /// The hook that failed.
        stage: Stage,
        /// The error returned by the hook.
        #[source]
        source: BoxError,
    },

    /// The event binder rejected a listener service.
    #[error("failed to bind listener service '{handle}': {source}")]
    Bind {
        /// The listener service.
        handle: String,
        /// The error returned by the binder.
        #[source]
        source: BoxError,
    },
}

impl LifecycleError {
    /// Creates a service hook error.
    pub fn service(handle: impl Into<String>, stage: Stage, source: BoxError) -> Self {
        Self::Service {
            handle: handle.into(),
            stage,
            source,
        }
    }

    /// Creates a plugin hook error.
    pub fn plugin(plugin: impl Into<String>, stage: Stage, source: BoxError) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            stage,
            source,
        }
    }

    /// Returns the service handle this error refers to, if any.
    pub fn handle(&self) -> Option<&str> {
        match self {
            Self::Service { handle, .. } | Self::Bind { handle, .. } => Some(handle),
            Self::Registration(e) => e.handle(),
            _ => None,
        }
    }

    /// Returns the message of the underlying hook error.
    ///
    /// This is what gets recorded in the service error map: the bare message of
    /// the error the hook returned, without the lifecycle context.
    pub fn cause_message(&self) -> String {
        match self {
            Self::Plugin { source, .. }
            | Self::Factory { source, .. }
            | Self::Service { source, .. }
            | Self::Bind { source, .. }
            | Self::Registration(RegistryError::Init { source, .. }) => source.to_string(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
