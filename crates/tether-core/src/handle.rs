//! Service handles.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};

/// Stable, caller-chosen identifier of a registered service.
///
/// A handle is never empty. Cloning is cheap; the string is shared.
///
/// `ServiceHandle` implements `Borrow<str>`, so maps keyed by handles can be
/// queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceHandle(Arc<str>);

impl ServiceHandle {
    /// Creates a handle, rejecting the empty string.
    pub fn new(handle: impl Into<String>) -> RegistryResult<Self> {
        let handle = handle.into();
        if handle.is_empty() {
            return Err(RegistryError::EmptyHandle);
        }
        Ok(Self(Arc::from(handle)))
    }

    /// Returns the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ServiceHandle {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ServiceHandle {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ServiceHandle {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl TryFrom<&str> for ServiceHandle {
    type Error = RegistryError;

    fn try_from(value: &str) -> RegistryResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for ServiceHandle {
    type Error = RegistryError;

    fn try_from(value: String) -> RegistryResult<Self> {
        Self::new(value)
    }
}
