//! Failure reporting.
//!
//! Every failure the supervisor observes, fatal or not, is wrapped in a
//! [`Diagnostic`] and handed to the host's [`DiagnosticSink`]. The core never
//! logs on its own behalf.

use std::fmt;

use crate::error::LifecycleError;

/// How a failure affected the lifecycle operation it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Aborted the remaining steps of the operation.
    Fatal,
    /// Confined to one service; sibling services kept going.
    Isolated,
    /// Reported only; nothing was aborted or recorded.
    Reported,
}

impl Severity {
    /// Returns the lowercase name of the severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Isolated => "isolated",
            Self::Reported => "reported",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported failure: a human-readable message plus its typed cause.
#[derive(Debug)]
pub struct Diagnostic {
    /// How the failure affected the operation.
    pub severity: Severity,
    /// Short description, e.g. `"Failed to load service: economy"`.
    pub message: String,
    /// The underlying error.
    pub cause: LifecycleError,
}

impl Diagnostic {
    /// Creates a diagnostic.
    pub fn new(severity: Severity, message: impl Into<String>, cause: LifecycleError) -> Self {
        Self {
            severity,
            message: message.into(),
            cause,
        }
    }

    /// Creates a [`Severity::Fatal`] diagnostic.
    pub fn fatal(message: impl Into<String>, cause: LifecycleError) -> Self {
        Self::new(Severity::Fatal, message, cause)
    }

    /// Creates a [`Severity::Isolated`] diagnostic.
    pub fn isolated(message: impl Into<String>, cause: LifecycleError) -> Self {
        Self::new(Severity::Isolated, message, cause)
    }

    /// Creates a [`Severity::Reported`] diagnostic.
    pub fn reported(message: impl Into<String>, cause: LifecycleError) -> Self {
        Self::new(Severity::Reported, message, cause)
    }

    /// Returns `true` for [`Severity::Fatal`].
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Returns the service handle the failure refers to, if any.
    pub fn handle(&self) -> Option<&str> {
        self.cause.handle()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.cause)
    }
}

/// Write-only destination for lifecycle failures.
pub trait DiagnosticSink {
    /// Reports a failure.
    fn report(&self, diagnostic: &Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
    fn report(&self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic)
    }
}
