//! Default diagnostic sink.

use tether_core::{Diagnostic, DiagnosticSink, Severity};
use tracing::{error, warn};

/// Diagnostic sink that emits every failure as a `tracing` event.
///
/// [`Severity::Fatal`] maps to `ERROR`; isolated and reported failures map to
/// `WARN`. The root cause of the error chain is attached as `cause`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        let cause = root_cause(diagnostic);
        match diagnostic.severity {
            Severity::Fatal => error!(
                severity = %diagnostic.severity,
                service = ?diagnostic.handle(),
                error = %diagnostic.cause,
                cause = %cause,
                "{}",
                diagnostic.message
            ),
            Severity::Isolated | Severity::Reported => warn!(
                severity = %diagnostic.severity,
                service = ?diagnostic.handle(),
                error = %diagnostic.cause,
                cause = %cause,
                "{}",
                diagnostic.message
            ),
        }
    }
}

fn root_cause(diagnostic: &Diagnostic) -> String {
    let mut current: &dyn std::error::Error = &diagnostic.cause;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}
