//! Domain error types
//!
//! This module defines the errors raised while building a report: precondition
//! failures (mutating a locked report, encoding an unlocked one) and
//! serialization failures of the structured encoding.

use thiserror::Error;

/// Errors that can occur while building or encoding a report
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A caller broke a precondition of the report state machine.
    ///
    /// Callers must not attempt the operation that produced this error;
    /// it is never a transient condition.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The structured record could not be serialized
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl ReportError {
    /// Build an invariant violation and log it at error level.
    pub(crate) fn violation(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(%message, "Report invariant violated");
        ReportError::InvariantViolation(message)
    }

    /// Returns true for precondition failures.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ReportError::InvariantViolation(_))
    }
}
