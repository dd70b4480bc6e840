//! Evaluation error type.

use thiserror::Error;

/// The single failure outcome of an evaluation.
///
/// Syntax errors and numerically undefined results are deliberately not
/// distinguished; the reason is kept only for diagnostics.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Error")]
pub struct EvaluationError {
    reason: String,
}

impl EvaluationError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why evaluation failed, for logs only.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
