//! Error types for timetabling cycles.
//!
//! Every failure is scoped to one build-solve-extract cycle; nothing here
//! carries state across cycles.

use std::time::Duration;

use crate::validation::ValidationError;

/// Result type for timetabling operations.
pub type TimetableResult<T> = Result<T, TimetableError>;

/// Error type for timetabling operations.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// The solver proved that no assignment satisfies all active constraints.
    ///
    /// Terminal for the cycle. The reason, if any, comes verbatim from the
    /// solver backend.
    #[error("model is infeasible{}", format_reason(.reason))]
    Infeasible { reason: Option<String> },

    /// An encoded blackout or eligibility record failed to parse.
    #[error("malformed {field} for '{entity}': {message}")]
    MalformedEncoding {
        entity: String,
        field: &'static str,
        message: String,
    },

    /// A required named constraint parameter has no value.
    #[error("missing constraint parameter '{0}'")]
    MissingParameter(String),

    /// A constraint parameter is present but out of range.
    #[error("invalid constraint parameter '{name}' = {value}: {message}")]
    InvalidParameter {
        name: String,
        value: i64,
        message: String,
    },

    /// The solver did not answer within the configured limit.
    #[error("solver timed out after {0:?}")]
    SolverTimeout(Duration),

    /// Backend failure that is not a proof of infeasibility.
    #[error("solver failure: {0}")]
    Solver(String),

    /// Structural issues found in the repository snapshot.
    #[error("snapshot validation failed: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// A solver assignment does not cover the model domain.
    #[error("assignment does not match model domain: expected {expected} values, got {actual}")]
    DomainMismatch { expected: usize, actual: usize },

    /// Configuration read, parse, or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// Report sink failure.
    #[error("export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TimetableError {
    /// Creates a malformed-encoding error.
    pub fn malformed(
        entity: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedEncoding {
            entity: entity.into(),
            field,
            message: message.into(),
        }
    }

    /// Whether this error means the model has no solution.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible { .. })
    }

    /// Whether this error is a solver timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::SolverTimeout(_))
    }
}

fn format_reason(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default()
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
