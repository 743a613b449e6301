use thiserror::Error;

/// Configuration-level failures. These abort a whole computation, unlike the
/// per-cell `UnavailableReason`s recorded inside a metric table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Metric '{0}' is not registered")]
    UnknownMetric(String),

    #[error("Metric '{0}' is already registered")]
    DuplicateMetric(String),

    #[error("Calculator registered as '{registered}' declares the name '{declared}'")]
    NameMismatch { registered: String, declared: String },

    #[error("Invalid specification for metric '{metric}': {reason}")]
    InvalidSpec { metric: String, reason: String },

    #[error("Metric table shape mismatch: expected {expected} cells, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
