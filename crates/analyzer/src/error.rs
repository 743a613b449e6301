use analytics::AnalyticsError;
use datasource::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Metric error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Data source error: {0}")]
    Data(#[from] DataError),

    #[error("Weight for metric '{metric}' must be a finite, non-negative number, got {weight}")]
    InvalidWeight { metric: String, weight: f64 },

    #[error("Tie epsilon must be a finite, non-negative number, got {0}")]
    InvalidEpsilon(f64),

    #[error("No strategies were supplied for evaluation")]
    EmptyUniverse,
}
