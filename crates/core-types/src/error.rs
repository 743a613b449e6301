use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Timestamps must be strictly increasing: {previous} is followed by {current}")]
    UnorderedTimestamps {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("Duplicate timestamp in return series: {0}")]
    DuplicateTimestamp(DateTime<Utc>),

    #[error("Return at {timestamp} is not a finite number")]
    NonFiniteReturn { timestamp: DateTime<Utc> },

    #[error("Return at {timestamp} is {value}, which is a loss of more than 100%")]
    ReturnBelowTotalLoss { timestamp: DateTime<Utc>, value: f64 },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
