use core_types::{CoreError, StrategyId};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read return data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("An error occurred during JSON deserialization: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No return series found for strategy '{0}'")]
    StrategyNotFound(StrategyId),

    #[error("Return series for '{id}' is invalid: {source}")]
    InvalidSeries {
        id: StrategyId,
        #[source]
        source: CoreError,
    },
}
