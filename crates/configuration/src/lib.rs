//! # Meridian Configuration
//!
//! Loads and validates the TOML file that drives a ranking run.
//!
//! Values are read from the file first and then overridden by environment
//! variables prefixed with `MERIDIAN__`, using `__` as the nesting separator
//! (e.g. `MERIDIAN__ANALYSIS__STANDARDIZATION=min-max`).

use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisConfig, DataConfig, GroupSettings, LoggingConfig, MetricSettings, RankingConfig,
};

/// Loads the ranking configuration from `path`.
///
/// The file is deserialized into the strongly-typed `RankingConfig` and then
/// validated, so callers only ever see a configuration that can be run.
pub fn load_config(path: impl AsRef<Path>) -> Result<RankingConfig, ConfigError> {
    let path = path.as_ref();

    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("MERIDIAN")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<RankingConfig>()?;
    config.validate()?;

    Ok(config)
}
