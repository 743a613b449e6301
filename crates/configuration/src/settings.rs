use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{Direction, StandardizationMethod, WeightingScheme};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    pub data: DataConfig,
    #[serde(default)] // Use default values if the [analysis] section is missing
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.data.validate()?;
        self.analysis.validate()
    }
}

/// Where the return series come from and which of them to evaluate.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path of the JSON document holding the return series.
    pub path: PathBuf,
    /// Strategies to evaluate. Empty means every series except the benchmark.
    #[serde(default)]
    pub strategies: Vec<String>,
    /// Identifier of the series used as benchmark by relative metrics.
    pub benchmark: Option<String>,
    /// First day of the observation window (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Last day of the observation window (inclusive).
    pub end_date: Option<NaiveDate>,
}

impl DataConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigError::ValidationError(format!(
                    "data.start_date {} is after data.end_date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the standardization, scoring and ranking of strategies.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Metrics to compute, in column order.
    pub metrics: Vec<MetricSettings>,
    /// Relative weight per metric. Metrics without an entry carry no weight
    /// under the explicit scheme.
    #[serde(default)]
    pub weights: BTreeMap<String, Decimal>,
    /// Overrides for each metric's natural direction.
    #[serde(default)]
    pub direction: BTreeMap<String, Direction>,
    #[serde(default)]
    pub standardization: StandardizationMethod,
    #[serde(default)]
    pub weighting: WeightingScheme,
    /// Scores closer than this are treated as tied and ordered by identifier.
    #[serde(default)]
    pub tie_epsilon: Decimal,
    /// Optional grouping of strategies (e.g. by portfolio manager) for the rollup.
    #[serde(default)]
    pub groups: Vec<GroupSettings>,
}

/// A single requested metric and its parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricSettings {
    pub name: String,
    /// Annual risk-free rate (e.g. 0.02 for 2%).
    #[serde(default)]
    pub risk_free_rate: Decimal,
    /// Observations per year used for annualization (12 for monthly data).
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    /// Use only the trailing `lookback` observations.
    #[serde(default)]
    pub lookback: Option<usize>,
    /// Gain/loss threshold for the Omega ratio.
    #[serde(default)]
    pub threshold: Decimal,
}

impl MetricSettings {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            risk_free_rate: Decimal::ZERO,
            periods_per_year: default_periods_per_year(),
            lookback: None,
            threshold: Decimal::ZERO,
        }
    }
}

/// A named set of strategies whose scores are averaged in the rollup.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSettings {
    pub name: String,
    pub members: Vec<String>,
}

/// Log verbosity and optional file output.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

fn default_periods_per_year() -> u32 {
    12
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_prefix() -> String {
    "meridian.log".to_string()
}

// --- Default Implementations ---
// This allows a user to omit the `[analysis]` or `[logging]` sections from
// their toml and still have it work with sensible defaults.

impl Default for AnalysisConfig {
    fn default() -> Self {
        let metrics = ["sharpe_ratio", "volatility", "max_drawdown"];
        Self {
            metrics: metrics.iter().map(|m| MetricSettings::new(m)).collect(),
            weights: metrics.iter().map(|m| (m.to_string(), dec!(1))).collect(),
            direction: BTreeMap::new(),
            standardization: StandardizationMethod::default(),
            weighting: WeightingScheme::default(),
            tie_epsilon: Decimal::ZERO,
            groups: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_prefix: default_log_file_prefix(),
        }
    }
}

impl AnalysisConfig {
    /// Checks the values serde cannot check for us.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.is_empty() {
            return Err(ConfigError::ValidationError(
                "analysis.metrics must name at least one metric".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for metric in &self.metrics {
            if metric.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "analysis.metrics contains an empty name".to_string(),
                ));
            }
            if !names.insert(metric.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "metric '{}' is listed more than once",
                    metric.name
                )));
            }
            if metric.periods_per_year == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "metric '{}': periods_per_year must be greater than 0",
                    metric.name
                )));
            }
            if metric.lookback == Some(0) {
                return Err(ConfigError::ValidationError(format!(
                    "metric '{}': lookback must be at least 1",
                    metric.name
                )));
            }
        }

        if let Some((name, weight)) = self.weights.iter().find(|(_, w)| **w < Decimal::ZERO) {
            return Err(ConfigError::ValidationError(format!(
                "weight for '{}' is negative ({})",
                name, weight
            )));
        }

        if self.tie_epsilon < Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "analysis.tie_epsilon must not be negative".to_string(),
            ));
        }

        let mut groups = HashSet::new();
        for group in &self.groups {
            if !groups.insert(group.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "group '{}' is defined more than once",
                    group.name
                )));
            }
        }

        Ok(())
    }
}
