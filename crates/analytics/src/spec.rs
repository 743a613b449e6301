use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Tunables shared by the built-in calculators. Each calculator reads only the
/// fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricParams {
    /// Annual risk-free rate, e.g. 0.02 for 2%. De-annualized with
    /// `periods_per_year` before use.
    pub risk_free_rate: f64,
    /// Number of return observations per year (12 for monthly data).
    pub periods_per_year: f64,
    /// Only the trailing `lookback` observations are used when set.
    pub lookback: Option<usize>,
    /// Gain/loss threshold for the Omega ratio.
    pub threshold: f64,
}

impl Default for MetricParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            periods_per_year: 12.0,
            lookback: None,
            threshold: 0.0,
        }
    }
}

impl MetricParams {
    /// The risk-free rate for a single period.
    pub fn periodic_risk_free_rate(&self) -> f64 {
        self.risk_free_rate / self.periods_per_year
    }

    /// Square-root-of-time scaling factor.
    pub fn annualization(&self) -> f64 {
        self.periods_per_year.sqrt()
    }
}

/// A requested metric: which calculator to run and how to configure it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub name: String,
    #[serde(flatten)]
    pub params: MetricParams,
}

impl MetricSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: MetricParams::default(),
        }
    }

    pub fn with_params(name: impl Into<String>, params: MetricParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let invalid = |reason: &str| AnalyticsError::InvalidSpec {
            metric: self.name.clone(),
            reason: reason.to_string(),
        };

        if !(self.params.periods_per_year.is_finite() && self.params.periods_per_year > 0.0) {
            return Err(invalid("periods_per_year must be a positive number"));
        }
        if !self.params.risk_free_rate.is_finite() {
            return Err(invalid("risk_free_rate must be finite"));
        }
        if !self.params.threshold.is_finite() {
            return Err(invalid("threshold must be finite"));
        }
        if self.params.lookback == Some(0) {
            return Err(invalid("lookback must be at least 1"));
        }
        Ok(())
    }
}
