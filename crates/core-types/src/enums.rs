use serde::{Deserialize, Serialize};

/// Whether a larger raw metric value is preferable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// The multiplier applied to a standardized value during scoring.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::HigherIsBetter => 1.0,
            Direction::LowerIsBetter => -1.0,
        }
    }
}

/// How raw metric columns are brought onto a common scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandardizationMethod {
    /// Cross-sectional z-score using the sample standard deviation.
    #[default]
    ZScore,
    /// Rescale onto [0, 1] using the cross-sectional min and max.
    MinMax,
    /// Percentile rank, ties resolved with the midpoint rule.
    RankPercentile,
}

/// Where the per-metric weights of the composite score come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightingScheme {
    /// Weights are taken verbatim from the configuration.
    #[default]
    Explicit,
    /// Every requested metric receives the same weight.
    Equal,
    /// Weights derived from the information entropy of each standardized column.
    Entropy,
}
