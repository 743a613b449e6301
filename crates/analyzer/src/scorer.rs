use crate::error::AnalyzerError;
use crate::standardizer::StandardizedMetricTable;
use analytics::{MetricValue, UnavailableReason};
use core_types::{Direction, StrategyId};
use serde::Serialize;
use std::collections::BTreeMap;

/// A single metric's share of a strategy's composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub metric: String,
    pub standardized: f64,
    /// Weight after re-normalization over the strategy's available metrics.
    pub effective_weight: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub strategy: StrategyId,
    pub score: f64,
    pub contributions: Vec<Contribution>,
}

/// Why a metric did not count towards a strategy's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExclusionReason {
    Unavailable(UnavailableReason),
    /// The value exists but the metric carries no weight.
    ZeroWeight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedMetric {
    pub metric: String,
    pub reason: ExclusionReason,
}

/// A strategy that could not be scored, with the reason for every metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub strategy: StrategyId,
    pub reasons: Vec<ExcludedMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreCard {
    /// Scored strategies, in table (identifier) order.
    pub entries: Vec<ScoreEntry>,
    pub excluded: Vec<Exclusion>,
}

/// Collapses a standardized table into one composite score per strategy.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: BTreeMap<String, f64>,
    directions: BTreeMap<String, Direction>,
}

impl Scorer {
    /// Metrics missing from `weights` carry no weight; metrics missing from
    /// `directions` are treated as higher-is-better.
    pub fn new(
        weights: BTreeMap<String, f64>,
        directions: BTreeMap<String, Direction>,
    ) -> Result<Self, AnalyzerError> {
        validate_weights(&weights)?;
        Ok(Self { weights, directions })
    }

    pub fn score(&self, standardized: &StandardizedMetricTable) -> ScoreCard {
        let table = standardized.table();
        let mut card = ScoreCard::default();

        for (strategy, row) in table.rows() {
            let contributing: Vec<(&String, f64, f64)> = table
                .metrics()
                .iter()
                .zip(row)
                .filter_map(|(metric, cell)| {
                    let weight = self.weight(metric);
                    cell.value()
                        .filter(|_| weight > 0.0)
                        .map(|value| (metric, value, weight))
                })
                .collect();

            if contributing.is_empty() {
                let reasons: Vec<ExcludedMetric> = table
                    .metrics()
                    .iter()
                    .zip(row)
                    .map(|(metric, cell)| ExcludedMetric {
                        metric: metric.clone(),
                        reason: match cell {
                            MetricValue::Unavailable(reason) => ExclusionReason::Unavailable(*reason),
                            MetricValue::Value(_) => ExclusionReason::ZeroWeight,
                        },
                    })
                    .collect();

                tracing::warn!(
                    strategy = %strategy,
                    reasons = ?reasons.iter().map(|r| &r.reason).collect::<Vec<_>>(),
                    "Strategy has no contributing metric and is excluded from the ranking."
                );
                card.excluded.push(Exclusion {
                    strategy: strategy.clone(),
                    reasons,
                });
                continue;
            }

            let available_weight: f64 = contributing.iter().map(|(_, _, w)| w).sum();
            let contributions: Vec<Contribution> = contributing
                .into_iter()
                .map(|(metric, value, weight)| Contribution {
                    metric: metric.clone(),
                    standardized: value,
                    effective_weight: weight / available_weight,
                    direction: self.direction(metric),
                })
                .collect();

            let score = contributions
                .iter()
                .map(|c| c.effective_weight * c.direction.sign() * c.standardized)
                .sum();

            card.entries.push(ScoreEntry {
                strategy: strategy.clone(),
                score,
                contributions,
            });
        }

        tracing::debug!(
            scored = card.entries.len(),
            excluded = card.excluded.len(),
            "Composite scores computed."
        );
        card
    }

    fn weight(&self, metric: &str) -> f64 {
        self.weights.get(metric).copied().unwrap_or(0.0)
    }

    fn direction(&self, metric: &str) -> Direction {
        self.directions
            .get(metric)
            .copied()
            .unwrap_or(Direction::HigherIsBetter)
    }
}

pub(crate) fn validate_weights(weights: &BTreeMap<String, f64>) -> Result<(), AnalyzerError> {
    match weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
        Some((metric, weight)) => Err(AnalyzerError::InvalidWeight {
            metric: metric.clone(),
            weight: *weight,
        }),
        None => Ok(()),
    }
}
