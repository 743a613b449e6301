//! Resolution of the per-metric weights used by the scorer.

use crate::standardizer::StandardizedMetricTable;
use analytics::MetricValue;
use core_types::WeightingScheme;
use std::collections::BTreeMap;

/// Produces one weight per metric of `standardized` under `scheme`.
///
/// * `Explicit` uses `configured`; metrics without an entry get 0.
/// * `Equal` gives every metric 1/M.
/// * `Entropy` favours metrics that discriminate more between strategies.
pub fn resolve_weights(
    scheme: WeightingScheme,
    configured: &BTreeMap<String, f64>,
    standardized: &StandardizedMetricTable,
) -> BTreeMap<String, f64> {
    let metrics = standardized.table().metrics();
    let weights = match scheme {
        WeightingScheme::Explicit => metrics
            .iter()
            .map(|m| (m.clone(), configured.get(m).copied().unwrap_or(0.0)))
            .collect(),
        WeightingScheme::Equal => equal_weights(metrics),
        WeightingScheme::Entropy => entropy_weights(standardized),
    };

    tracing::debug!(?scheme, ?weights, "Resolved metric weights.");
    weights
}

fn equal_weights(metrics: &[String]) -> BTreeMap<String, f64> {
    let share = 1.0 / metrics.len().max(1) as f64;
    metrics.iter().map(|m| (m.clone(), share)).collect()
}

/// Entropy weight method: w_j = d_j / Σd with diversity d_j = 1 - e_j, where
/// e_j is the normalized Shannon entropy of column j after shifting it to
/// be non-negative.
fn entropy_weights(standardized: &StandardizedMetricTable) -> BTreeMap<String, f64> {
    let table = standardized.table();
    let diversities: Vec<f64> = (0..table.num_metrics())
        .map(|index| {
            let column: Vec<f64> = table
                .column(index)
                .iter()
                .filter_map(MetricValue::value)
                .collect();
            1.0 - normalized_entropy(&column)
        })
        .collect();

    let total: f64 = diversities.iter().sum();
    if total <= 0.0 {
        return equal_weights(table.metrics());
    }

    table
        .metrics()
        .iter()
        .zip(&diversities)
        .map(|(metric, d)| (metric.clone(), d / total))
        .collect()
}

/// Entropy in [0, 1]; 1 for columns that carry no information.
fn normalized_entropy(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let shifted: Vec<f64> = values.iter().map(|v| v - min).collect();
    let sum: f64 = shifted.iter().sum();
    if sum <= 0.0 {
        return 1.0;
    }

    let entropy: f64 = shifted
        .iter()
        .map(|x| x / sum)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.ln())
        .sum();
    (entropy / (values.len() as f64).ln()).clamp(0.0, 1.0)
}
