use crate::error::AnalyzerError;
use analytics::stats;
use analytics::{MetricTable, MetricValue, RawMetricTable};
use core_types::StandardizationMethod;
use rayon::prelude::*;
use serde::Serialize;

/// A metric table whose columns have been brought onto a common scale.
///
/// Same shape as the raw table it was derived from. Unavailable cells are
/// carried over unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardizedMetricTable {
    method: StandardizationMethod,
    table: MetricTable,
}

impl StandardizedMetricTable {
    pub fn method(&self) -> StandardizationMethod {
        self.method
    }

    pub fn table(&self) -> &MetricTable {
        &self.table
    }
}

/// Converts raw metric columns into comparable, unit-free scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standardizer {
    method: StandardizationMethod,
}

impl Standardizer {
    pub fn new(method: StandardizationMethod) -> Self {
        Self { method }
    }

    /// Standardizes every column independently, over its available values only.
    pub fn standardize(&self, raw: &RawMetricTable) -> Result<StandardizedMetricTable, AnalyzerError> {
        let columns: Vec<Vec<MetricValue>> = raw
            .metrics()
            .par_iter()
            .enumerate()
            .map(|(index, metric)| {
                let column = raw.column(index);
                let standardized = standardize_column(self.method, &column);
                if standardized.degenerate {
                    tracing::debug!(
                        %metric,
                        method = ?self.method,
                        "Column has no spread; assigning the neutral value."
                    );
                }
                standardized.values
            })
            .collect();

        let table = MetricTable::from_columns(raw.strategies().to_vec(), raw.metrics().to_vec(), columns)?;
        Ok(StandardizedMetricTable {
            method: self.method,
            table,
        })
    }
}

struct StandardizedColumn {
    values: Vec<MetricValue>,
    degenerate: bool,
}

fn standardize_column(method: StandardizationMethod, column: &[MetricValue]) -> StandardizedColumn {
    let available: Vec<f64> = column.iter().filter_map(MetricValue::value).collect();
    let (min, max) = available
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    // Identical values are checked directly; a computed std can be a rounding
    // artefact rather than exactly zero.
    let flat = available.is_empty() || min == max;

    let (transform, degenerate): (Box<dyn Fn(f64) -> f64>, bool) = match method {
        StandardizationMethod::ZScore => {
            let spread = stats::mean(&available).zip(stats::sample_std_dev(&available));
            match spread {
                Some((mean, std)) if !flat && std > 0.0 => (Box::new(move |x| (x - mean) / std), false),
                _ => (Box::new(|_| 0.0), true),
            }
        }
        StandardizationMethod::MinMax => {
            if flat {
                (Box::new(|_| 0.5), true)
            } else {
                let range = max - min;
                (Box::new(move |x| (x - min) / range), false)
            }
        }
        StandardizationMethod::RankPercentile => {
            let mut sorted = available.clone();
            sorted.sort_by(f64::total_cmp);
            let n = sorted.len() as f64;
            (
                Box::new(move |x| {
                    let less = sorted.partition_point(|v| *v < x);
                    let less_or_equal = sorted.partition_point(|v| *v <= x);
                    (less as f64 + 0.5 * (less_or_equal - less) as f64) / n
                }),
                false,
            )
        }
    };

    let values = column
        .iter()
        .map(|cell| match cell {
            MetricValue::Value(x) => MetricValue::Value(transform(*x)),
            unavailable => *unavailable,
        })
        .collect();

    StandardizedColumn {
        values,
        degenerate: degenerate && !available.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::UnavailableReason;
    use approx::assert_relative_eq;
    use core_types::StrategyId;

    const MISSING: MetricValue = MetricValue::Unavailable(UnavailableReason::InsufficientData);

    fn raw(column: Vec<MetricValue>) -> RawMetricTable {
        let strategies = (0..column.len())
            .map(|i| StrategyId::new(format!("s{}", i)))
            .collect();
        MetricTable::from_columns(strategies, vec!["m".to_string()], vec![column]).unwrap()
    }

    fn standardized(method: StandardizationMethod, column: Vec<MetricValue>) -> Vec<MetricValue> {
        Standardizer::new(method)
            .standardize(&raw(column))
            .unwrap()
            .table()
            .column(0)
    }

    fn values(cells: &[MetricValue]) -> Vec<f64> {
        cells.iter().filter_map(MetricValue::value).collect()
    }

    #[test]
    fn test_z_score_uses_sample_std() {
        let out = standardized(
            StandardizationMethod::ZScore,
            vec![MetricValue::Value(1.0), MetricValue::Value(2.0), MetricValue::Value(3.0)],
        );
        let z = values(&out);

        // mean 2, sample std 1
        assert_relative_eq!(z[0], -1.0);
        assert_relative_eq!(z[1], 0.0);
        assert_relative_eq!(z[2], 1.0);
    }

    #[test]
    fn test_identical_values_get_neutral_value() {
        let column = vec![MetricValue::Value(0.1), MetricValue::Value(0.1), MetricValue::Value(0.1)];

        assert_eq!(values(&standardized(StandardizationMethod::ZScore, column.clone())), vec![0.0; 3]);
        assert_eq!(values(&standardized(StandardizationMethod::MinMax, column.clone())), vec![0.5; 3]);
        assert_eq!(
            values(&standardized(StandardizationMethod::RankPercentile, column)),
            vec![0.5; 3]
        );
    }

    #[test]
    fn test_single_available_value_is_neutral() {
        let out = standardized(StandardizationMethod::ZScore, vec![MetricValue::Value(4.2), MISSING]);
        assert_eq!(out, vec![MetricValue::Value(0.0), MISSING]);
    }

    #[test]
    fn test_min_max_scales_to_unit_interval() {
        let out = standardized(
            StandardizationMethod::MinMax,
            vec![MetricValue::Value(-2.0), MISSING, MetricValue::Value(6.0), MetricValue::Value(0.0)],
        );

        assert_eq!(
            out,
            vec![
                MetricValue::Value(0.0),
                MISSING,
                MetricValue::Value(1.0),
                MetricValue::Value(0.25)
            ]
        );
    }

    #[test]
    fn test_rank_percentile_uses_midpoint_for_ties() {
        let out = standardized(
            StandardizationMethod::RankPercentile,
            vec![
                MetricValue::Value(10.0),
                MetricValue::Value(20.0),
                MetricValue::Value(20.0),
                MetricValue::Value(30.0),
            ],
        );

        assert_eq!(values(&out), vec![0.125, 0.5, 0.5, 0.875]);
    }

    #[test]
    fn test_all_unavailable_column_stays_unavailable() {
        let column = vec![MISSING, MISSING];
        for method in [
            StandardizationMethod::ZScore,
            StandardizationMethod::MinMax,
            StandardizationMethod::RankPercentile,
        ] {
            assert_eq!(standardized(method, column.clone()), column);
        }
    }

    #[test]
    fn test_columns_are_independent() {
        let table = MetricTable::from_columns(
            vec!["a".into(), "b".into()],
            vec!["x".to_string(), "y".to_string()],
            vec![
                vec![MetricValue::Value(1.0), MetricValue::Value(3.0)],
                vec![MetricValue::Value(100.0), MetricValue::Value(100.0)],
            ],
        )
        .unwrap();

        let out = Standardizer::new(StandardizationMethod::MinMax)
            .standardize(&table)
            .unwrap();

        assert_eq!(out.method(), StandardizationMethod::MinMax);
        assert_eq!(out.table().column(0), vec![MetricValue::Value(0.0), MetricValue::Value(1.0)]);
        assert_eq!(out.table().column(1), vec![MetricValue::Value(0.5), MetricValue::Value(0.5)]);
    }
}
