use crate::calculators::MetricCalculator;
use crate::error::AnalyticsError;
use crate::registry::CalculatorRegistry;
use crate::spec::MetricSpec;
use crate::table::{MetricTable, MetricValue, RawMetricTable, UnavailableReason};
use core_types::{BenchmarkSeries, ReturnSeries, StrategyId};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// A stateless orchestrator that evaluates every requested metric for every
/// strategy.
#[derive(Debug, Clone, Copy)]
pub struct MetricEngine<'a> {
    registry: &'a CalculatorRegistry,
}

impl<'a> MetricEngine<'a> {
    pub fn new(registry: &'a CalculatorRegistry) -> Self {
        Self { registry }
    }

    /// The main entry point for building the raw metric table.
    ///
    /// # Arguments
    ///
    /// * `strategies` - Return series keyed by strategy; rows follow key order.
    /// * `benchmark` - The shared reference series, if any.
    /// * `specs` - The requested metrics; columns follow this order.
    ///
    /// # Returns
    ///
    /// A table with exactly one cell per (strategy, metric) pair, or an
    /// `AnalyticsError` if the request itself is malformed. Data problems in a
    /// single cell never fail the call; they are recorded as `Unavailable`.
    pub fn compute(
        &self,
        strategies: &BTreeMap<StrategyId, ReturnSeries>,
        benchmark: Option<&BenchmarkSeries>,
        specs: &[MetricSpec],
    ) -> Result<RawMetricTable, AnalyticsError> {
        let calculators = self.resolve_all(specs)?;

        tracing::info!(
            strategies = strategies.len(),
            metrics = specs.len(),
            benchmark = benchmark.is_some(),
            "Computing raw metric table."
        );

        let rows: Vec<(&StrategyId, &ReturnSeries)> = strategies.iter().collect();
        let width = specs.len();

        // Indexed collection keeps row-major order regardless of which worker
        // finishes first.
        let cells: Vec<MetricValue> = (0..rows.len() * width)
            .into_par_iter()
            .map(|index| {
                let (strategy, series) = rows[index / width];
                let spec = &specs[index % width];
                let value = compute_cell(calculators[index % width].as_ref(), series, benchmark, spec);
                if let MetricValue::Unavailable(reason) = value {
                    tracing::debug!(
                        strategy = %strategy,
                        metric = %spec.name,
                        %reason,
                        "Metric unavailable."
                    );
                }
                value
            })
            .collect();

        let table = MetricTable::from_rows(
            rows.iter().map(|(id, _)| (*id).clone()).collect(),
            specs.iter().map(|s| s.name.clone()).collect(),
            cells,
        )?;

        tracing::info!(
            available = table.available_count(),
            total = rows.len() * width,
            "Raw metric table complete."
        );
        Ok(table)
    }

    /// Resolves and validates every spec before any cell is computed.
    fn resolve_all(&self, specs: &[MetricSpec]) -> Result<Vec<Arc<dyn MetricCalculator>>, AnalyticsError> {
        let mut seen = HashSet::with_capacity(specs.len());
        specs
            .iter()
            .map(|spec| {
                if !seen.insert(spec.name.as_str()) {
                    return Err(AnalyticsError::DuplicateMetric(spec.name.clone()));
                }
                spec.validate()?;
                self.registry.resolve(&spec.name)
            })
            .collect()
    }
}

fn compute_cell(
    calculator: &dyn MetricCalculator,
    series: &ReturnSeries,
    benchmark: Option<&BenchmarkSeries>,
    spec: &MetricSpec,
) -> MetricValue {
    let series = match spec.params.lookback {
        Some(n) => Cow::Owned(series.tail(n)),
        None => Cow::Borrowed(series),
    };

    let observations = if calculator.requires_benchmark() {
        match benchmark {
            Some(benchmark) => series.align_with(benchmark).len(),
            None => return MetricValue::Unavailable(UnavailableReason::MissingBenchmark),
        }
    } else {
        series.len()
    };

    if observations < calculator.min_observations() {
        return MetricValue::Unavailable(UnavailableReason::InsufficientData);
    }

    MetricValue::from(calculator.calculate(&series, benchmark, &spec.params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::monthly;
    use crate::spec::MetricParams;

    fn universe() -> BTreeMap<StrategyId, ReturnSeries> {
        BTreeMap::from([
            ("B".into(), monthly(&[0.01, 0.02, -0.01, 0.03, 0.00, 0.01])),
            ("A".into(), monthly(&[0.02, -0.01, 0.04, 0.01, 0.02, -0.02])),
            ("C".into(), monthly(&[0.01])),
        ])
    }

    fn specs(names: &[&str]) -> Vec<MetricSpec> {
        names.iter().map(|n| MetricSpec::new(*n)).collect()
    }

    #[test]
    fn test_every_pair_has_a_cell() {
        let registry = CalculatorRegistry::with_builtins();
        let engine = MetricEngine::new(&registry);
        let benchmark = monthly(&[0.005, 0.01, 0.0, 0.01, 0.005, 0.0]);

        let table = engine
            .compute(
                &universe(),
                Some(&benchmark),
                &specs(&["sharpe_ratio", "beta", "max_drawdown"]),
            )
            .unwrap();

        assert_eq!(table.num_strategies(), 3);
        assert_eq!(table.num_metrics(), 3);
        assert_eq!(table.cells().len(), 9);
        // Rows are ordered by identifier.
        assert_eq!(table.strategies()[0], StrategyId::from("A"));
        // A single observation is too short for the Sharpe ratio but fine for drawdown.
        assert_eq!(
            table.get(&"C".into(), "sharpe_ratio"),
            Some(&MetricValue::Unavailable(UnavailableReason::InsufficientData))
        );
        assert!(table.get(&"C".into(), "max_drawdown").unwrap().is_available());
    }

    #[test]
    fn test_missing_benchmark_is_isolated_per_cell() {
        let registry = CalculatorRegistry::with_builtins();
        let table = MetricEngine::new(&registry)
            .compute(&universe(), None, &specs(&["beta", "volatility"]))
            .unwrap();

        let beta = table.column(0);
        assert!(
            beta.iter()
                .all(|c| *c == MetricValue::Unavailable(UnavailableReason::MissingBenchmark))
        );
        assert!(table.get(&"A".into(), "volatility").unwrap().is_available());
    }

    #[test]
    fn test_unknown_metric_fails_the_call() {
        let registry = CalculatorRegistry::with_builtins();
        let err = MetricEngine::new(&registry)
            .compute(&universe(), None, &specs(&["volatility", "foo"]))
            .unwrap_err();

        assert_eq!(err, AnalyticsError::UnknownMetric("foo".to_string()));
    }

    #[test]
    fn test_duplicate_spec_fails_the_call() {
        let registry = CalculatorRegistry::with_builtins();
        let err = MetricEngine::new(&registry)
            .compute(&universe(), None, &specs(&["volatility", "volatility"]))
            .unwrap_err();

        assert_eq!(err, AnalyticsError::DuplicateMetric("volatility".to_string()));
    }

    #[test]
    fn test_lookback_uses_trailing_window() {
        let registry = CalculatorRegistry::with_builtins();
        let strategies = BTreeMap::from([(
            StrategyId::from("A"),
            monthly(&[-0.50, 0.01, 0.02, 0.01]),
        )]);
        let spec = MetricSpec::with_params(
            "max_drawdown",
            MetricParams {
                lookback: Some(3),
                ..Default::default()
            },
        );

        let table = MetricEngine::new(&registry)
            .compute(&strategies, None, &[spec])
            .unwrap();

        assert_eq!(table.get(&"A".into(), "max_drawdown"), Some(&MetricValue::Value(0.0)));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let registry = CalculatorRegistry::with_builtins();
        let engine = MetricEngine::new(&registry);
        let benchmark = monthly(&[0.005, 0.01, 0.0, 0.01, 0.005, 0.0]);
        let requested = specs(&["sharpe_ratio", "alpha", "tracking_error", "omega_ratio"]);

        let first = engine.compute(&universe(), Some(&benchmark), &requested).unwrap();
        for _ in 0..5 {
            let again = engine.compute(&universe(), Some(&benchmark), &requested).unwrap();
            assert_eq!(first, again);
        }
    }
}
