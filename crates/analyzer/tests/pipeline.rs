use analytics::{AnalyticsError, CalculatorRegistry, MetricSpec, MetricValue, UnavailableReason};
use analyzer::{
    AnalyzerError, ExclusionReason, PipelineConfig, RankingPipeline, StrategyGroup,
};
use approx::assert_relative_eq;
use chrono::NaiveDate;
use core_types::{DateRange, ReturnSeries, StandardizationMethod, StrategyId};
use datasource::InMemorySource;
use std::collections::BTreeMap;

fn monthly(values: &[f64]) -> ReturnSeries {
    ReturnSeries::from_monthly(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(), values).unwrap()
}

/// `n` observations alternating around `mean` by `amplitude`.
fn alternating(mean: f64, amplitude: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| if i % 2 == 0 { mean + amplitude } else { mean - amplitude })
        .collect()
}

fn specs(names: &[&str]) -> Vec<MetricSpec> {
    names.iter().map(|n| MetricSpec::new(*n)).collect()
}

fn universe(entries: &[(&str, Vec<f64>)]) -> BTreeMap<StrategyId, ReturnSeries> {
    entries
        .iter()
        .map(|(id, values)| (StrategyId::from(*id), monthly(values)))
        .collect()
}

#[test]
fn test_two_strategies_ranked_by_sharpe_with_symmetric_scores() {
    let registry = CalculatorRegistry::with_builtins();
    let pipeline = RankingPipeline::new(&registry, PipelineConfig::new(specs(&["sharpe_ratio"]))).unwrap();

    // Sharpe(A) = 0.012 / 0.02-ish, Sharpe(B) = 0.008 / 0.01-ish, so B wins.
    let strategies = universe(&[
        ("A", alternating(0.012, 0.02, 24)),
        ("B", alternating(0.008, 0.01, 24)),
    ]);

    let output = pipeline.run(&strategies, None).unwrap();

    let sharpe_a = output.raw.get(&"A".into(), "sharpe_ratio").unwrap().value().unwrap();
    let sharpe_b = output.raw.get(&"B".into(), "sharpe_ratio").unwrap().value().unwrap();
    assert!(sharpe_b > sharpe_a);

    assert_eq!(output.ranking.order(), vec![&StrategyId::from("B"), &StrategyId::from("A")]);
    let first = &output.ranking.entries[0];
    let second = &output.ranking.entries[1];
    assert_eq!((first.rank, second.rank), (1, 2));

    // Two values standardized with the sample std land at ±1/√2.
    let k = std::f64::consts::FRAC_1_SQRT_2;
    assert_relative_eq!(first.score, k, epsilon = 1e-12);
    assert_relative_eq!(second.score, -k, epsilon = 1e-12);
}

#[test]
fn test_unknown_metric_fails_before_computation() {
    let registry = CalculatorRegistry::with_builtins();

    let err = RankingPipeline::new(&registry, PipelineConfig::new(specs(&["sharpe_ratio", "foo"]))).unwrap_err();

    assert!(matches!(
        err,
        AnalyzerError::Analytics(AnalyticsError::UnknownMetric(ref name)) if name == "foo"
    ));
}

#[test]
fn test_beta_without_benchmark_renormalizes_remaining_weights() {
    let registry = CalculatorRegistry::with_builtins();
    let pipeline = RankingPipeline::new(
        &registry,
        PipelineConfig::new(specs(&["sharpe_ratio", "volatility", "beta"])),
    )
    .unwrap();

    let strategies = universe(&[
        ("A", vec![0.02, -0.01, 0.03, 0.01, -0.02, 0.04]),
        ("B", vec![0.01, 0.01, -0.03, 0.02, 0.00, 0.01]),
        ("C", vec![-0.01, 0.05, 0.02, -0.04, 0.03, 0.00]),
    ]);

    let output = pipeline.run(&strategies, None).unwrap();

    let beta = output.raw.metric_index("beta").unwrap();
    assert!(
        output
            .raw
            .column(beta)
            .iter()
            .all(|cell| *cell == MetricValue::Unavailable(UnavailableReason::MissingBenchmark))
    );

    assert!(output.scores.excluded.is_empty());
    assert_eq!(output.ranking.len(), 3);
    for entry in &output.scores.entries {
        assert_eq!(entry.contributions.len(), 2);
        assert!(entry.contributions.iter().all(|c| c.metric != "beta"));
        for contribution in &entry.contributions {
            assert_relative_eq!(contribution.effective_weight, 0.5);
        }
    }
}

#[test]
fn test_partial_data_is_scored_and_missing_data_is_excluded() {
    let registry = CalculatorRegistry::with_builtins();
    let pipeline = RankingPipeline::new(
        &registry,
        PipelineConfig::new(specs(&["sharpe_ratio", "max_drawdown"])),
    )
    .unwrap();

    let mut strategies = universe(&[
        ("full", vec![0.02, -0.01, 0.03, 0.01, -0.02, 0.04]),
        ("steady", vec![0.01, 0.01, 0.00, 0.02, 0.00, 0.01]),
        ("short", vec![0.03]),
    ]);
    strategies.insert("empty".into(), ReturnSeries::new(Vec::new()).unwrap());

    let output = pipeline.run(&strategies, None).unwrap();

    // Every (strategy, metric) pair has a cell.
    assert_eq!(output.raw.cells().len(), 8);

    let short = output
        .scores
        .entries
        .iter()
        .find(|e| e.strategy.as_str() == "short")
        .unwrap();
    assert_eq!(short.contributions.len(), 1);
    assert_eq!(short.contributions[0].metric, "max_drawdown");

    assert_eq!(output.scores.excluded.len(), 1);
    let excluded = &output.scores.excluded[0];
    assert_eq!(excluded.strategy.as_str(), "empty");
    assert!(
        excluded
            .reasons
            .iter()
            .all(|r| r.reason == ExclusionReason::Unavailable(UnavailableReason::InsufficientData))
    );
    assert_eq!(output.ranking.rank_of(&"empty".into()), None);
    assert_eq!(output.ranking.len(), 3);
}

#[test]
fn test_constant_returns_make_sharpe_unavailable_and_renormalize() {
    let registry = CalculatorRegistry::with_builtins();
    let pipeline = RankingPipeline::new(
        &registry,
        PipelineConfig::new(specs(&["sharpe_ratio", "max_drawdown"])),
    )
    .unwrap();

    let strategies = universe(&[
        ("cash", vec![0.001; 12]),
        ("good", alternating(0.02, 0.005, 12)),
        ("risky", alternating(0.01, 0.04, 12)),
    ]);

    let output = pipeline.run(&strategies, None).unwrap();

    assert_eq!(
        output.raw.get(&"cash".into(), "sharpe_ratio"),
        Some(&MetricValue::Unavailable(UnavailableReason::DegenerateInput))
    );

    let cash = output
        .scores
        .entries
        .iter()
        .find(|e| e.strategy.as_str() == "cash")
        .unwrap();
    assert_eq!(cash.contributions.len(), 1);
    assert_eq!(cash.contributions[0].metric, "max_drawdown");
    assert_relative_eq!(cash.contributions[0].effective_weight, 1.0);

    // Only "good" and "risky" carry a Sharpe value, so the column stays bounded.
    let sharpe = output.standardized.table().metric_index("sharpe_ratio").unwrap();
    let values: Vec<f64> = output
        .standardized
        .table()
        .column(sharpe)
        .iter()
        .filter_map(MetricValue::value)
        .collect();
    assert_eq!(values.len(), 2);
    assert!(values.iter().all(|v| v.abs() < 1.0));
}

#[test]
fn test_identical_strategies_are_ordered_by_identifier() {
    let registry = CalculatorRegistry::with_builtins();
    let pipeline = RankingPipeline::new(
        &registry,
        PipelineConfig::new(specs(&["sharpe_ratio", "volatility"])),
    )
    .unwrap();

    let twin = vec![0.02, -0.01, 0.03, 0.01];
    let strategies = universe(&[
        ("zeta", twin.clone()),
        ("alpha", twin),
        ("other", vec![0.00, 0.01, -0.05, 0.02]),
    ]);

    let output = pipeline.run(&strategies, None).unwrap();
    let order: Vec<&str> = output.ranking.iter().map(|e| e.strategy.as_str()).collect();

    let alpha = order.iter().position(|id| *id == "alpha").unwrap();
    let zeta = order.iter().position(|id| *id == "zeta").unwrap();
    assert_eq!(zeta, alpha + 1);
}

#[test]
fn test_repeated_runs_are_identical() {
    let registry = CalculatorRegistry::with_builtins();
    let config = PipelineConfig::new(specs(&["sharpe_ratio", "sortino_ratio", "volatility", "max_drawdown"]))
        .with_standardization(StandardizationMethod::RankPercentile);
    let pipeline = RankingPipeline::new(&registry, config).unwrap();

    let strategies = universe(&[
        ("A", alternating(0.012, 0.02, 36)),
        ("B", alternating(0.008, 0.01, 36)),
        ("C", vec![0.05, -0.04, 0.03, -0.02, 0.01, -0.03, 0.02, 0.04]),
        ("D", vec![0.01, 0.02]),
    ]);

    let first = pipeline.run(&strategies, None).unwrap();
    for _ in 0..5 {
        assert_eq!(pipeline.run(&strategies, None).unwrap(), first);
    }
}

#[test]
fn test_run_with_source_uses_benchmark_and_skips_it_in_the_universe() {
    let registry = CalculatorRegistry::with_builtins();
    let config = PipelineConfig::new(specs(&["beta", "tracking_error", "information_ratio"]))
        .with_groups(vec![StrategyGroup::new("book", ["fund-a", "fund-b"])]);
    let pipeline = RankingPipeline::new(&registry, config).unwrap();

    let mut source = InMemorySource::new();
    source
        .insert("index", monthly(&[0.01, -0.02, 0.03, 0.00, 0.01, 0.02]))
        .insert("fund-a", monthly(&[0.02, -0.03, 0.04, 0.01, 0.00, 0.03]))
        .insert("fund-b", monthly(&[0.01, -0.01, 0.02, 0.01, 0.02, 0.01]));
    let benchmark = StrategyId::from("index");

    let output = pipeline
        .run_with_source(&source, &[], &DateRange::unbounded(), Some(&benchmark))
        .unwrap();

    assert_eq!(output.raw.num_strategies(), 2);
    assert!(output.raw.strategy_index(&benchmark).is_none());
    assert_eq!(output.raw.available_count(), 6);
    assert_eq!(output.ranking.len(), 2);

    assert_eq!(output.groups.entries.len(), 1);
    assert_eq!(output.groups.entries[0].members.len(), 2);
    // The mean of a two-value z-score column is zero.
    assert_relative_eq!(output.groups.entries[0].score, 0.0, epsilon = 1e-12);
}

#[test]
fn test_unknown_strategy_in_source_is_an_error() {
    let registry = CalculatorRegistry::with_builtins();
    let pipeline = RankingPipeline::new(&registry, PipelineConfig::new(specs(&["volatility"]))).unwrap();

    let err = pipeline
        .run_with_source(&InMemorySource::new(), &[StrategyId::from("ghost")], &DateRange::unbounded(), None)
        .unwrap_err();

    assert!(matches!(err, AnalyzerError::Data(_)));
}

#[test]
fn test_output_serializes_to_json() {
    let registry = CalculatorRegistry::with_builtins();
    let pipeline = RankingPipeline::new(&registry, PipelineConfig::new(specs(&["volatility"]))).unwrap();
    let strategies = universe(&[("A", vec![0.01, 0.03]), ("B", vec![0.02, 0.02])]);

    let output = pipeline.run(&strategies, None).unwrap();
    let json = serde_json::to_value(&output).unwrap();

    // Lower volatility wins.
    assert_eq!(json["ranking"]["entries"][0]["strategy"], "B");
    assert_eq!(json["ranking"]["entries"][0]["rank"], 1);
    assert_eq!(json["directions"]["volatility"], "lower-is-better");
}
