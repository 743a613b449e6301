use crate::error::AnalyzerError;
use crate::ranker::{RankedResult, Ranker};
use crate::rollup::{GroupRanking, StrategyGroup, rollup};
use crate::scorer::{ScoreCard, Scorer, validate_weights};
use crate::standardizer::{StandardizedMetricTable, Standardizer};
use crate::weighting::resolve_weights;
use analytics::{AnalyticsError, CalculatorRegistry, MetricEngine, MetricParams, MetricSpec, RawMetricTable};
use configuration::AnalysisConfig;
use core_types::{
    BenchmarkSeries, DateRange, Direction, ReturnSeries, StandardizationMethod, StrategyId, WeightingScheme,
};
use datasource::DataSource;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Everything the pipeline needs to know besides the return data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Requested metrics, in column order.
    pub metrics: Vec<MetricSpec>,
    /// Weights used by the explicit weighting scheme.
    pub weights: BTreeMap<String, f64>,
    /// Direction overrides; other metrics use their calculator's direction.
    pub directions: BTreeMap<String, Direction>,
    pub standardization: StandardizationMethod,
    pub weighting: WeightingScheme,
    pub tie_epsilon: f64,
    pub groups: Vec<StrategyGroup>,
}

impl PipelineConfig {
    /// A configuration that weights every requested metric equally.
    pub fn new(metrics: Vec<MetricSpec>) -> Self {
        let weights = metrics.iter().map(|m| (m.name.clone(), 1.0)).collect();
        Self {
            metrics,
            weights,
            directions: BTreeMap::new(),
            standardization: StandardizationMethod::default(),
            weighting: WeightingScheme::default(),
            tie_epsilon: 0.0,
            groups: Vec::new(),
        }
    }

    pub fn with_weights(mut self, weights: BTreeMap<String, f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_direction(mut self, metric: impl Into<String>, direction: Direction) -> Self {
        self.directions.insert(metric.into(), direction);
        self
    }

    pub fn with_standardization(mut self, method: StandardizationMethod) -> Self {
        self.standardization = method;
        self
    }

    pub fn with_weighting(mut self, scheme: WeightingScheme) -> Self {
        self.weighting = scheme;
        self
    }

    pub fn with_tie_epsilon(mut self, epsilon: f64) -> Self {
        self.tie_epsilon = epsilon;
        self
    }

    pub fn with_groups(mut self, groups: Vec<StrategyGroup>) -> Self {
        self.groups = groups;
        self
    }

    /// Catches every configuration mistake before any metric is computed.
    pub fn validate(&self, registry: &CalculatorRegistry) -> Result<(), AnalyzerError> {
        let mut requested = HashSet::with_capacity(self.metrics.len());
        for spec in &self.metrics {
            if !requested.insert(spec.name.as_str()) {
                return Err(AnalyticsError::DuplicateMetric(spec.name.clone()).into());
            }
            registry.resolve(&spec.name)?;
            spec.validate()?;
        }

        let stray = self
            .weights
            .keys()
            .chain(self.directions.keys())
            .find(|name| !requested.contains(name.as_str()));
        if let Some(name) = stray {
            return Err(AnalyticsError::UnknownMetric(name.clone()).into());
        }

        validate_weights(&self.weights)?;
        Ranker::new(self.tie_epsilon)?;
        Ok(())
    }
}

impl TryFrom<&AnalysisConfig> for PipelineConfig {
    type Error = AnalyzerError;

    fn try_from(config: &AnalysisConfig) -> Result<Self, Self::Error> {
        let metrics = config
            .metrics
            .iter()
            .map(|m| {
                MetricSpec::with_params(
                    m.name.clone(),
                    MetricParams {
                        risk_free_rate: to_f64(m.risk_free_rate),
                        periods_per_year: f64::from(m.periods_per_year),
                        lookback: m.lookback,
                        threshold: to_f64(m.threshold),
                    },
                )
            })
            .collect();

        let groups = config
            .groups
            .iter()
            .map(|g| StrategyGroup::new(g.name.clone(), g.members.iter().cloned()))
            .collect();

        let tie_epsilon = to_f64(config.tie_epsilon);
        Ranker::new(tie_epsilon)?;

        Ok(Self {
            metrics,
            weights: config
                .weights
                .iter()
                .map(|(metric, w)| (metric.clone(), to_f64(*w)))
                .collect(),
            directions: config.direction.clone(),
            standardization: config.standardization,
            weighting: config.weighting,
            tie_epsilon,
            groups,
        })
    }
}

// Out-of-range values become NaN and are rejected by validation.
fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// The full result of one pipeline run, from raw metrics to the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub raw: RawMetricTable,
    pub standardized: StandardizedMetricTable,
    /// The weights actually used, after applying the weighting scheme.
    pub weights: BTreeMap<String, f64>,
    /// The direction actually used for each metric.
    pub directions: BTreeMap<String, Direction>,
    pub scores: ScoreCard,
    pub ranking: RankedResult,
    pub groups: GroupRanking,
}

/// Composes metric computation, standardization, weighting, scoring and
/// ranking into a single call.
#[derive(Debug)]
pub struct RankingPipeline<'a> {
    registry: &'a CalculatorRegistry,
    config: PipelineConfig,
    ranker: Ranker,
}

impl<'a> RankingPipeline<'a> {
    pub fn new(registry: &'a CalculatorRegistry, config: PipelineConfig) -> Result<Self, AnalyzerError> {
        config.validate(registry)?;
        let ranker = Ranker::new(config.tie_epsilon)?;
        Ok(Self {
            registry,
            config,
            ranker,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(
        &self,
        strategies: &BTreeMap<StrategyId, ReturnSeries>,
        benchmark: Option<&BenchmarkSeries>,
    ) -> Result<PipelineOutput, AnalyzerError> {
        if strategies.is_empty() {
            return Err(AnalyzerError::EmptyUniverse);
        }

        tracing::info!(
            strategies = strategies.len(),
            metrics = self.config.metrics.len(),
            standardization = ?self.config.standardization,
            weighting = ?self.config.weighting,
            "Starting ranking pipeline."
        );

        // 1. Compute
        let raw = MetricEngine::new(self.registry).compute(strategies, benchmark, &self.config.metrics)?;

        // 2. Standardize
        let standardized = Standardizer::new(self.config.standardization).standardize(&raw)?;

        // 3. Score
        let weights = resolve_weights(self.config.weighting, &self.config.weights, &standardized);
        let directions = self.resolve_directions()?;
        let scores = Scorer::new(weights.clone(), directions.clone())?.score(&standardized);

        // 4. Rank
        let ranking = self.ranker.rank(&scores.entries);
        let groups = rollup(&self.config.groups, &ranking, self.ranker.epsilon());

        tracing::info!(
            ranked = ranking.len(),
            excluded = scores.excluded.len(),
            leader = ranking.entries.first().map(|e| e.strategy.as_str()).unwrap_or("-"),
            "Ranking pipeline complete."
        );

        Ok(PipelineOutput {
            raw,
            standardized,
            weights,
            directions,
            scores,
            ranking,
            groups,
        })
    }

    /// Fetches the series from `source` and runs the pipeline over them.
    ///
    /// An empty `ids` slice means every strategy the source knows, except the
    /// benchmark.
    pub fn run_with_source(
        &self,
        source: &dyn DataSource,
        ids: &[StrategyId],
        range: &DateRange,
        benchmark_id: Option<&StrategyId>,
    ) -> Result<PipelineOutput, AnalyzerError> {
        let ids: Vec<StrategyId> = if ids.is_empty() {
            source
                .strategy_ids()
                .into_iter()
                .filter(|id| Some(id) != benchmark_id)
                .collect()
        } else {
            ids.to_vec()
        };

        let strategies = ids
            .into_iter()
            .map(|id| {
                let series = source.fetch(&id, range)?;
                Ok((id, series))
            })
            .collect::<Result<BTreeMap<_, _>, AnalyzerError>>()?;

        let benchmark = benchmark_id
            .map(|id| source.fetch(id, range))
            .transpose()?;

        self.run(&strategies, benchmark.as_ref())
    }

    fn resolve_directions(&self) -> Result<BTreeMap<String, Direction>, AnalyzerError> {
        self.config
            .metrics
            .iter()
            .map(|spec| {
                let direction = match self.config.directions.get(&spec.name) {
                    Some(direction) => *direction,
                    None => self.registry.resolve(&spec.name)?.direction(),
                };
                Ok((spec.name.clone(), direction))
            })
            .collect()
    }
}
