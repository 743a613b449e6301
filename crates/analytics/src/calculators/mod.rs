//! The metric calculator family.
//!
//! Every metric is an independent type implementing [`MetricCalculator`]. The
//! engine never names concrete calculators; it resolves them by name through
//! the [`CalculatorRegistry`](crate::CalculatorRegistry), so adding a metric
//! means adding a type here (or in a downstream crate) and registering it.

use crate::spec::MetricParams;
use crate::table::UnavailableReason;
use core_types::{AlignedReturns, BenchmarkSeries, Direction, ReturnSeries};

pub mod return_metrics;
pub mod risk_adjusted;
pub mod risk_metrics;

pub use return_metrics::{Alpha, Beta, ExcessReturn};
pub use risk_adjusted::{InformationRatio, OmegaRatio, SharpeRatio, SortinoRatio};
pub use risk_metrics::{MaxDrawdown, TrackingError, Volatility};

/// The core trait that all performance metrics must implement.
///
/// Implementations are pure: the same inputs always produce the same result
/// and nothing outside the call is touched. The `Send + Sync` bounds let the
/// engine evaluate cells on multiple threads.
pub trait MetricCalculator: Send + Sync {
    /// The unique name the metric is requested by.
    fn name(&self) -> &str;

    /// Whether the metric is relative to a benchmark series.
    fn requires_benchmark(&self) -> bool {
        false
    }

    /// The fewest observations (aligned with the benchmark, for relative
    /// metrics) the formula can work with.
    fn min_observations(&self) -> usize;

    /// The natural reading of the metric when the configuration does not say.
    fn direction(&self) -> Direction {
        Direction::HigherIsBetter
    }

    /// Computes the metric.
    ///
    /// # Returns
    ///
    /// * `Ok(value)` - the metric value.
    /// * `Err(reason)` - the metric is unavailable for this input.
    fn calculate(
        &self,
        returns: &ReturnSeries,
        benchmark: Option<&BenchmarkSeries>,
        params: &MetricParams,
    ) -> Result<f64, UnavailableReason>;
}

/// Instances of every metric that ships with the crate.
pub fn builtin_calculators() -> Vec<Box<dyn MetricCalculator>> {
    vec![
        Box::new(ExcessReturn),
        Box::new(Beta),
        Box::new(Alpha),
        Box::new(SharpeRatio),
        Box::new(SortinoRatio),
        Box::new(InformationRatio),
        Box::new(OmegaRatio),
        Box::new(Volatility),
        Box::new(MaxDrawdown),
        Box::new(TrackingError),
    ]
}

/// Pairs the strategy with the benchmark, failing when there is none or when
/// fewer than `min` observations overlap.
pub(crate) fn aligned(
    returns: &ReturnSeries,
    benchmark: Option<&BenchmarkSeries>,
    min: usize,
) -> Result<AlignedReturns, UnavailableReason> {
    let benchmark = benchmark.ok_or(UnavailableReason::MissingBenchmark)?;
    let aligned = returns.align_with(benchmark);
    if aligned.len() < min {
        return Err(UnavailableReason::InsufficientData);
    }
    Ok(aligned)
}

/// The plain return values, failing when fewer than `min` are present.
pub(crate) fn values(returns: &ReturnSeries, min: usize) -> Result<Vec<f64>, UnavailableReason> {
    if returns.len() < min {
        return Err(UnavailableReason::InsufficientData);
    }
    Ok(returns.values())
}

/// Divides, treating a zero (or non-finite) denominator as degenerate input.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> Result<f64, UnavailableReason> {
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(UnavailableReason::DegenerateInput);
    }
    Ok(numerator / denominator)
}
