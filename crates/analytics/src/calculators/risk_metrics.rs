use super::{aligned, values, MetricCalculator};
use crate::spec::MetricParams;
use crate::stats::{max_drawdown, sample_std_dev};
use crate::table::UnavailableReason;
use core_types::{BenchmarkSeries, Direction, ReturnSeries};

/// Annualized standard deviation of returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Volatility;

impl MetricCalculator for Volatility {
    fn name(&self) -> &str {
        "volatility"
    }

    fn min_observations(&self) -> usize {
        2
    }

    fn direction(&self) -> Direction {
        Direction::LowerIsBetter
    }

    fn calculate(
        &self,
        returns: &ReturnSeries,
        _benchmark: Option<&BenchmarkSeries>,
        params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let values = values(returns, self.min_observations())?;
        let std_dev = sample_std_dev(&values).ok_or(UnavailableReason::InsufficientData)?;
        Ok(std_dev * params.annualization())
    }
}

/// Worst peak-to-trough loss of the compounded equity curve, as a positive
/// fraction (0.25 for a 25% drawdown).
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxDrawdown;

impl MetricCalculator for MaxDrawdown {
    fn name(&self) -> &str {
        "max_drawdown"
    }

    fn min_observations(&self) -> usize {
        1
    }

    fn direction(&self) -> Direction {
        Direction::LowerIsBetter
    }

    fn calculate(
        &self,
        returns: &ReturnSeries,
        _benchmark: Option<&BenchmarkSeries>,
        _params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let values = values(returns, self.min_observations())?;
        Ok(max_drawdown(&values))
    }
}

/// Annualized standard deviation of active returns against the benchmark.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingError;

impl MetricCalculator for TrackingError {
    fn name(&self) -> &str {
        "tracking_error"
    }

    fn requires_benchmark(&self) -> bool {
        true
    }

    fn min_observations(&self) -> usize {
        2
    }

    fn direction(&self) -> Direction {
        Direction::LowerIsBetter
    }

    fn calculate(
        &self,
        returns: &ReturnSeries,
        benchmark: Option<&BenchmarkSeries>,
        params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let aligned = aligned(returns, benchmark, self.min_observations())?;
        let std_dev = sample_std_dev(&aligned.active()).ok_or(UnavailableReason::InsufficientData)?;
        Ok(std_dev * params.annualization())
    }
}
