use super::{aligned, ratio, values, MetricCalculator};
use crate::spec::MetricParams;
use crate::stats::{mean, sample_std_dev};
use crate::table::UnavailableReason;
use core_types::{BenchmarkSeries, ReturnSeries};

/// Annualized Sharpe ratio: `(mean(r) - rf) / std(r) * sqrt(k)`.
///
/// See docs: <https://www.investopedia.com/articles/07/sharpe_ratio.asp>
#[derive(Debug, Clone, Copy, Default)]
pub struct SharpeRatio;

impl MetricCalculator for SharpeRatio {
    fn name(&self) -> &str {
        "sharpe_ratio"
    }

    fn min_observations(&self) -> usize {
        2
    }

    fn calculate(
        &self,
        returns: &ReturnSeries,
        _benchmark: Option<&BenchmarkSeries>,
        params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let values = values(returns, self.min_observations())?;
        let mean_return = mean(&values).ok_or(UnavailableReason::InsufficientData)?;
        let std_dev = sample_std_dev(&values).ok_or(UnavailableReason::InsufficientData)?;

        let sharpe = ratio(mean_return - params.periodic_risk_free_rate(), std_dev)?;
        Ok(sharpe * params.annualization())
    }
}

/// Annualized Sortino ratio: like Sharpe, but the denominator is the standard
/// deviation of the negative returns only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortinoRatio;

impl MetricCalculator for SortinoRatio {
    fn name(&self) -> &str {
        "sortino_ratio"
    }

    fn min_observations(&self) -> usize {
        2
    }

    fn calculate(
        &self,
        returns: &ReturnSeries,
        _benchmark: Option<&BenchmarkSeries>,
        params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let values = values(returns, self.min_observations())?;
        let mean_return = mean(&values).ok_or(UnavailableReason::InsufficientData)?;

        let downside: Vec<f64> = values.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_dev = sample_std_dev(&downside).ok_or(UnavailableReason::InsufficientData)?;

        let sortino = ratio(mean_return - params.periodic_risk_free_rate(), downside_dev)?;
        Ok(sortino * params.annualization())
    }
}

/// Annualized information ratio: mean active return over tracking error.
#[derive(Debug, Clone, Copy, Default)]
pub struct InformationRatio;

impl MetricCalculator for InformationRatio {
    fn name(&self) -> &str {
        "information_ratio"
    }

    fn requires_benchmark(&self) -> bool {
        true
    }

    fn min_observations(&self) -> usize {
        2
    }

    fn calculate(
        &self,
        returns: &ReturnSeries,
        benchmark: Option<&BenchmarkSeries>,
        params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let aligned = aligned(returns, benchmark, self.min_observations())?;
        let active = aligned.active();

        let mean_active = mean(&active).ok_or(UnavailableReason::InsufficientData)?;
        let tracking = sample_std_dev(&active).ok_or(UnavailableReason::InsufficientData)?;

        Ok(ratio(mean_active, tracking)? * params.annualization())
    }
}

/// Omega ratio of active returns around `params.threshold`: the sum of gains
/// above the threshold over the sum of shortfalls below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OmegaRatio;

impl MetricCalculator for OmegaRatio {
    fn name(&self) -> &str {
        "omega_ratio"
    }

    fn requires_benchmark(&self) -> bool {
        true
    }

    fn min_observations(&self) -> usize {
        1
    }

    fn calculate(
        &self,
        returns: &ReturnSeries,
        benchmark: Option<&BenchmarkSeries>,
        params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let aligned = aligned(returns, benchmark, self.min_observations())?;
        let threshold = params.threshold;

        let (gains, losses) = aligned
            .active()
            .into_iter()
            .fold((0.0, 0.0), |(gains, losses), excess| {
                if excess > threshold {
                    (gains + (excess - threshold), losses)
                } else {
                    (gains, losses + (threshold - excess))
                }
            });

        ratio(gains, losses)
    }
}
