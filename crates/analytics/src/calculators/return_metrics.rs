use super::{aligned, ratio, MetricCalculator};
use crate::spec::MetricParams;
use crate::stats::{mean, sample_covariance, sample_variance};
use crate::table::UnavailableReason;
use core_types::{AlignedReturns, BenchmarkSeries, ReturnSeries};

/// Average per-period return over the benchmark: `mean(r - b)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcessReturn;

impl MetricCalculator for ExcessReturn {
    fn name(&self) -> &str {
        "excess_return"
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
        _params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let aligned = aligned(returns, benchmark, self.min_observations())?;
        mean(&aligned.active()).ok_or(UnavailableReason::InsufficientData)
    }
}

/// Sensitivity to the benchmark: `cov(r, b) / var(b)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Beta;

impl MetricCalculator for Beta {
    fn name(&self) -> &str {
        "beta"
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
        _params: &MetricParams,
    ) -> Result<f64, UnavailableReason> {
        let aligned = aligned(returns, benchmark, self.min_observations())?;
        beta(&aligned)
    }
}

fn beta(aligned: &AlignedReturns) -> Result<f64, UnavailableReason> {
    let covariance = sample_covariance(&aligned.returns, &aligned.benchmark)
        .ok_or(UnavailableReason::InsufficientData)?;
    let variance = sample_variance(&aligned.benchmark).ok_or(UnavailableReason::InsufficientData)?;
    ratio(covariance, variance)
}

/// Jensen's alpha, annualized:
/// `(mean(r) - rf) - beta * (mean(b) - rf)`, scaled by periods per year.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alpha;

impl MetricCalculator for Alpha {
    fn name(&self) -> &str {
        "alpha"
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
        let beta = beta(&aligned)?;
        let rf = params.periodic_risk_free_rate();

        let mean_return = mean(&aligned.returns).ok_or(UnavailableReason::InsufficientData)?;
        let mean_benchmark = mean(&aligned.benchmark).ok_or(UnavailableReason::InsufficientData)?;

        let periodic_alpha = (mean_return - rf) - beta * (mean_benchmark - rf);
        Ok(periodic_alpha * params.periods_per_year)
    }
}
