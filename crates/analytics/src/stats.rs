//! Descriptive statistics over plain `f64` slices.
//!
//! Dispersion measures use the sample (n - 1) convention and return `None`
//! when there are too few observations to define them. A series that is
//! constant up to rounding (for example `[0.1; 3]`, whose computed mean is not
//! exactly 0.1) has a dispersion of exactly zero.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Spread below this many machine epsilons of the largest magnitude is
/// treated as rounding residue rather than real dispersion.
const NOISE_FLOOR_EPSILONS: f64 = 64.0;

pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    let variance = sum_sq / (values.len() - 1) as f64;

    let scale = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if variance.sqrt() <= NOISE_FLOOR_EPSILONS * f64::EPSILON * scale {
        return Some(0.0);
    }
    Some(variance)
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Sample covariance of two equally long series.
pub fn sample_covariance(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if sample_variance(xs)? == 0.0 || sample_variance(ys)? == 0.0 {
        return Some(0.0);
    }
    let (mean_x, mean_y) = (mean(xs)?, mean(ys)?);
    let sum: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    Some(sum / (xs.len() - 1) as f64)
}

/// Largest peak-to-trough decline of the compounded equity curve, as a
/// positive fraction of the peak. The curve starts at 1.0 before the first
/// return.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = 1.0;
    let mut max_drawdown: f64 = 0.0;

    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        max_drawdown = max_drawdown.max((peak - equity) / peak);
    }

    max_drawdown
}
