//! Maximum-likelihood estimation of a group mean under censoring.
//!
//! Each uncensored replicate is modeled as `Normal(mu, sigma)` with a
//! shared noise scale estimated from the whole table. A left-censored
//! replicate (`< v`) contributes the probability mass below its bound, a
//! right-censored one (`> v`) the mass above it.

use crate::relation::Censoring;

use super::minimize::minimize_scalar;
use super::normal::{log_cdf, log_pdf, log_sf};

/// How far beyond the observed values the mean is allowed to wander, in
/// units of the noise scale.
const BRACKET_SIGMAS: f64 = 6.0;

const MAX_ITERATIONS: usize = 200;

/// One replicate measurement with its censoring direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub censoring: Censoring,
}

impl Measurement {
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            censoring: Censoring::Exact,
        }
    }

    pub fn left_censored(value: f64) -> Self {
        Self {
            value,
            censoring: Censoring::Left,
        }
    }

    pub fn right_censored(value: f64) -> Self {
        Self {
            value,
            censoring: Censoring::Right,
        }
    }
}

/// Estimate the mean of a replicate group with mixed censoring.
///
/// Fast paths need no noise scale: an all-left-censored group can only
/// bound the mean from above (take the tightest bound, the minimum), an
/// all-right-censored group from below (the maximum), and an uncensored
/// group averages. A genuinely mixed group minimizes the negative
/// log-likelihood over a bracket spanning the observed values; that fit
/// requires a finite positive `sigma`, and returns `None` when the noise
/// scale is unavailable or the minimizer does not converge.
pub fn fit_group_mean(measurements: &[Measurement], sigma: Option<f64>) -> Option<f64> {
    let values: Vec<f64> = measurements
        .iter()
        .filter(|m| m.value.is_finite())
        .map(|m| m.value)
        .collect();
    if values.is_empty() {
        return None;
    }

    let measurements: Vec<Measurement> = measurements
        .iter()
        .filter(|m| m.value.is_finite())
        .copied()
        .collect();

    let all = |c: Censoring| measurements.iter().all(|m| m.censoring == c);

    if all(Censoring::Left) {
        return values.iter().copied().reduce(f64::min);
    }
    if all(Censoring::Right) {
        return values.iter().copied().reduce(f64::max);
    }
    if all(Censoring::Exact) {
        return Some(values.iter().sum::<f64>() / values.len() as f64);
    }

    let sigma = sigma.filter(|s| s.is_finite() && *s > 0.0)?;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lo = min - BRACKET_SIGMAS * sigma;
    let hi = max + BRACKET_SIGMAS * sigma;

    let nll = |mu: f64| negative_log_likelihood(&measurements, mu, sigma);
    let tol = (sigma * 1e-6).max(1e-10);

    minimize_scalar(nll, lo, hi, tol, MAX_ITERATIONS)
}

/// Negative log-likelihood of the group at mean `mu`.
fn negative_log_likelihood(measurements: &[Measurement], mu: f64, sigma: f64) -> f64 {
    -measurements
        .iter()
        .map(|m| match m.censoring {
            Censoring::Exact => log_pdf(m.value, mu, sigma),
            Censoring::Left => log_cdf(m.value, mu, sigma),
            Censoring::Right => log_sf(m.value, mu, sigma),
        })
        .sum::<f64>()
}
