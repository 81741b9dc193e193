//! Normal distribution functions for the likelihood model.

use std::f64::consts::PI;

/// Error function approximation (Abramowitz & Stegun 7.1.26, max error ~1.5e-7)
pub fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}

/// Standard normal CDF: Φ(z) = 0.5 * (1 + erf(z / sqrt(2)))
pub fn norm_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Log density of `Normal(mean, sd)` at `x`.
pub fn log_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    -0.5 * (2.0 * PI).ln() - sd.ln() - 0.5 * z * z
}

/// Log CDF of `Normal(mean, sd)` at `x`, floored away from -inf so a far
/// tail contributes a large finite penalty instead of poisoning the sum.
pub fn log_cdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    norm_cdf(z).max(f64::MIN_POSITIVE).ln()
}

/// Log survival function `log(1 - Φ)` of `Normal(mean, sd)` at `x`.
pub fn log_sf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    // 1 - Φ(z) = Φ(-z); evaluating the mirrored CDF keeps precision in
    // the upper tail.
    norm_cdf(-z).max(f64::MIN_POSITIVE).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_at_zero() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cdf_symmetry() {
        for z in [0.3, 1.0, 2.5] {
            assert!((norm_cdf(z) + norm_cdf(-z) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cdf_known_value() {
        // Φ(1.96) ≈ 0.9750
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-3);
    }

    #[test]
    fn test_log_pdf_peaks_at_mean() {
        let at_mean = log_pdf(5.0, 5.0, 1.0);
        assert!(at_mean > log_pdf(4.0, 5.0, 1.0));
        assert!(at_mean > log_pdf(6.0, 5.0, 1.0));
        // log(1/sqrt(2π)) at the standard normal mode.
        assert!((at_mean - (-0.9189385332046727)).abs() < 1e-9);
    }

    #[test]
    fn test_log_tails_are_finite() {
        assert!(log_cdf(-60.0, 0.0, 1.0).is_finite());
        assert!(log_sf(60.0, 0.0, 1.0).is_finite());
    }

    #[test]
    fn test_log_cdf_monotone() {
        let a = log_cdf(-1.0, 0.0, 1.0);
        let b = log_cdf(0.0, 0.0, 1.0);
        let c = log_cdf(1.0, 0.0, 1.0);
        assert!(a < b && b < c);
    }
}
