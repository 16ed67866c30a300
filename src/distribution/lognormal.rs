//! Equiprobable discretization of lognormal shocks
//!
//! The support is cut into N bins of equal probability using the inverse
//! normal CDF. Each point is the conditional mean of the lognormal inside its
//! bin, so the discrete mean matches the continuous mean exactly.

use statrs::function::erf::{erf, erf_inv};
use std::f64::consts::SQRT_2;

use super::DiscreteDistribution;
use crate::error::ShockError;

/// Standard normal CDF with exact tails at ±infinity
fn std_normal_cdf(z: f64) -> f64 {
    if z == f64::NEG_INFINITY {
        0.0
    } else if z == f64::INFINITY {
        1.0
    } else {
        0.5 * (1.0 + erf(z / SQRT_2))
    }
}

/// Standard normal quantile for p in (0, 1)
fn std_normal_quantile(p: f64) -> f64 {
    SQRT_2 * erf_inv(2.0 * p - 1.0)
}

/// N-point equiprobable approximation of lognormal(mu, sigma)
///
/// `sigma = 0` collapses to a single point mass at `exp(mu)`.
pub fn approx_lognormal(n: usize, mu: f64, sigma: f64) -> Result<DiscreteDistribution, ShockError> {
    if n < 1 {
        return Err(ShockError::InvalidCount(n));
    }
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(ShockError::InvalidStd(sigma));
    }

    if sigma == 0.0 {
        return Ok(DiscreteDistribution::point_mass(mu.exp()));
    }

    // Cut points in standard-normal space: -inf, z_1, ..., z_{n-1}, +inf
    let cuts: Vec<f64> = (0..=n)
        .map(|i| match i {
            0 => f64::NEG_INFINITY,
            i if i == n => f64::INFINITY,
            i => std_normal_quantile(i as f64 / n as f64),
        })
        .collect();

    let mean = (mu + 0.5 * sigma * sigma).exp();
    let values: Vec<f64> = cuts
        .windows(2)
        .map(|w| n as f64 * mean * (std_normal_cdf(w[1] - sigma) - std_normal_cdf(w[0] - sigma)))
        .collect();

    Ok(DiscreteDistribution::equiprobable(values))
}

/// N-point approximation of a mean-one lognormal with underlying std `sigma`
pub fn approx_mean_one_lognormal(n: usize, sigma: f64) -> Result<DiscreteDistribution, ShockError> {
    approx_lognormal(n, -0.5 * sigma * sigma, sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_one_and_probabilities_sum_to_one() {
        for (n, sigma) in [(1, 0.1), (3, 0.1), (7, 0.1), (7, 0.2), (15, 0.5)] {
            let dist = approx_mean_one_lognormal(n, sigma).unwrap();
            assert_eq!(dist.len(), n);
            assert_relative_eq!(dist.probs().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(dist.mean(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_points_are_increasing_and_positive() {
        let dist = approx_mean_one_lognormal(7, 0.1).unwrap();
        assert!(dist.values()[0] > 0.0);
        for w in dist.values().windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn test_variance_approaches_continuous_variance() {
        let sigma: f64 = 0.2;
        let dist = approx_mean_one_lognormal(200, sigma).unwrap();
        let var: f64 = dist
            .probs()
            .iter()
            .zip(dist.values())
            .map(|(p, x)| p * (x - 1.0).powi(2))
            .sum();
        let exact = (sigma * sigma).exp() - 1.0;
        assert_relative_eq!(var, exact, max_relative = 0.02);
    }

    #[test]
    fn test_zero_std_is_point_mass_at_one() {
        let dist = approx_mean_one_lognormal(7, 0.0).unwrap();
        assert_eq!(dist.len(), 1);
        assert_eq!(dist.values()[0], 1.0);
        assert_eq!(dist.probs()[0], 1.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(approx_mean_one_lognormal(0, 0.1), Err(ShockError::InvalidCount(0)));
        assert!(matches!(
            approx_mean_one_lognormal(5, -0.1),
            Err(ShockError::InvalidStd(_))
        ));
    }
}
