//! Discrete approximations of income shock distributions
//!
//! Permanent and transitory shocks are discretized independently, the
//! transitory one optionally augmented with an unemployment point mass, then
//! combined into a joint distribution over (ψ, θ) pairs.

mod lognormal;

pub use lognormal::{approx_lognormal, approx_mean_one_lognormal};

use crate::error::ShockError;

const PROB_TOLERANCE: f64 = 1e-10;

/// Finite distribution over scalar outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteDistribution {
    probs: Vec<f64>,
    values: Vec<f64>,
}

impl DiscreteDistribution {
    /// Degenerate distribution at `value`
    pub fn point_mass(value: f64) -> Self {
        Self {
            probs: vec![1.0],
            values: vec![value],
        }
    }

    /// Equal weight on every value
    pub fn equiprobable(values: Vec<f64>) -> Self {
        let p = 1.0 / values.len() as f64;
        Self {
            probs: vec![p; values.len()],
            values,
        }
    }

    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.probs.iter().zip(&self.values).map(|(p, x)| p * x).sum()
    }

    /// Prepend outcome `x` with probability `p`, rescaling the other outcomes
    /// so the mean is unchanged
    ///
    /// Used for the unemployment state: income `x` with probability `p`.
    pub fn with_point_mass_constant_mean(&self, p: f64, x: f64) -> Result<Self, ShockError> {
        if !(0.0..1.0).contains(&p) {
            return Err(ShockError::InvalidUnempPrb(p));
        }
        if !(x.is_finite() && x >= 0.0) {
            return Err(ShockError::InvalidUnempIncome(x));
        }
        if p == 0.0 {
            return Ok(self.clone());
        }

        let mean = self.mean();
        if p * x >= mean {
            return Err(ShockError::UnempMassExceedsMean {
                prob: p,
                income: x,
                mean,
            });
        }
        let scale = (mean - p * x) / ((1.0 - p) * mean);

        let mut probs = Vec::with_capacity(self.len() + 1);
        let mut values = Vec::with_capacity(self.len() + 1);
        probs.push(p);
        values.push(x);
        probs.extend(self.probs.iter().map(|q| q * (1.0 - p)));
        values.extend(self.values.iter().map(|v| v * scale));

        Ok(Self { probs, values })
    }
}

/// Joint distribution of (permanent, transitory) income shocks for one period
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeDistribution {
    probs: Vec<f64>,
    perm: Vec<f64>,
    tran: Vec<f64>,
}

impl IncomeDistribution {
    /// Outer product of independent marginals
    pub fn combine_independent(perm: &DiscreteDistribution, tran: &DiscreteDistribution) -> Self {
        let n = perm.len() * tran.len();
        let mut probs = Vec::with_capacity(n);
        let mut perm_vals = Vec::with_capacity(n);
        let mut tran_vals = Vec::with_capacity(n);

        for (&pp, &psi) in perm.probs().iter().zip(perm.values()) {
            for (&pt, &theta) in tran.probs().iter().zip(tran.values()) {
                probs.push(pp * pt);
                perm_vals.push(psi);
                tran_vals.push(theta);
            }
        }

        Self {
            probs,
            perm: perm_vals,
            tran: tran_vals,
        }
    }

    /// Caller-supplied joint distribution, for shocks that are not independent
    pub fn from_triples(
        probs: Vec<f64>,
        perm: Vec<f64>,
        tran: Vec<f64>,
    ) -> Result<Self, ShockError> {
        if probs.len() != perm.len() || probs.len() != tran.len() || probs.is_empty() {
            return Err(ShockError::LengthMismatch {
                probs: probs.len(),
                perm: perm.len(),
                tran: tran.len(),
            });
        }
        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > PROB_TOLERANCE || probs.iter().any(|p| !(*p >= 0.0)) {
            return Err(ShockError::ProbabilitiesDoNotSumToOne(total));
        }
        let bad_perm = perm.iter().position(|v| !(v.is_finite() && *v > 0.0));
        if let Some(index) = bad_perm {
            return Err(ShockError::InvalidShockValue { index, value: perm[index] });
        }
        let bad_tran = tran.iter().position(|v| !(v.is_finite() && *v >= 0.0));
        if let Some(index) = bad_tran {
            return Err(ShockError::InvalidShockValue { index, value: tran[index] });
        }
        Ok(Self { probs, perm, tran })
    }

    /// Mean-one lognormal permanent shocks and mean-one lognormal transitory
    /// shocks with an unemployment point mass, combined independently
    pub fn lognormal_with_unemployment(
        perm_count: usize,
        perm_std: f64,
        tran_count: usize,
        tran_std: f64,
        unemp_prb: f64,
        inc_unemp: f64,
    ) -> Result<Self, ShockError> {
        let perm = approx_mean_one_lognormal(perm_count, perm_std)?;
        let tran = approx_mean_one_lognormal(tran_count, tran_std)?
            .with_point_mass_constant_mean(unemp_prb, inc_unemp)?;
        Ok(Self::combine_independent(&perm, &tran))
    }

    /// No risk at all: ψ = θ = 1 with certainty
    pub fn degenerate() -> Self {
        Self {
            probs: vec![1.0],
            perm: vec![1.0],
            tran: vec![1.0],
        }
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    pub fn perm(&self) -> &[f64] {
        &self.perm
    }

    pub fn tran(&self) -> &[f64] {
        &self.tran
    }

    /// Iterate over (probability, ψ, θ)
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.probs
            .iter()
            .zip(&self.perm)
            .zip(&self.tran)
            .map(|((&w, &psi), &theta)| (w, psi, theta))
    }

    pub fn expected_perm(&self) -> f64 {
        self.iter().map(|(w, psi, _)| w * psi).sum()
    }

    pub fn expected_tran(&self) -> f64 {
        self.iter().map(|(w, _, theta)| w * theta).sum()
    }

    /// E[ψθ], next period's expected normalized income
    pub fn expected_income(&self) -> f64 {
        self.iter().map(|(w, psi, theta)| w * psi * theta).sum()
    }

    pub fn perm_min(&self) -> f64 {
        self.perm.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn tran_min(&self) -> f64 {
        self.tran.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Probability of the lowest-income event (minimal ψθ)
    pub fn worst_income_prob(&self) -> f64 {
        let worst = self
            .iter()
            .map(|(_, psi, theta)| psi * theta)
            .fold(f64::INFINITY, f64::min);
        self.iter()
            .filter(|(_, psi, theta)| (psi * theta - worst).abs() <= 1e-12 * worst.abs().max(1.0))
            .map(|(w, _, _)| w)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unemployment_point_mass_preserves_mean() {
        let tran = approx_mean_one_lognormal(7, 0.1)
            .unwrap()
            .with_point_mass_constant_mean(0.05, 0.3)
            .unwrap();
        assert_eq!(tran.len(), 8);
        assert_eq!(tran.values()[0], 0.3);
        assert_relative_eq!(tran.probs()[0], 0.05);
        assert_relative_eq!(tran.probs().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(tran.mean(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_notebook_income_distribution() {
        let dist =
            IncomeDistribution::lognormal_with_unemployment(7, 0.1, 7, 0.1, 0.05, 0.3).unwrap();
        assert_eq!(dist.len(), 7 * 8);
        assert_relative_eq!(dist.probs().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(dist.expected_perm(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(dist.expected_tran(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(dist.expected_income(), 1.0, epsilon = 1e-10);
        assert_eq!(dist.tran_min(), 0.3);
        // Unemployment coincides with the lowest permanent draw in 0.05 / 7 of cases
        assert_relative_eq!(dist.worst_income_prob(), 0.05 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_combined_probabilities_are_products() {
        let perm = DiscreteDistribution::equiprobable(vec![0.9, 1.1]);
        let tran = DiscreteDistribution::point_mass(1.0)
            .with_point_mass_constant_mean(0.25, 0.0)
            .unwrap();
        let joint = IncomeDistribution::combine_independent(&perm, &tran);
        assert_eq!(joint.len(), 4);
        assert_relative_eq!(joint.probs()[0], 0.5 * 0.25);
        assert_relative_eq!(joint.probs()[1], 0.5 * 0.75);
        assert_relative_eq!(joint.tran()[1], 1.0 / 0.75);
    }

    #[test]
    fn test_from_triples_validates() {
        let ok = IncomeDistribution::from_triples(vec![0.5, 0.5], vec![1.0, 1.0], vec![0.5, 1.5]);
        assert!(ok.is_ok());
        assert!(matches!(
            IncomeDistribution::from_triples(vec![0.5, 0.6], vec![1.0, 1.0], vec![1.0, 1.0]),
            Err(ShockError::ProbabilitiesDoNotSumToOne(_))
        ));
        assert!(matches!(
            IncomeDistribution::from_triples(vec![1.0], vec![1.0, 1.0], vec![1.0]),
            Err(ShockError::LengthMismatch { .. })
        ));
        assert!(matches!(
            IncomeDistribution::from_triples(vec![1.0], vec![0.0], vec![1.0]),
            Err(ShockError::InvalidShockValue { index: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_unemployment_probability() {
        let dist = DiscreteDistribution::point_mass(1.0);
        assert_eq!(
            dist.with_point_mass_constant_mean(1.0, 0.3),
            Err(ShockError::InvalidUnempPrb(1.0))
        );
    }

    #[test]
    fn test_unemployment_mass_must_stay_below_mean() {
        let tran = approx_mean_one_lognormal(7, 0.1).unwrap();
        assert!(matches!(
            tran.with_point_mass_constant_mean(0.05, 25.0),
            Err(ShockError::UnempMassExceedsMean { .. })
        ));
        assert!(matches!(
            IncomeDistribution::lognormal_with_unemployment(7, 0.1, 7, 0.1, 0.05, 25.0),
            Err(ShockError::UnempMassExceedsMean { .. })
        ));

        let tran = tran.with_point_mass_constant_mean(0.05, 15.0).unwrap();
        assert!(tran.values().iter().all(|&v| v > 0.0));
    }
}
