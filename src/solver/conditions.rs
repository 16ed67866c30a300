//! Impatience and human-wealth conditions over one cycle
//!
//! Factors are products across the periods of a cycle, so a multi-period
//! cycle is judged the way a single period with compounded rates would be:
//!
//! - absolute patience factor `Þ = Π (R β ℵ_t)^(1/ρ)`
//! - return patience factor `Þ / R^T`
//! - growth patience factor `Þ / Π Γ_t`
//! - human wealth factor `Π Γ_t / R^T`
//! - autarky value factor `Π β ℵ_t Γ_t^(1-ρ) E_t[ψ^(1-ρ)]`
//!
//! The infinite-horizon perfect foresight model has no solution unless the
//! return patience and human wealth factors are both below one. The shock
//! model needs weak return impatience and a finite value of autarky; with
//! unbounded human wealth it is still solvable but reports `h = ∞`.

use crate::distribution::IncomeDistribution;
use crate::error::{SolveError, SolveResult};
use crate::params::ParameterSet;

/// Patience and wealth factors for one cycle of periods
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleConditions {
    pub absolute_patience: f64,
    pub return_patience: f64,
    pub growth_patience: f64,

    /// Growth patience adjusted by `E[1/ψ]`; equals `growth_patience` without shocks
    pub growth_patience_shocked: f64,

    /// Return patience scaled by the worst-income probability to the power 1/ρ
    pub weak_return_patience: f64,

    pub human_wealth_factor: f64,

    /// Below one when lifetime utility of consuming only income is finite
    pub autarky_value_factor: f64,
}

impl CycleConditions {
    /// Compute the factors; `income` supplies per-period shock distributions
    pub fn compute(params: &ParameterSet, income: Option<&[IncomeDistribution]>) -> Self {
        let inv_rho = 1.0 / params.crra;
        let periods = params.t_cycle as i32;
        let r_total = params.rfree.powi(periods);

        let absolute_patience: f64 = params
            .liv_prb
            .iter()
            .map(|&liv| (params.rfree * params.disc_fac * liv).powf(inv_rho))
            .product();
        let growth_total: f64 = params.perm_gro_fac.iter().product();

        let (inv_perm_mean, worst_prob) = match income {
            Some(dists) => dists.iter().fold((1.0, 1.0), |(inv, worst), dist| {
                let e_inv: f64 = dist.iter().map(|(w, psi, _)| w / psi).sum();
                (inv * e_inv, worst * dist.worst_income_prob())
            }),
            None => (1.0, 1.0),
        };

        let one_minus_rho = 1.0 - params.crra;
        let autarky_value_factor: f64 = (0..params.t_cycle)
            .map(|t| {
                let perm_moment: f64 = income
                    .and_then(|dists| dists.get(t))
                    .map(|dist| {
                        dist.iter().map(|(w, psi, _)| w * psi.powf(one_minus_rho)).sum::<f64>()
                    })
                    .unwrap_or(1.0);
                let liv = params.liv_prb.get(t).copied().unwrap_or(1.0);
                let gro = params.perm_gro_fac.get(t).copied().unwrap_or(1.0);
                params.disc_fac * liv * gro.powf(one_minus_rho) * perm_moment
            })
            .product();

        let return_patience = absolute_patience / r_total;
        let growth_patience = absolute_patience / growth_total;
        Self {
            absolute_patience,
            return_patience,
            growth_patience,
            growth_patience_shocked: growth_patience * inv_perm_mean,
            weak_return_patience: return_patience * worst_prob.powf(inv_rho),
            human_wealth_factor: growth_total / r_total,
            autarky_value_factor,
        }
    }

    pub fn return_impatient(&self) -> bool {
        self.return_patience < 1.0
    }

    pub fn finite_human_wealth(&self) -> bool {
        self.human_wealth_factor < 1.0
    }

    pub fn growth_impatient(&self) -> bool {
        self.growth_patience < 1.0
    }

    /// Fail unless an infinite-horizon perfect foresight solution exists
    pub fn require_perfect_foresight_solution(&self) -> SolveResult<()> {
        if !self.return_impatient() {
            return Err(SolveError::Infeasible {
                period: 0,
                reason: format!(
                    "return impatience condition fails (return patience factor {:.6} >= 1); \
                     the MPC converges to zero",
                    self.return_patience
                ),
            });
        }
        if !self.finite_human_wealth() {
            return Err(SolveError::Infeasible {
                period: 0,
                reason: format!(
                    "finite human wealth condition fails (PermGroFac / Rfree = {:.6} >= 1)",
                    self.human_wealth_factor
                ),
            });
        }
        Ok(())
    }

    pub fn finite_autarky_value(&self) -> bool {
        self.autarky_value_factor < 1.0
    }

    /// Fail unless an infinite-horizon shock model solution exists
    ///
    /// Unbounded human wealth is allowed here: the artificial or natural
    /// borrowing limit keeps consumption finite.
    pub fn require_shock_model_solution(&self) -> SolveResult<()> {
        if self.weak_return_patience >= 1.0 {
            return Err(SolveError::Infeasible {
                period: 0,
                reason: format!(
                    "weak return impatience condition fails (factor {:.6} >= 1)",
                    self.weak_return_patience
                ),
            });
        }
        if !self.finite_autarky_value() {
            return Err(SolveError::Infeasible {
                period: 0,
                reason: format!(
                    "finite value of autarky condition fails (factor {:.6} >= 1); \
                     consumption collapses to zero",
                    self.autarky_value_factor
                ),
            });
        }
        Ok(())
    }

    /// Report the conditions relevant to the shock model
    pub fn log_shock_model(&self) {
        log::debug!(
            "patience factors: absolute {:.6}, return {:.6}, growth {:.6}, \
             human wealth {:.6}, autarky value {:.6}",
            self.absolute_patience,
            self.return_patience,
            self.growth_patience,
            self.human_wealth_factor,
            self.autarky_value_factor
        );
        if self.growth_patience_shocked >= 1.0 {
            log::warn!(
                "growth impatience condition fails (factor {:.6}); \
                 target wealth ratio does not exist",
                self.growth_patience_shocked
            );
        }
        if !self.finite_human_wealth() {
            log::warn!(
                "finite human wealth condition fails (factor {:.6}); human wealth is unbounded",
                self.human_wealth_factor
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn notebook_shocks() -> IncomeDistribution {
        IncomeDistribution::lognormal_with_unemployment(7, 0.1, 7, 0.1, 0.05, 0.3).unwrap()
    }

    #[test]
    fn test_notebook_perfect_foresight_is_solvable() {
        let params = ParameterSet::perfect_foresight_example();
        let conditions = CycleConditions::compute(&params, None);
        assert_relative_eq!(
            conditions.absolute_patience,
            (1.03_f64 * 0.96 * 0.98).powf(0.4),
            epsilon = 1e-12
        );
        assert_relative_eq!(conditions.human_wealth_factor, 1.01 / 1.03, epsilon = 1e-12);
        assert!(conditions.require_perfect_foresight_solution().is_ok());
    }

    #[test]
    fn test_growth_above_interest_is_infeasible() {
        let mut params = ParameterSet::perfect_foresight_example();
        params.perm_gro_fac = vec![1.05];
        let err = CycleConditions::compute(&params, None)
            .require_perfect_foresight_solution()
            .unwrap_err();
        assert!(matches!(err, SolveError::Infeasible { period: 0, .. }));
    }

    #[test]
    fn test_patient_consumer_is_infeasible() {
        let mut params = ParameterSet::perfect_foresight_example();
        params.disc_fac = 1.1;
        params.liv_prb = vec![1.0];
        let conditions = CycleConditions::compute(&params, None);
        assert!(!conditions.return_impatient());
        assert!(conditions.require_perfect_foresight_solution().is_err());
    }

    #[test]
    fn test_cycle_factors_compound() {
        let mut params = ParameterSet::perfect_foresight_example();
        params.t_cycle = 2;
        params.liv_prb = vec![0.98, 0.98];
        params.perm_gro_fac = vec![1.01, 1.02];
        let conditions = CycleConditions::compute(&params, None);
        assert_relative_eq!(
            conditions.human_wealth_factor,
            1.01 * 1.02 / (1.03_f64 * 1.03),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_shocks_raise_growth_patience() {
        let params = ParameterSet::ind_shock_example();
        let dist = notebook_shocks();
        let conditions = CycleConditions::compute(&params, Some(std::slice::from_ref(&dist)));
        assert!(conditions.growth_patience_shocked > conditions.growth_patience);
        assert!(conditions.weak_return_patience < conditions.return_patience);
    }

    #[test]
    fn test_notebook_shock_model_has_finite_autarky_value() {
        let params = ParameterSet::ind_shock_example();
        let dist = notebook_shocks();
        let conditions = CycleConditions::compute(&params, Some(std::slice::from_ref(&dist)));
        let perm_moment: f64 = dist.iter().map(|(w, psi, _)| w * psi.powf(-1.5)).sum();
        assert_relative_eq!(
            conditions.autarky_value_factor,
            0.96 * 0.98 * 1.01_f64.powf(-1.5) * perm_moment,
            epsilon = 1e-12
        );
        assert!(conditions.require_shock_model_solution().is_ok());
    }

    #[test]
    fn test_patient_shocked_consumer_has_no_solution() {
        let mut params = ParameterSet::ind_shock_example();
        params.disc_fac = 1.1;
        params.liv_prb = vec![1.0];
        let dist = notebook_shocks();
        let conditions = CycleConditions::compute(&params, Some(std::slice::from_ref(&dist)));
        // Weak return impatience still holds; only autarky value diverges
        assert!(conditions.weak_return_patience < 1.0);
        assert!(!conditions.finite_autarky_value());
        let err = conditions.require_shock_model_solution().unwrap_err();
        assert!(matches!(err, SolveError::Infeasible { period: 0, .. }));
    }

    #[test]
    fn test_fast_growth_leaves_shock_model_solvable() {
        let mut params = ParameterSet::ind_shock_example();
        params.perm_gro_fac = vec![1.05];
        let dist = notebook_shocks();
        let conditions = CycleConditions::compute(&params, Some(std::slice::from_ref(&dist)));
        assert!(!conditions.finite_human_wealth());
        assert!(conditions.require_shock_model_solution().is_ok());
    }
}
