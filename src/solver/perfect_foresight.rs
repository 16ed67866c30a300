//! Perfect foresight consumer without a borrowing constraint
//!
//! Consumption is linear in total wealth: c(m) = κ (m + h), with the MPC κ
//! and normalized human wealth h rolled back one period at a time:
//!
//! ```text
//! κ_t = 1 / (1 + Þ_R / κ_{t+1}),   Þ_R = (R β ℵ)^(1/ρ) / R
//! h_t = (Γ / R) (h_{t+1} + 1)
//! ```

use super::conditions::CycleConditions;
use super::solution::{PeriodSolution, ValueFunction};
use super::PeriodSolver;
use crate::error::{SolveError, SolveResult};
use crate::interpolation::LinearInterp;
use crate::params::ParameterSet;
use crate::utility::Crra;

pub struct PerfForesightSolver<'a> {
    params: &'a ParameterSet,
}

impl<'a> PerfForesightSolver<'a> {
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }
}

impl PeriodSolver for PerfForesightSolver<'_> {
    fn cycle_len(&self) -> usize {
        self.params.t_cycle
    }

    fn check_horizon(&self, cycles: usize) -> SolveResult<()> {
        if cycles == 0 {
            CycleConditions::compute(self.params, None).require_perfect_foresight_solution()?;
        }
        Ok(())
    }

    fn solve_period(&self, t: usize, next: &PeriodSolution) -> SolveResult<PeriodSolution> {
        let p = self.params;
        let utility = Crra::new(p.crra);
        let disc_eff = p.disc_fac * p.liv_prb[t];
        let gro = p.perm_gro_fac[t];

        let return_patience = (p.rfree * disc_eff).powf(1.0 / p.crra) / p.rfree;
        let mpc = 1.0 / (1.0 + return_patience / next.mpc_min);
        let h_nrm = gro / p.rfree * (next.h_nrm + 1.0);
        let m_nrm_min = -h_nrm;

        if !(mpc.is_finite() && mpc > 0.0 && h_nrm.is_finite()) {
            return Err(SolveError::Infeasible {
                period: t,
                reason: format!("MPC {} and human wealth {} are not finite", mpc, h_nrm),
            });
        }

        let knots = vec![m_nrm_min, m_nrm_min + 1.0];
        let infeasible = |e: crate::interpolation::InterpError| SolveError::Infeasible {
            period: t,
            reason: e.to_string(),
        };
        let c_func = LinearInterp::new(knots.clone(), vec![0.0, mpc]).map_err(infeasible)?;

        // u⁻¹(v) is linear too, with slope κ^(-ρ/(1-ρ))
        let v_func = if p.vfunc_bool {
            let slope = mpc.powf(-p.crra / (1.0 - p.crra));
            let inverted = LinearInterp::new(knots, vec![0.0, slope]).map_err(infeasible)?;
            Some(ValueFunction::new(inverted, utility))
        } else {
            None
        };

        Ok(PeriodSolution::new(c_func, v_func, utility, m_nrm_min, h_nrm, mpc, mpc))
    }
}
