//! Consumer with permanent and transitory income shocks, solved by the
//! endogenous grid method
//!
//! For each end-of-period asset level `a` on the grid:
//!
//! 1. next period's resources under shock (ψ, θ): `m' = R a / (Γ ψ) + θ`
//! 2. expected marginal value `βℵ R Γ^-ρ E[ψ^-ρ u'(c'(m'))]`
//! 3. invert the Euler equation for `c`, and set `m = a + c`
//!
//! The pairs (m, c), together with the constraint point (m_min, 0), are the
//! knots of the consumption function. Above the grid the function bends
//! toward the perfect foresight limit `κ_min (m + h)`. When growth outpaces
//! the interest rate over an infinite horizon, human wealth is unbounded:
//! `h` is reported as infinite and the last segment is extended linearly.

use super::conditions::CycleConditions;
use super::solution::{PeriodSolution, ValueFunction};
use super::PeriodSolver;
use crate::distribution::IncomeDistribution;
use crate::error::{ConfigError, SolveError, SolveResult};
use crate::grid::AssetGrid;
use crate::interpolation::{InterpError, LinearInterp};
use crate::params::ParameterSet;
use crate::utility::Crra;

pub struct IndShockSolver<'a> {
    params: &'a ParameterSet,
    income: &'a [IncomeDistribution],
    grid: &'a AssetGrid,
    unbounded_human_wealth: bool,
}

/// Lower bound on resources and the limiting MPCs for one period
#[derive(Debug, Clone, Copy)]
struct PeriodBounds {
    m_nrm_min: f64,
    h_nrm: f64,
    mpc_min: f64,
    mpc_max: f64,
    artificial_binds: bool,
    natural_limit: f64,
}

impl<'a> IndShockSolver<'a> {
    /// `income` needs one distribution per period of the cycle
    pub fn new(
        params: &'a ParameterSet,
        income: &'a [IncomeDistribution],
        grid: &'a AssetGrid,
    ) -> Self {
        let unbounded_human_wealth = params.is_infinite_horizon()
            && !CycleConditions::compute(params, Some(income)).finite_human_wealth();
        Self {
            params,
            income,
            grid,
            unbounded_human_wealth,
        }
    }

    fn bounds(&self, t: usize, next: &PeriodSolution) -> PeriodBounds {
        let p = self.params;
        let income = &self.income[t];
        let gro = p.perm_gro_fac[t];
        let disc_eff = p.disc_fac * p.liv_prb[t];
        let return_patience = (p.rfree * disc_eff).powf(1.0 / p.crra) / p.rfree;

        let h_nrm = if self.unbounded_human_wealth {
            f64::INFINITY
        } else {
            gro / p.rfree * (income.expected_income() + next.h_nrm)
        };
        let mpc_min = 1.0 / (1.0 + return_patience / next.mpc_min);

        // Most debt that can be repaid for sure, even under the worst shocks
        let natural_limit =
            (next.m_nrm_min - income.tran_min()) * gro * income.perm_min() / p.rfree;
        let (m_nrm_min, artificial_binds) = match p.boro_cnst_art {
            Some(art) if art > natural_limit => (art, true),
            _ => (natural_limit, false),
        };

        let mpc_max = if artificial_binds {
            1.0
        } else {
            let worst = income.worst_income_prob().powf(1.0 / p.crra);
            1.0 / (1.0 + worst * return_patience / next.mpc_max)
        };

        PeriodBounds {
            m_nrm_min,
            h_nrm,
            mpc_min,
            mpc_max,
            artificial_binds,
            natural_limit,
        }
    }

    /// End-of-period asset levels; the constrained point leads when the
    /// artificial constraint binds
    fn asset_grid(&self, bounds: &PeriodBounds) -> Vec<f64> {
        let base = if bounds.artificial_binds {
            bounds.m_nrm_min
        } else {
            bounds.natural_limit
        };
        let mut assets = Vec::with_capacity(self.grid.len() + 1);
        if bounds.artificial_binds {
            assets.push(base);
        }
        assets.extend(self.grid.points().iter().map(|x| base + x));
        assets
    }
}

impl PeriodSolver for IndShockSolver<'_> {
    fn cycle_len(&self) -> usize {
        self.params.t_cycle
    }

    fn check_horizon(&self, cycles: usize) -> SolveResult<()> {
        if self.income.len() != self.params.t_cycle {
            return Err(ConfigError::IncomeProcessOutOfDate {
                built: self.income.len(),
                t_cycle: self.params.t_cycle,
            }
            .into());
        }
        if cycles == 0 {
            let conditions = CycleConditions::compute(self.params, Some(self.income));
            conditions.log_shock_model();
            conditions.require_shock_model_solution()?;
        }
        Ok(())
    }

    fn solve_period(&self, t: usize, next: &PeriodSolution) -> SolveResult<PeriodSolution> {
        let p = self.params;
        let utility = Crra::new(p.crra);
        let income = &self.income[t];
        let gro = p.perm_gro_fac[t];
        let disc_eff = p.disc_fac * p.liv_prb[t];

        if p.vfunc_bool && next.v_func().is_none() {
            return Err(ConfigError::Unsupported {
                name: "vFuncBool".into(),
                reason: "the next-period solution carries no value function",
            }
            .into());
        }

        let bounds = self.bounds(t, next);
        let assets = self.asset_grid(&bounds);
        let infeasible = |reason: String| SolveError::Infeasible { period: t, reason };

        let mut m_knots = Vec::with_capacity(assets.len() + 1);
        let mut c_knots = Vec::with_capacity(assets.len() + 1);
        let mut v_knots = Vec::with_capacity(if p.vfunc_bool { assets.len() + 1 } else { 0 });
        m_knots.push(bounds.m_nrm_min);
        c_knots.push(0.0);
        if p.vfunc_bool {
            v_knots.push(0.0);
        }

        for &a in &assets {
            let mut marginal_sum = 0.0;
            let mut value_sum = 0.0;
            for (w, psi, theta) in income.iter() {
                let growth = gro * psi;
                let m_next = p.rfree / growth * a + theta;
                marginal_sum += w * growth.powf(-p.crra) * next.marginal_value(m_next);
                if let Some(v) = next.value(m_next) {
                    value_sum += w * growth.powf(1.0 - p.crra) * v;
                }
            }

            let c = utility.inverse_marginal(disc_eff * p.rfree * marginal_sum);
            if !(c.is_finite() && c > 0.0) {
                return Err(infeasible(format!(
                    "consumption {} at end-of-period assets {:.6}",
                    c, a
                )));
            }
            m_knots.push(a + c);
            c_knots.push(c);

            if p.vfunc_bool {
                let v = utility.u(c) + disc_eff * value_sum;
                let v_inv = utility.inverse(v);
                if !v_inv.is_finite() {
                    return Err(infeasible(format!("value {} at end-of-period assets {:.6}", v, a)));
                }
                v_knots.push(v_inv);
            }
        }

        let knot_error = |e: InterpError| infeasible(format!("consumption function: {}", e));
        let bounded = bounds.h_nrm.is_finite();
        let c_func = if bounded {
            LinearInterp::with_limit(
                m_knots.clone(),
                c_knots,
                bounds.mpc_min * bounds.h_nrm,
                bounds.mpc_min,
            )
        } else {
            LinearInterp::new(m_knots.clone(), c_knots)
        }
        .map_err(knot_error)?;

        let v_func = if p.vfunc_bool {
            let slope = bounds.mpc_min.powf(-p.crra / (1.0 - p.crra));
            let inverted = if bounded {
                LinearInterp::with_limit(m_knots, v_knots, slope * bounds.h_nrm, slope)
            } else {
                LinearInterp::new(m_knots, v_knots)
            }
            .map_err(knot_error)?;
            Some(ValueFunction::new(inverted, utility))
        } else {
            None
        };

        log::trace!(
            "period {}: m_min {:.6}, h {:.6}, mpc in [{:.6}, {:.6}]",
            t,
            bounds.m_nrm_min,
            bounds.h_nrm,
            bounds.mpc_min,
            bounds.mpc_max
        );

        Ok(PeriodSolution::new(
            c_func,
            v_func,
            utility,
            bounds.m_nrm_min,
            bounds.h_nrm,
            bounds.mpc_min,
            bounds.mpc_max,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn notebook_inputs() -> (ParameterSet, Vec<IncomeDistribution>, AssetGrid) {
        let params = ParameterSet::ind_shock_example();
        let shocks = IncomeDistribution::lognormal_with_unemployment(7, 0.1, 7, 0.1, 0.05, 0.3);
        let income = vec![shocks.unwrap()];
        let grid = AssetGrid::build(0.001, 50.0, 48, 3, &[]).unwrap();
        (params, income, grid)
    }

    #[test]
    fn test_artificial_constraint_binds_at_zero() {
        let (params, income, grid) = notebook_inputs();
        let solver = IndShockSolver::new(&params, &income, &grid);
        let sol = solver
            .solve_period(0, &PeriodSolution::terminal(params.crra, false))
            .unwrap();

        assert_eq!(sol.m_nrm_min, 0.0);
        assert_eq!(sol.mpc_max, 1.0);
        assert_eq!(sol.c_func().x().len(), grid.len() + 2);
        // Constrained region: consume everything up to the kink
        let kink = sol.c_func().x()[1];
        assert_relative_eq!(sol.consumption(0.5 * kink), 0.5 * kink, epsilon = 1e-12);
    }

    #[test]
    fn test_natural_constraint_allows_borrowing() {
        let (mut params, income, grid) = notebook_inputs();
        params.boro_cnst_art = None;
        let solver = IndShockSolver::new(&params, &income, &grid);
        let sol = solver
            .solve_period(0, &PeriodSolution::terminal(params.crra, false))
            .unwrap();

        let theta_min = income[0].tran_min();
        let psi_min = income[0].perm_min();
        assert_relative_eq!(
            sol.m_nrm_min,
            -theta_min * 1.01 * psi_min / 1.03,
            epsilon = 1e-12
        );
        assert!(sol.mpc_max < 1.0);
        assert_eq!(sol.c_func().x().len(), grid.len() + 1);
    }

    #[test]
    fn test_euler_equation_holds_on_grid() {
        let (params, income, grid) = notebook_inputs();
        let solver = IndShockSolver::new(&params, &income, &grid);
        let next = PeriodSolution::terminal(params.crra, false);
        let sol = solver.solve_period(0, &next).unwrap();

        let utility = Crra::new(params.crra);
        let i = 10;
        let m = sol.c_func().x()[i];
        let c = sol.c_func().y()[i];
        let a = m - c;
        let expected: f64 = income[0]
            .iter()
            .map(|(w, psi, theta)| {
                let growth = 1.01 * psi;
                w * growth.powf(-2.5) * utility.marginal(1.03 / growth * a + theta)
            })
            .sum::<f64>()
            * 0.96
            * 0.98
            * 1.03;
        assert_relative_eq!(utility.marginal(c), expected, max_relative = 1e-10);
    }

    #[test]
    fn test_consumption_increasing_and_concave() {
        let (params, income, grid) = notebook_inputs();
        let solver = IndShockSolver::new(&params, &income, &grid);
        let sol = solver
            .solve_period(0, &PeriodSolution::terminal(params.crra, false))
            .unwrap();
        let ms: Vec<f64> = (1..200).map(|i| i as f64 * 0.1).collect();
        let cs = sol.consumption_many(&ms);
        for pair in cs.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!(sol.mpc(0.5) >= sol.mpc(10.0));
    }

    #[test]
    fn test_value_function_requires_next_value() {
        let (mut params, income, grid) = notebook_inputs();
        params.vfunc_bool = true;
        let solver = IndShockSolver::new(&params, &income, &grid);
        let err = solver
            .solve_period(0, &PeriodSolution::terminal(params.crra, false))
            .unwrap_err();
        assert!(matches!(err, SolveError::Config(ConfigError::Unsupported { .. })));

        let sol = solver
            .solve_period(0, &PeriodSolution::terminal(params.crra, true))
            .unwrap();
        assert!(sol.value(1.0).unwrap() < sol.value(2.0).unwrap());
    }

    #[test]
    fn test_income_length_checked_before_solving() {
        let (mut params, income, grid) = notebook_inputs();
        params.t_cycle = 2;
        let solver = IndShockSolver::new(&params, &income, &grid);
        assert!(matches!(
            solver.check_horizon(0),
            Err(SolveError::Config(ConfigError::IncomeProcessOutOfDate { built: 1, t_cycle: 2 }))
        ));
    }

    #[test]
    fn test_infinite_value_of_autarky_rejected_before_solving() {
        let (mut params, income, grid) = notebook_inputs();
        params.disc_fac = 1.1;
        params.liv_prb = vec![1.0];
        let solver = IndShockSolver::new(&params, &income, &grid);
        assert!(matches!(
            solver.check_horizon(0),
            Err(SolveError::Infeasible { period: 0, .. })
        ));
        // A finite horizon is always well defined
        assert!(solver.check_horizon(3).is_ok());
    }

    #[test]
    fn test_next_period_undefined_at_reachable_resources_is_infeasible() {
        let (params, income, grid) = notebook_inputs();
        let solver = IndShockSolver::new(&params, &income, &grid);
        // Claims a lower bound of zero but is only defined from m = 5
        let c_func = LinearInterp::new(vec![5.0, 6.0], vec![1.0, 2.0]).unwrap();
        let next = PeriodSolution::new(c_func, None, Crra::new(params.crra), 0.0, 0.0, 1.0, 1.0);
        match solver.solve_period(0, &next) {
            Err(SolveError::Infeasible { period, reason }) => {
                assert_eq!(period, 0);
                assert!(reason.contains("consumption"));
            }
            other => panic!("expected infeasible period, got {:?}", other),
        }
    }

    #[test]
    fn test_unbounded_human_wealth_extends_last_segment() {
        let (mut params, income, grid) = notebook_inputs();
        params.perm_gro_fac = vec![1.05];
        let solver = IndShockSolver::new(&params, &income, &grid);
        let sol = solver
            .solve_period(0, &PeriodSolution::terminal(params.crra, false))
            .unwrap();
        assert!(sol.h_nrm.is_infinite());

        let x = sol.c_func().x();
        let y = sol.c_func().y();
        let n = x.len();
        let slope = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
        let m = x[n - 1] + 100.0;
        assert_relative_eq!(sol.consumption(m), y[n - 1] + slope * 100.0, max_relative = 1e-12);

        // Finite horizons keep a finite human wealth
        params.cycles = 3;
        let solver = IndShockSolver::new(&params, &income, &grid);
        let sol = solver
            .solve_period(0, &PeriodSolution::terminal(params.crra, false))
            .unwrap();
        assert_relative_eq!(sol.h_nrm, 1.05 / 1.03, epsilon = 1e-9);
    }
}
