//! Backward-induction solvers
//!
//! A [`PeriodSolver`] turns next period's solution into this period's. The
//! horizon driver chains those steps over finite horizons or iterates them to
//! a fixed point when the horizon is infinite.

pub mod conditions;
pub mod horizon;
pub mod ind_shock;
pub mod perfect_foresight;
pub mod solution;
pub mod state;

pub use conditions::CycleConditions;
pub use horizon::solve_horizon;
pub use ind_shock::IndShockSolver;
pub use perfect_foresight::PerfForesightSolver;
pub use solution::{PeriodSolution, ValueFunction};
pub use state::SolveState;

use crate::error::SolveResult;

/// One-period solution step for a model
pub trait PeriodSolver {
    /// Number of periods in one cycle
    fn cycle_len(&self) -> usize;

    /// Solve period `t` of the cycle given the solution of the period after it
    fn solve_period(&self, t: usize, next: &PeriodSolution) -> SolveResult<PeriodSolution>;

    /// Checks run once before solving; `cycles == 0` means an infinite horizon
    fn check_horizon(&self, _cycles: usize) -> SolveResult<()> {
        Ok(())
    }
}
