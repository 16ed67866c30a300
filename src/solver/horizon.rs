//! Horizon driver: chains period solutions backward in time
//!
//! With `cycles > 0` the cycle is solved that many times, newest period
//! last, and the terminal solution closes the list. With `cycles == 0` the
//! cycle is swept repeatedly until the first-period solution stops moving.

use std::iter;

use super::{PeriodSolution, PeriodSolver};
use crate::error::{SolveError, SolveResult};
use crate::interpolation::Distance;
use crate::params::SolverConfig;

/// Solve one cycle backward from `next`, returned in chronological order
fn solve_cycle<S: PeriodSolver + ?Sized>(
    solver: &S,
    next: &PeriodSolution,
) -> SolveResult<Vec<PeriodSolution>> {
    let t_cycle = solver.cycle_len();
    let mut cycle: Vec<PeriodSolution> = Vec::with_capacity(t_cycle);
    for t in (0..t_cycle).rev() {
        let following = cycle.last().unwrap_or(next);
        let solution = solver.solve_period(t, following)?;
        cycle.push(solution);
    }
    cycle.reverse();
    Ok(cycle)
}

/// Run the backward induction for the whole horizon
///
/// # Returns
/// * finite horizon: `cycles × T_cycle` solutions followed by `terminal`
/// * infinite horizon: the `T_cycle` solutions of the converged cycle
///
/// # Errors
/// [`SolveError::Infeasible`] from any period, or
/// [`SolveError::NonConvergence`] when the iteration bound is exhausted.
pub fn solve_horizon<S: PeriodSolver + ?Sized>(
    solver: &S,
    cycles: usize,
    terminal: &PeriodSolution,
    config: &SolverConfig,
) -> SolveResult<Vec<PeriodSolution>> {
    solver.check_horizon(cycles)?;

    if cycles > 0 {
        solve_finite(solver, cycles, terminal)
    } else {
        solve_infinite(solver, terminal, config)
    }
}

fn solve_finite<S: PeriodSolver + ?Sized>(
    solver: &S,
    cycles: usize,
    terminal: &PeriodSolution,
) -> SolveResult<Vec<PeriodSolution>> {
    let mut sweeps: Vec<Vec<PeriodSolution>> = Vec::with_capacity(cycles);
    for sweep in 0..cycles {
        let next = sweeps.last().and_then(|c| c.first()).unwrap_or(terminal);
        let cycle = solve_cycle(solver, next)?;
        log::debug!("solved cycle {} of {}", sweep + 1, cycles);
        sweeps.push(cycle);
    }

    Ok(sweeps
        .into_iter()
        .rev()
        .flatten()
        .chain(iter::once(terminal.clone()))
        .collect())
}

fn solve_infinite<S: PeriodSolver + ?Sized>(
    solver: &S,
    terminal: &PeriodSolution,
    config: &SolverConfig,
) -> SolveResult<Vec<PeriodSolution>> {
    let mut previous: Option<Vec<PeriodSolution>> = None;
    let mut distance = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        let next = previous.as_ref().and_then(|c| c.first()).unwrap_or(terminal);
        let cycle = solve_cycle(solver, next)?;
        distance = match cycle.first() {
            Some(first) => first.distance(next),
            None => 0.0,
        };

        if distance < config.tolerance {
            log::info!(
                "infinite-horizon solution converged after {} iterations (distance {:.3e})",
                iteration,
                distance
            );
            return Ok(cycle);
        }
        if iteration % 500 == 0 {
            log::debug!("iteration {}: distance {:.3e}", iteration, distance);
        }
        previous = Some(cycle);
    }

    Err(SolveError::NonConvergence {
        iterations: config.max_iterations,
        distance,
        tolerance: config.tolerance,
    })
}
