//! Consumption-saving solver for normalized consumer problems
//!
//! This library provides:
//! - Perfect foresight and income-shock consumer models
//! - Equiprobable discretization of mean-one lognormal income shocks
//! - Multi-exponential asset grids
//! - Backward induction over finite horizons and fixed-point iteration over
//!   infinite ones (endogenous grid method for the shock model)
//! - An agent container tracking whether its solution matches its parameters
//! - Parallel parameter sweeps

pub mod agent;
pub mod distribution;
pub mod error;
pub mod grid;
pub mod interpolation;
pub mod params;
pub mod scenario;
pub mod solver;
pub mod utility;

// Re-export commonly used types
pub use agent::Agent;
pub use distribution::{DiscreteDistribution, IncomeDistribution};
pub use error::{ConfigError, SolveError, StaleSolutionWarning};
pub use grid::AssetGrid;
pub use params::{AgentKind, ParameterSet, SolverConfig};
pub use scenario::{solve_all, Scenario, SweepRunner};
pub use solver::{PeriodSolution, SolveState};
