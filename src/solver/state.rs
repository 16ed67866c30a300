//! Solve-state tracking for an agent

use serde::{Deserialize, Serialize};

/// Where an agent stands with respect to its solution list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveState {
    /// No solve has ever succeeded
    #[default]
    Uninitialized,

    /// A solve call is in progress
    Solving,

    /// The solution list matches the current parameters
    Solved,

    /// Parameters changed since the last successful solve
    Stale,
}

impl SolveState {
    /// Transition after a parameter mutation
    pub fn after_mutation(self) -> Self {
        match self {
            SolveState::Solved | SolveState::Stale => SolveState::Stale,
            other => other,
        }
    }

    /// Whether a solution list exists at all
    pub fn has_solution(self) -> bool {
        matches!(self, SolveState::Solved | SolveState::Stale)
    }
}
