//! Error kinds for configuration, discretization, grids and solving
//!
//! Configuration problems are detected before any solving begins. Solving can
//! fail because no positive-consumption solution exists or because the
//! infinite-horizon fixed point was not reached within the iteration bound.

use thiserror::Error;

/// Result alias for parameter and derived-state construction
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for solve calls
pub type SolveResult<T> = Result<T, SolveError>;

/// Malformed, missing or inconsistent parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing required parameter `{0}`")]
    MissingKey(String),

    #[error("parameter `{name}` has the wrong type: {reason}")]
    InvalidType { name: String, reason: String },

    #[error("parameter `{name}` has {found} entries, expected {expected} (T_cycle)")]
    WrongLength {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("parameter `{name}` = {value} is out of range: {reason}")]
    OutOfRange {
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("parameter `{name}` is not supported here: {reason}")]
    Unsupported { name: String, reason: &'static str },

    #[error("cannot read configuration {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("configuration must be a JSON object of parameter names to values: {0}")]
    Malformed(String),

    #[error(
        "income process covers {built} periods but T_cycle is {t_cycle}; \
         call update_income_process"
    )]
    IncomeProcessOutOfDate { built: usize, t_cycle: usize },

    #[error(transparent)]
    Shock(#[from] ShockError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl ConfigError {
    pub(crate) fn out_of_range(name: &str, value: f64, reason: &'static str) -> Self {
        ConfigError::OutOfRange {
            name: name.to_string(),
            value,
            reason,
        }
    }

    pub(crate) fn invalid_type(name: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidType {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Invalid input to the shock discretizer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShockError {
    #[error("discretization needs at least one point, got {0}")]
    InvalidCount(usize),

    #[error("standard deviation must be finite and non-negative, got {0}")]
    InvalidStd(f64),

    #[error("unemployment probability must lie in [0, 1), got {0}")]
    InvalidUnempPrb(f64),

    #[error("unemployment income must be finite and non-negative, got {0}")]
    InvalidUnempIncome(f64),

    #[error("unemployment mass {prob} x {income} must stay below the mean income {mean}")]
    UnempMassExceedsMean { prob: f64, income: f64, mean: f64 },

    #[error("probabilities sum to {0}, expected 1")]
    ProbabilitiesDoNotSumToOne(f64),

    #[error("shock distribution arrays have mismatched lengths ({probs}, {perm}, {tran})")]
    LengthMismatch { probs: usize, perm: usize, tran: usize },

    #[error("shock value at index {index} must be finite and positive, got {value}")]
    InvalidShockValue { index: usize, value: f64 },
}

/// Invalid input to the asset grid builder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid minimum must be finite and positive, got {0}")]
    NonPositiveMin(f64),

    #[error("grid maximum {max} must exceed minimum {min}")]
    MaxNotAboveMin { min: f64, max: f64 },

    #[error("grid needs at least two points, got {0}")]
    TooFewPoints(usize),

    #[error("extra grid point must be finite and positive, got {0}")]
    InvalidExtraPoint(f64),
}

/// Fatal outcomes of a solve call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no positive-consumption solution in period {period}: {reason}")]
    Infeasible { period: usize, reason: String },

    #[error(
        "infinite-horizon solution did not converge after {iterations} iterations \
         (distance {distance:e}, tolerance {tolerance:e})"
    )]
    NonConvergence {
        iterations: usize,
        distance: f64,
        tolerance: f64,
    },
}

/// Non-fatal notice that a solution list predates the current parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "solution was computed for parameter generation {solved_generation}, \
     parameters are now at generation {current_generation}; call solve() again"
)]
pub struct StaleSolutionWarning {
    pub solved_generation: u64,
    pub current_generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shock_error_converts_to_config_error() {
        let err: ConfigError = ShockError::InvalidCount(0).into();
        assert!(matches!(err, ConfigError::Shock(ShockError::InvalidCount(0))));
        assert!(err.to_string().contains("at least one point"));
    }

    #[test]
    fn test_config_error_wraps_into_solve_error() {
        let err: SolveError = ConfigError::MissingKey("CRRA".into()).into();
        assert_eq!(
            err.to_string(),
            "configuration error: missing required parameter `CRRA`"
        );
    }
}
