//! Agent container: parameters, derived objects, solution list and solve state
//!
//! Mutating a parameter never rebuilds anything by itself. It bumps the
//! parameter generation and marks an existing solution stale; derived objects
//! (income distributions, asset grid) only change through the explicit
//! `update_*` calls. A re-solve after changing, say, `PermShkStd` without
//! `update_income_process` reproduces the previous solution.

pub mod derived;

pub use derived::DerivedState;

use serde_json::{Map, Value};
use std::path::Path;

use crate::distribution::IncomeDistribution;
use crate::error::{ConfigError, ConfigResult, SolveResult, StaleSolutionWarning};
use crate::grid::AssetGrid;
use crate::params::{load_config_file, AgentKind, ParameterSet, SolverConfig};
use crate::solver::{
    solve_horizon, IndShockSolver, PerfForesightSolver, PeriodSolution, SolveState,
};

/// A consumer type together with its solution
///
/// Cloning yields a fully independent agent; nothing is shared between copies.
#[derive(Debug, Clone)]
pub struct Agent {
    kind: AgentKind,
    params: ParameterSet,
    config: SolverConfig,
    derived: DerivedState,
    terminal: Option<PeriodSolution>,
    solution: Vec<PeriodSolution>,
    state: SolveState,

    /// Bumped on every parameter mutation
    generation: u64,
    solved_generation: Option<u64>,
}

impl Agent {
    /// Validate `params` and build the derived objects
    pub fn new(kind: AgentKind, params: ParameterSet) -> ConfigResult<Self> {
        params.validate(kind)?;
        let derived = DerivedState::build(kind, &params, 0)?;
        Ok(Self {
            kind,
            params,
            config: SolverConfig::default(),
            derived,
            terminal: None,
            solution: Vec::new(),
            state: SolveState::Uninitialized,
            generation: 0,
            solved_generation: None,
        })
    }

    pub fn perfect_foresight(params: ParameterSet) -> ConfigResult<Self> {
        Self::new(AgentKind::PerfectForesight, params)
    }

    pub fn ind_shock(params: ParameterSet) -> ConfigResult<Self> {
        Self::new(AgentKind::IndShock, params)
    }

    /// Build from a flat configuration mapping, including solver settings
    pub fn from_config(kind: AgentKind, map: &Map<String, Value>) -> ConfigResult<Self> {
        let params = ParameterSet::from_map(kind, map)?;
        let config = SolverConfig::from_map(map)?;
        let mut agent = Self::new(kind, params)?;
        agent.config = config;
        Ok(agent)
    }

    pub fn from_config_file(kind: AgentKind, path: &Path) -> ConfigResult<Self> {
        let map = load_config_file(path)?;
        Self::from_config(kind, &map)
    }

    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.set_solver_config(config);
        self
    }

    /// Replace the default "consume everything" last-period solution
    pub fn with_terminal_solution(mut self, terminal: PeriodSolution) -> Self {
        self.set_terminal_solution(Some(terminal));
        self
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn solver_config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    pub fn income_distributions(&self) -> &[IncomeDistribution] {
        self.derived.income()
    }

    pub fn assets_grid(&self) -> Option<&AssetGrid> {
        self.derived.grid()
    }

    fn mark_mutated(&mut self) {
        self.generation += 1;
        self.state = self.state.after_mutation();
    }

    /// Mutate primitive parameters in place; derived objects are left alone
    pub fn update_params<F: FnOnce(&mut ParameterSet)>(&mut self, mutate: F) {
        mutate(&mut self.params);
        self.mark_mutated();
    }

    /// Set one parameter by its configuration name
    pub fn set_parameter(&mut self, name: &str, value: &Value) -> ConfigResult<()> {
        let mut params = self.params.clone();
        if !params.apply(name, value)? {
            return Err(ConfigError::Unsupported {
                name: name.to_string(),
                reason: "not a parameter of this model",
            });
        }
        self.params = params;
        self.mark_mutated();
        Ok(())
    }

    pub fn set_solver_config(&mut self, config: SolverConfig) {
        self.config = config;
        self.mark_mutated();
    }

    pub fn set_terminal_solution(&mut self, terminal: Option<PeriodSolution>) {
        self.terminal = terminal;
        self.mark_mutated();
    }

    /// Rebuild the per-period income distributions from the current parameters
    pub fn update_income_process(&mut self) -> ConfigResult<()> {
        self.params.validate(self.kind)?;
        let income = derived::income_process(self.kind, &self.params)?;
        self.derived.set_income(income, self.generation);
        log::debug!("income process rebuilt at generation {}", self.generation);
        Ok(())
    }

    /// Install caller-built income distributions, one per period of the cycle
    pub fn set_income_process(&mut self, income: Vec<IncomeDistribution>) -> ConfigResult<()> {
        if income.len() != self.params.t_cycle {
            return Err(ConfigError::WrongLength {
                name: "IncShkDstn".into(),
                expected: self.params.t_cycle,
                found: income.len(),
            });
        }
        self.mark_mutated();
        self.derived.set_income(income, self.generation);
        Ok(())
    }

    /// Rebuild the asset grid from the current parameters
    pub fn update_assets_grid(&mut self) -> ConfigResult<()> {
        self.params.validate(self.kind)?;
        let grid = derived::assets_grid(self.kind, &self.params)?;
        self.derived.set_grid(grid, self.generation);
        log::debug!("asset grid rebuilt at generation {}", self.generation);
        Ok(())
    }

    /// Rebuild every derived object
    pub fn update(&mut self) -> ConfigResult<()> {
        self.update_income_process()?;
        self.update_assets_grid()
    }

    /// Solve the model over its horizon
    ///
    /// On failure the previous solution list and state are kept.
    pub fn solve(&mut self) -> SolveResult<()> {
        self.params.validate(self.kind)?;
        self.config.validate()?;
        let built = self.derived.income().len();
        if built != self.params.t_cycle {
            return Err(ConfigError::IncomeProcessOutOfDate {
                built,
                t_cycle: self.params.t_cycle,
            }
            .into());
        }
        if self.derived.income_generation < self.generation {
            log::debug!(
                "solving with an income process from generation {} (parameters at {})",
                self.derived.income_generation,
                self.generation
            );
        }

        let previous = self.state;
        self.state = SolveState::Solving;
        match self.run_backward_induction() {
            Ok(solution) => {
                log::info!(
                    "{:?} agent solved: {} period solution(s), generation {}",
                    self.kind,
                    solution.len(),
                    self.generation
                );
                self.solution = solution;
                self.solved_generation = Some(self.generation);
                self.state = SolveState::Solved;
                Ok(())
            }
            Err(e) => {
                log::warn!("{:?} agent failed to solve: {}", self.kind, e);
                self.state = previous;
                Err(e)
            }
        }
    }

    fn run_backward_induction(&self) -> SolveResult<Vec<PeriodSolution>> {
        let terminal = match &self.terminal {
            Some(terminal) => terminal.clone(),
            None => PeriodSolution::terminal(self.params.crra, self.params.vfunc_bool),
        };
        let cycles = self.params.cycles;

        match self.kind {
            AgentKind::PerfectForesight => {
                let solver = PerfForesightSolver::new(&self.params);
                solve_horizon(&solver, cycles, &terminal, &self.config)
            }
            AgentKind::IndShock => {
                let grid = self.derived.grid().ok_or(ConfigError::Unsupported {
                    name: "aXtraCount".into(),
                    reason: "no asset grid has been built; call update_assets_grid",
                })?;
                let solver = IndShockSolver::new(&self.params, self.derived.income(), grid);
                solve_horizon(&solver, cycles, &terminal, &self.config)
            }
        }
    }

    /// The solution list, one entry per period (logs a warning when stale)
    pub fn solution(&self) -> &[PeriodSolution] {
        if let Some(warning) = self.staleness() {
            log::warn!("{}", warning);
        }
        &self.solution
    }

    /// First-period solution, if solved
    pub fn first_solution(&self) -> Option<&PeriodSolution> {
        self.solution().first()
    }

    /// Why the current solution list no longer matches the parameters
    pub fn staleness(&self) -> Option<StaleSolutionWarning> {
        match (self.state, self.solved_generation) {
            (SolveState::Stale, Some(solved_generation)) => Some(StaleSolutionWarning {
                solved_generation,
                current_generation: self.generation,
            }),
            _ => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.state == SolveState::Stale
    }
}
