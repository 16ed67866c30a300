//! Scenario runner for parameter sweeps
//!
//! Holds a base agent and solves copies of it under parameter overrides.
//! Scenarios are independent, so they run in parallel.

use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::agent::Agent;
use crate::error::SolveResult;

/// A labelled set of parameter overrides
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub label: String,
    pub overrides: Map<String, Value>,
}

impl Scenario {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            overrides: Map::new(),
        }
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.overrides.insert(name.to_string(), value);
        self
    }

    /// One scenario per value of a single parameter
    pub fn sweep(name: &str, values: &[f64]) -> Vec<Self> {
        values
            .iter()
            .map(|&v| Scenario::new(format!("{}={}", name, v)).with(name, Value::from(v)))
            .collect()
    }
}

/// Outcome of one scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub label: String,
    pub agent: SolveResult<Agent>,
}

/// Solves variations of a base agent
///
/// # Example
/// ```ignore
/// let runner = SweepRunner::new(Agent::perfect_foresight(params)?);
/// let results = runner.run_scenarios(&Scenario::sweep("DiscFac", &[0.90, 0.93, 0.96]));
/// ```
#[derive(Debug, Clone)]
pub struct SweepRunner {
    base: Agent,
}

impl SweepRunner {
    pub fn new(base: Agent) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Agent {
        &self.base
    }

    /// Copy the base agent, apply the overrides, rebuild derived objects and solve
    ///
    /// Each scenario is a fresh consumer, so its income process and grid are
    /// rebuilt from the overridden parameters.
    pub fn run(&self, scenario: &Scenario) -> SolveResult<Agent> {
        let mut agent = self.base.clone();
        for (name, value) in &scenario.overrides {
            agent.set_parameter(name, value)?;
        }
        agent.update()?;
        agent.solve()?;
        Ok(agent)
    }

    /// Run every scenario in parallel, preserving input order
    pub fn run_scenarios(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        scenarios
            .par_iter()
            .map(|scenario| {
                let agent = self.run(scenario);
                if let Err(e) = &agent {
                    log::warn!("scenario {} failed: {}", scenario.label, e);
                }
                ScenarioResult {
                    label: scenario.label.clone(),
                    agent,
                }
            })
            .collect()
    }
}

/// Solve many independent agents in parallel
pub fn solve_all(agents: &mut [Agent]) -> Vec<SolveResult<()>> {
    agents.par_iter_mut().map(|agent| agent.solve()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSet;
    use crate::solver::SolveState;

    fn base() -> Agent {
        Agent::perfect_foresight(ParameterSet::perfect_foresight_example()).unwrap()
    }

    #[test]
    fn test_sweep_preserves_order_and_base() {
        let runner = SweepRunner::new(base());
        let results = runner.run_scenarios(&Scenario::sweep("DiscFac", &[0.90, 0.93, 0.96]));

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].label, "DiscFac=0.9");
        let c: Vec<f64> = results
            .iter()
            .map(|r| r.agent.as_ref().unwrap().solution()[0].consumption(5.0))
            .collect();
        // More patient consumers consume less today
        assert!(c[0] > c[1] && c[1] > c[2]);
        assert_eq!(runner.base().state(), SolveState::Uninitialized);
    }

    #[test]
    fn test_failing_scenario_reported_alone() {
        let runner = SweepRunner::new(base());
        let scenarios = vec![
            Scenario::new("ok"),
            Scenario::new("growth").with("PermGroFac", Value::from(1.05)),
            Scenario::new("typo").with("DiscFac", Value::from("high")),
        ];
        let results = runner.run_scenarios(&scenarios);
        assert!(results[0].agent.is_ok());
        assert!(results[1].agent.is_err());
        assert!(results[2].agent.is_err());
    }

    #[test]
    fn test_solve_all() {
        let mut agents = vec![base(), base()];
        agents[1].update_params(|p| p.crra = 3.0);
        let outcomes = solve_all(&mut agents);
        assert!(outcomes.iter().all(Result::is_ok));
        assert!(agents.iter().all(|a| a.state() == SolveState::Solved));
    }
}
