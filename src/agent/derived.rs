//! Derived objects built from primitive parameters
//!
//! Income distributions and the asset grid are rebuilt only when asked. Each
//! keeps the parameter generation it was built from so a caller can tell how
//! far it lags behind the primitives.

use crate::distribution::IncomeDistribution;
use crate::error::ConfigResult;
use crate::grid::AssetGrid;
use crate::params::{AgentKind, ParameterSet};

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedState {
    income: Vec<IncomeDistribution>,
    grid: Option<AssetGrid>,

    /// Parameter generation the income process was built from
    pub income_generation: u64,

    /// Parameter generation the asset grid was built from
    pub grid_generation: u64,
}

impl DerivedState {
    /// Build everything for `kind` from `params`
    pub fn build(kind: AgentKind, params: &ParameterSet, generation: u64) -> ConfigResult<Self> {
        Ok(Self {
            income: income_process(kind, params)?,
            grid: assets_grid(kind, params)?,
            income_generation: generation,
            grid_generation: generation,
        })
    }

    pub fn income(&self) -> &[IncomeDistribution] {
        &self.income
    }

    pub fn grid(&self) -> Option<&AssetGrid> {
        self.grid.as_ref()
    }

    pub fn set_income(&mut self, income: Vec<IncomeDistribution>, generation: u64) {
        self.income = income;
        self.income_generation = generation;
    }

    pub fn set_grid(&mut self, grid: Option<AssetGrid>, generation: u64) {
        self.grid = grid;
        self.grid_generation = generation;
    }
}

/// One shock distribution per period of the cycle
///
/// The perfect foresight model gets a degenerate distribution so the cycle
/// length check applies to both models alike.
pub fn income_process(
    kind: AgentKind,
    params: &ParameterSet,
) -> ConfigResult<Vec<IncomeDistribution>> {
    match kind {
        AgentKind::PerfectForesight => Ok(vec![IncomeDistribution::degenerate(); params.t_cycle]),
        AgentKind::IndShock => params
            .perm_shk_std
            .iter()
            .zip(&params.tran_shk_std)
            .take(params.t_cycle)
            .map(|(&perm_std, &tran_std)| {
                IncomeDistribution::lognormal_with_unemployment(
                    params.perm_shk_count,
                    perm_std,
                    params.tran_shk_count,
                    tran_std,
                    params.unemp_prb,
                    params.inc_unemp,
                )
                .map_err(Into::into)
            })
            .collect(),
    }
}

/// Grid of asset levels above the borrowing limit; none for perfect foresight
pub fn assets_grid(kind: AgentKind, params: &ParameterSet) -> ConfigResult<Option<AssetGrid>> {
    match kind {
        AgentKind::PerfectForesight => Ok(None),
        AgentKind::IndShock => {
            let grid = AssetGrid::build(
                params.a_xtra_min,
                params.a_xtra_max,
                params.a_xtra_count,
                params.a_xtra_nest_fac,
                &params.a_xtra_extra,
            )?;
            Ok(Some(grid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notebook_shock_model_derived_state() {
        let params = ParameterSet::ind_shock_example();
        let derived = DerivedState::build(AgentKind::IndShock, &params, 0).unwrap();
        assert_eq!(derived.income().len(), 1);
        // 7 permanent × (7 transitory + unemployment)
        assert_eq!(derived.income()[0].len(), 56);
        assert_eq!(derived.grid().map(AssetGrid::len), Some(48));
    }

    #[test]
    fn test_perfect_foresight_is_degenerate() {
        let mut params = ParameterSet::perfect_foresight_example();
        params.t_cycle = 2;
        params.liv_prb = vec![0.98; 2];
        params.perm_gro_fac = vec![1.01; 2];
        let derived = DerivedState::build(AgentKind::PerfectForesight, &params, 4).unwrap();
        let expected = vec![IncomeDistribution::degenerate(); 2];
        assert_eq!(derived.income(), expected.as_slice());
        assert!(derived.grid().is_none());
        assert_eq!(derived.income_generation, 4);
    }
}
