//! Model parameters, solver settings and the preset calibrations
//!
//! Parameters arrive as a flat mapping from HARK-style names (`CRRA`,
//! `DiscFac`, `LivPrb`, ...) to values and are held in a typed
//! [`ParameterSet`]. Time-varying parameters are sequences with exactly
//! `T_cycle` entries.

pub mod loader;
mod validation;

pub use loader::{load_config_file, DEFAULT_CONFIG_DIR};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

/// Closed set of consumer models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    /// No income risk, no artificial borrowing constraint
    PerfectForesight,
    /// Permanent and transitory income shocks with a borrowing constraint
    IndShock,
}

impl AgentKind {
    /// Keys that must be present (and non-null) in a configuration mapping
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            AgentKind::PerfectForesight => &["CRRA", "DiscFac", "Rfree", "LivPrb", "PermGroFac"],
            AgentKind::IndShock => &[
                "CRRA",
                "DiscFac",
                "Rfree",
                "LivPrb",
                "PermGroFac",
                "PermShkStd",
                "PermShkCount",
                "TranShkStd",
                "TranShkCount",
                "UnempPrb",
                "IncUnemp",
            ],
        }
    }
}

/// Primitive parameters of one agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    /// Coefficient of relative risk aversion
    #[serde(rename = "CRRA")]
    pub crra: f64,

    /// Intertemporal discount factor
    #[serde(rename = "DiscFac")]
    pub disc_fac: f64,

    /// Risk free interest factor
    #[serde(rename = "Rfree")]
    pub rfree: f64,

    /// Survival probability, per period
    #[serde(rename = "LivPrb")]
    pub liv_prb: Vec<f64>,

    /// Permanent income growth factor, per period
    #[serde(rename = "PermGroFac")]
    pub perm_gro_fac: Vec<f64>,

    /// Underlying std of log permanent shocks, per period
    #[serde(rename = "PermShkStd")]
    pub perm_shk_std: Vec<f64>,

    #[serde(rename = "PermShkCount")]
    pub perm_shk_count: usize,

    /// Underlying std of log transitory shocks, per period
    #[serde(rename = "TranShkStd")]
    pub tran_shk_std: Vec<f64>,

    #[serde(rename = "TranShkCount")]
    pub tran_shk_count: usize,

    /// Probability of unemployment
    #[serde(rename = "UnempPrb")]
    pub unemp_prb: f64,

    /// Transitory income when unemployed
    #[serde(rename = "IncUnemp")]
    pub inc_unemp: f64,

    /// Artificial borrowing constraint on normalized assets; None = natural only
    #[serde(rename = "BoroCnstArt")]
    pub boro_cnst_art: Option<f64>,

    #[serde(rename = "aXtraMin")]
    pub a_xtra_min: f64,

    #[serde(rename = "aXtraMax")]
    pub a_xtra_max: f64,

    #[serde(rename = "aXtraCount")]
    pub a_xtra_count: usize,

    #[serde(rename = "aXtraNestFac")]
    pub a_xtra_nest_fac: u32,

    #[serde(rename = "aXtraExtra")]
    pub a_xtra_extra: Vec<f64>,

    /// Whether to construct the value function
    #[serde(rename = "vFuncBool")]
    pub vfunc_bool: bool,

    /// Cubic consumption interpolation (rejected by validation)
    #[serde(rename = "CubicBool")]
    pub cubic_bool: bool,

    /// Number of periods in one cycle
    #[serde(rename = "T_cycle")]
    pub t_cycle: usize,

    /// Number of times the cycle is solved; 0 = infinite horizon
    pub cycles: usize,
}

impl ParameterSet {
    /// Baseline values for every optional key of the given kind
    pub fn defaults(kind: AgentKind) -> Self {
        Self {
            crra: 2.0,
            disc_fac: 0.96,
            rfree: 1.03,
            liv_prb: vec![0.98],
            perm_gro_fac: vec![1.01],
            perm_shk_std: vec![0.0],
            perm_shk_count: 1,
            tran_shk_std: vec![0.0],
            tran_shk_count: 1,
            unemp_prb: 0.0,
            inc_unemp: 0.0,
            boro_cnst_art: match kind {
                AgentKind::PerfectForesight => None,
                AgentKind::IndShock => Some(0.0),
            },
            a_xtra_min: 0.001,
            a_xtra_max: 20.0,
            a_xtra_count: 48,
            a_xtra_nest_fac: 3,
            a_xtra_extra: Vec::new(),
            vfunc_bool: false,
            cubic_bool: false,
            t_cycle: 1,
            cycles: 0,
        }
    }

    /// Infinite-horizon perfect foresight consumer from the introductory notebook
    pub fn perfect_foresight_example() -> Self {
        Self {
            crra: 2.5,
            disc_fac: 0.96,
            rfree: 1.03,
            liv_prb: vec![0.98],
            perm_gro_fac: vec![1.01],
            ..Self::defaults(AgentKind::PerfectForesight)
        }
    }

    /// Infinite-horizon consumer with income shocks from the introductory notebook
    pub fn ind_shock_example() -> Self {
        Self {
            crra: 2.5,
            disc_fac: 0.96,
            rfree: 1.03,
            liv_prb: vec![0.98],
            perm_gro_fac: vec![1.01],
            perm_shk_std: vec![0.1],
            perm_shk_count: 7,
            tran_shk_std: vec![0.1],
            tran_shk_count: 7,
            unemp_prb: 0.05,
            inc_unemp: 0.3,
            boro_cnst_art: Some(0.0),
            a_xtra_min: 0.001,
            a_xtra_max: 50.0,
            a_xtra_count: 48,
            a_xtra_nest_fac: 3,
            ..Self::defaults(AgentKind::IndShock)
        }
    }

    /// Build from a flat name → value mapping and validate eagerly
    ///
    /// Unrecognized keys are ignored (they belong to features outside the
    /// solver, e.g. simulation settings).
    pub fn from_map(kind: AgentKind, map: &Map<String, Value>) -> ConfigResult<Self> {
        for key in kind.required_keys() {
            match map.get(*key) {
                None | Some(Value::Null) => return Err(ConfigError::MissingKey(key.to_string())),
                Some(_) => {}
            }
        }

        let mut params = Self::defaults(kind);
        for (key, value) in map {
            if !params.apply(key, value)? {
                log::debug!("ignoring parameter `{}` not used by the solver", key);
            }
        }

        params.validate(kind)?;
        Ok(params)
    }

    /// Parse a JSON object string and build via [`ParameterSet::from_map`]
    pub fn from_json_str(kind: AgentKind, json: &str) -> ConfigResult<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        match value {
            Value::Object(map) => Self::from_map(kind, &map),
            other => Err(ConfigError::Malformed(format!("found {}", other))),
        }
    }

    /// Flat mapping of the current values, using the configuration key names
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Set one parameter by its configuration name
    ///
    /// Returns `Ok(false)` when the name is not a solver parameter.
    pub fn apply(&mut self, key: &str, value: &Value) -> ConfigResult<bool> {
        use loader::{as_bool, as_count, as_extra_points, as_f64, as_optional_f64, as_sequence};

        match key {
            "CRRA" => self.crra = as_f64(key, value)?,
            "DiscFac" => self.disc_fac = as_f64(key, value)?,
            "Rfree" => self.rfree = as_f64(key, value)?,
            "LivPrb" => self.liv_prb = as_sequence(key, value)?,
            "PermGroFac" => self.perm_gro_fac = as_sequence(key, value)?,
            "PermShkStd" => self.perm_shk_std = as_sequence(key, value)?,
            "PermShkCount" => self.perm_shk_count = as_count(key, value)?,
            "TranShkStd" => self.tran_shk_std = as_sequence(key, value)?,
            "TranShkCount" => self.tran_shk_count = as_count(key, value)?,
            "UnempPrb" => self.unemp_prb = as_f64(key, value)?,
            "IncUnemp" => self.inc_unemp = as_f64(key, value)?,
            "BoroCnstArt" => self.boro_cnst_art = as_optional_f64(key, value)?,
            "aXtraMin" => self.a_xtra_min = as_f64(key, value)?,
            "aXtraMax" => self.a_xtra_max = as_f64(key, value)?,
            "aXtraCount" => self.a_xtra_count = as_count(key, value)?,
            "aXtraNestFac" => {
                let nest = as_count(key, value)?;
                self.a_xtra_nest_fac = u32::try_from(nest).map_err(|_| {
                    ConfigError::out_of_range(key, nest as f64, "nesting factor too large")
                })?;
            }
            "aXtraExtra" => self.a_xtra_extra = as_extra_points(key, value)?,
            "vFuncBool" => self.vfunc_bool = as_bool(key, value)?,
            "CubicBool" => self.cubic_bool = as_bool(key, value)?,
            "T_cycle" => self.t_cycle = as_count(key, value)?,
            "cycles" => self.cycles = as_count(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn is_infinite_horizon(&self) -> bool {
        self.cycles == 0
    }
}

/// Settings for the infinite-horizon fixed-point iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Convergence threshold on the distance between successive solutions
    pub tolerance: f64,

    /// Maximum number of cycle sweeps before reporting non-convergence
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 10_000,
        }
    }
}

impl SolverConfig {
    /// Read `tolerance` / `max_iterations` from a configuration mapping
    pub fn from_map(map: &Map<String, Value>) -> ConfigResult<Self> {
        let mut config = Self::default();
        if let Some(value) = map.get("tolerance").filter(|v| !v.is_null()) {
            config.tolerance = loader::as_f64("tolerance", value)?;
        }
        if let Some(value) = map.get("max_iterations").filter(|v| !v.is_null()) {
            config.max_iterations = loader::as_count("max_iterations", value)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::out_of_range("tolerance", self.tolerance, "must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::out_of_range("max_iterations", 0.0, "must be at least 1"));
        }
        Ok(())
    }
}
