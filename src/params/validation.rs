//! Eager consistency checks on a [`ParameterSet`].
//!
//! Run before any derived object is built or any period is solved:
//!
//! - **Preferences**: `CRRA`, `DiscFac`, `Rfree` finite and strictly positive.
//! - **Per-period sequences**: exactly `T_cycle` entries each, with survival
//!   probabilities in (0, 1] and positive growth factors.
//! - **Income process** (shock model only): counts ≥ 1, non-negative stds,
//!   `UnempPrb` in [0, 1), non-negative `IncUnemp`.
//! - **Asset grid** (shock model only): `0 < aXtraMin < aXtraMax`, at least
//!   two points.
//! - **Unsupported options**: cubic interpolation, an artificial constraint
//!   on the perfect foresight model, value functions under log utility.
use super::{AgentKind, ParameterSet};
use crate::error::{ConfigError, ConfigResult};

fn check_positive(name: &str, value: f64) -> ConfigResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::out_of_range(name, value, "must be finite and positive"));
    }
    Ok(())
}

fn check_length(name: &str, values: &[f64], t_cycle: usize) -> ConfigResult<()> {
    if values.len() != t_cycle {
        return Err(ConfigError::WrongLength {
            name: name.to_string(),
            expected: t_cycle,
            found: values.len(),
        });
    }
    Ok(())
}

impl ParameterSet {
    /// Validate for the given model kind.
    ///
    /// # Errors
    /// The first violated constraint, as a [`ConfigError`].
    pub fn validate(&self, kind: AgentKind) -> ConfigResult<()> {
        check_positive("CRRA", self.crra)?;
        check_positive("DiscFac", self.disc_fac)?;
        check_positive("Rfree", self.rfree)?;

        if self.t_cycle == 0 {
            return Err(ConfigError::out_of_range("T_cycle", 0.0, "must be at least 1"));
        }

        check_length("LivPrb", &self.liv_prb, self.t_cycle)?;
        for &p in &self.liv_prb {
            if !(p > 0.0 && p <= 1.0) {
                return Err(ConfigError::out_of_range("LivPrb", p, "must lie in (0, 1]"));
            }
        }

        check_length("PermGroFac", &self.perm_gro_fac, self.t_cycle)?;
        for &g in &self.perm_gro_fac {
            check_positive("PermGroFac", g)?;
        }

        if self.cubic_bool {
            return Err(ConfigError::Unsupported {
                name: "CubicBool".into(),
                reason: "only piecewise-linear consumption functions are built",
            });
        }
        if self.vfunc_bool && (self.crra - 1.0).abs() < 1e-12 {
            return Err(ConfigError::Unsupported {
                name: "vFuncBool".into(),
                reason: "value functions are stored in inverted CRRA form, which needs CRRA != 1",
            });
        }

        match kind {
            AgentKind::PerfectForesight => {
                if self.boro_cnst_art.is_some() {
                    return Err(ConfigError::Unsupported {
                        name: "BoroCnstArt".into(),
                        reason: "the perfect foresight model has no artificial borrowing \
                                 constraint; use null",
                    });
                }
            }
            AgentKind::IndShock => self.validate_income_process()?,
        }

        Ok(())
    }

    fn validate_income_process(&self) -> ConfigResult<()> {
        check_length("PermShkStd", &self.perm_shk_std, self.t_cycle)?;
        check_length("TranShkStd", &self.tran_shk_std, self.t_cycle)?;

        let stds = [
            ("PermShkStd", &self.perm_shk_std),
            ("TranShkStd", &self.tran_shk_std),
        ];
        for (name, values) in stds {
            for &s in values {
                if !(s.is_finite() && s >= 0.0) {
                    let reason = "must be finite and non-negative";
                    return Err(ConfigError::out_of_range(name, s, reason));
                }
            }
        }

        if self.perm_shk_count == 0 {
            return Err(ConfigError::out_of_range("PermShkCount", 0.0, "must be at least 1"));
        }
        if self.tran_shk_count == 0 {
            return Err(ConfigError::out_of_range("TranShkCount", 0.0, "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.unemp_prb) {
            let reason = "must lie in [0, 1)";
            return Err(ConfigError::out_of_range("UnempPrb", self.unemp_prb, reason));
        }
        if !(self.inc_unemp >= 0.0) {
            let reason = "must be non-negative";
            return Err(ConfigError::out_of_range("IncUnemp", self.inc_unemp, reason));
        }
        // Employed transitory shocks are scaled by (1 - p x) / (1 - p)
        if self.unemp_prb * self.inc_unemp >= 1.0 {
            return Err(ConfigError::out_of_range(
                "IncUnemp",
                self.inc_unemp,
                "UnempPrb x IncUnemp must be below mean income 1",
            ));
        }
        if let Some(a) = self.boro_cnst_art {
            if !a.is_finite() {
                return Err(ConfigError::out_of_range("BoroCnstArt", a, "must be finite or null"));
            }
        }

        check_positive("aXtraMin", self.a_xtra_min)?;
        if !(self.a_xtra_max > self.a_xtra_min) {
            let reason = "must exceed aXtraMin";
            return Err(ConfigError::out_of_range("aXtraMax", self.a_xtra_max, reason));
        }
        if self.a_xtra_count < 2 {
            return Err(ConfigError::out_of_range(
                "aXtraCount",
                self.a_xtra_count as f64,
                "must be at least 2",
            ));
        }
        Ok(())
    }
}
