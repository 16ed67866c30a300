//! CRRA utility and its inverses
//!
//! u(c) = c^(1-ρ)/(1-ρ), with log utility at ρ = 1. The solvers only ever need
//! these transforms, so they live together as a small value type.

/// Constant relative risk aversion utility with coefficient `rho`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crra {
    pub rho: f64,
}

impl Crra {
    pub fn new(rho: f64) -> Self {
        Self { rho }
    }

    fn is_log(&self) -> bool {
        (self.rho - 1.0).abs() < 1e-12
    }

    /// Utility level u(c)
    pub fn u(&self, c: f64) -> f64 {
        if self.is_log() {
            c.ln()
        } else {
            c.powf(1.0 - self.rho) / (1.0 - self.rho)
        }
    }

    /// Marginal utility u'(c) = c^-ρ
    pub fn marginal(&self, c: f64) -> f64 {
        c.powf(-self.rho)
    }

    /// Inverse marginal utility: x^(-1/ρ)
    pub fn inverse_marginal(&self, x: f64) -> f64 {
        x.powf(-1.0 / self.rho)
    }

    /// Inverse utility: the consumption level yielding utility `v`
    pub fn inverse(&self, v: f64) -> f64 {
        if self.is_log() {
            v.exp()
        } else {
            ((1.0 - self.rho) * v).powf(1.0 / (1.0 - self.rho))
        }
    }
}
