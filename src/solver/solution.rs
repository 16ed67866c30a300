//! Solution to a single period of the consumption-saving problem

use crate::interpolation::{Distance, LinearInterp};
use crate::utility::Crra;

/// Value function stored through its CRRA inverse
///
/// `u⁻¹(v(m))` is close to linear in m, so it interpolates far better than
/// v itself; evaluation maps back through u.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFunction {
    inverted: LinearInterp,
    utility: Crra,
}

impl ValueFunction {
    pub fn new(inverted: LinearInterp, utility: Crra) -> Self {
        Self { inverted, utility }
    }

    /// v(m); NaN below the lowest defined resource level
    pub fn eval(&self, m: f64) -> f64 {
        self.utility.u(self.inverted.eval(m))
    }

    /// The interpolated inverse value u⁻¹(v(m))
    pub fn inverted(&self) -> &LinearInterp {
        &self.inverted
    }
}

/// Consumption function and bounds for one period
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSolution {
    c_func: LinearInterp,
    v_func: Option<ValueFunction>,
    utility: Crra,

    /// Minimum feasible normalized market resources
    pub m_nrm_min: f64,

    /// Normalized human wealth
    pub h_nrm: f64,

    /// Limiting MPC as resources grow without bound
    pub mpc_min: f64,

    /// Limiting MPC as resources approach `m_nrm_min`
    pub mpc_max: f64,
}

impl PeriodSolution {
    pub fn new(
        c_func: LinearInterp,
        v_func: Option<ValueFunction>,
        utility: Crra,
        m_nrm_min: f64,
        h_nrm: f64,
        mpc_min: f64,
        mpc_max: f64,
    ) -> Self {
        Self {
            c_func,
            v_func,
            utility,
            m_nrm_min,
            h_nrm,
            mpc_min,
            mpc_max,
        }
    }

    /// Last period of life: consume everything
    pub fn terminal(crra: f64, with_value_function: bool) -> Self {
        let utility = Crra::new(crra);
        let identity = || {
            LinearInterp::new(vec![0.0, 1.0], vec![0.0, 1.0])
                .unwrap_or_else(|_| unreachable!("two increasing knots"))
        };
        let v_func = with_value_function.then(|| ValueFunction::new(identity(), utility));
        Self::new(identity(), v_func, utility, 0.0, 0.0, 1.0, 1.0)
    }

    pub fn c_func(&self) -> &LinearInterp {
        &self.c_func
    }

    pub fn v_func(&self) -> Option<&ValueFunction> {
        self.v_func.as_ref()
    }

    pub fn crra(&self) -> f64 {
        self.utility.rho
    }

    /// Optimal normalized consumption at resources `m`; NaN below `m_nrm_min`
    pub fn consumption(&self, m: f64) -> f64 {
        self.c_func.eval(m)
    }

    pub fn consumption_many(&self, m: &[f64]) -> Vec<f64> {
        self.c_func.eval_many(m)
    }

    /// Marginal propensity to consume at `m`
    pub fn mpc(&self, m: f64) -> f64 {
        self.c_func.derivative(m)
    }

    /// Marginal value of resources, by the envelope condition u'(c(m))
    pub fn marginal_value(&self, m: f64) -> f64 {
        self.utility.marginal(self.consumption(m))
    }

    /// Value at `m`, when the value function was constructed
    pub fn value(&self, m: f64) -> Option<f64> {
        self.v_func.as_ref().map(|v| v.eval(m))
    }
}

impl Distance for PeriodSolution {
    fn distance(&self, other: &Self) -> f64 {
        self.c_func.distance(&other.c_func)
    }
}
