//! Piecewise-linear interpolation on a strictly increasing knot vector
//!
//! Below the first knot the function is undefined and evaluates to NaN. Above
//! the last knot it extrapolates linearly, or, when a limiting linear function
//! is supplied, decays exponentially from the last segment toward that limit.

use thiserror::Error;

/// Reasons an interpolant cannot be built from the given knots
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpError {
    #[error("need at least two knots, got {0}")]
    TooFewKnots(usize),

    #[error("x has {x} entries but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("knots must be finite and strictly increasing (index {index})")]
    NotIncreasing { index: usize },
}

/// Distance between two solution objects, used for fixed-point convergence
pub trait Distance {
    fn distance(&self, other: &Self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UpperTail {
    Linear,
    /// y = intercept + slope·x − level_gap·exp(−rate·(x − x_top))
    Decay {
        intercept: f64,
        slope: f64,
        level_gap: f64,
        rate: f64,
    },
}

/// Linear interpolant over knots `(x_i, y_i)`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterp {
    x: Vec<f64>,
    y: Vec<f64>,
    upper: UpperTail,
}

impl LinearInterp {
    /// Build from knots; `x` must be finite and strictly increasing
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, InterpError> {
        if x.len() != y.len() {
            return Err(InterpError::LengthMismatch { x: x.len(), y: y.len() });
        }
        if x.len() < 2 {
            return Err(InterpError::TooFewKnots(x.len()));
        }
        for i in 0..x.len() {
            if !x[i].is_finite() || !y[i].is_finite() {
                return Err(InterpError::NotIncreasing { index: i });
            }
            if i > 0 && x[i] <= x[i - 1] {
                return Err(InterpError::NotIncreasing { index: i });
            }
        }
        Ok(Self {
            x,
            y,
            upper: UpperTail::Linear,
        })
    }

    /// Build with an upper tail that approaches `intercept + slope·x`
    ///
    /// Falls back to plain linear extrapolation when the last segment already
    /// lies on the wrong side of the limit for an exponential approach.
    pub fn with_limit(
        x: Vec<f64>,
        y: Vec<f64>,
        intercept: f64,
        slope: f64,
    ) -> Result<Self, InterpError> {
        let mut interp = Self::new(x, y)?;
        if !intercept.is_finite() || !slope.is_finite() {
            return Ok(interp);
        }

        let n = interp.x.len();
        let x_top = interp.x[n - 1];
        let slope_at_top =
            (interp.y[n - 1] - interp.y[n - 2]) / (interp.x[n - 1] - interp.x[n - 2]);
        let level_gap = intercept + slope * x_top - interp.y[n - 1];
        let slope_gap = slope - slope_at_top;

        if level_gap.abs() > 1e-14 {
            let rate = -slope_gap / level_gap;
            if rate > 0.0 && rate.is_finite() {
                interp.upper = UpperTail::Decay {
                    intercept,
                    slope,
                    level_gap,
                    rate,
                };
            }
        }
        Ok(interp)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Lowest point where the function is defined
    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    /// Index of the segment containing `x` (clamped to the outer segments)
    fn segment(&self, x: f64) -> usize {
        let i = self.x.partition_point(|&xi| xi <= x);
        i.saturating_sub(1).min(self.x.len() - 2)
    }

    /// Evaluate at `x`; NaN below the first knot
    pub fn eval(&self, x: f64) -> f64 {
        if x.is_nan() || x < self.x[0] {
            return f64::NAN;
        }
        let n = self.x.len();
        if x > self.x[n - 1] {
            if let UpperTail::Decay {
                intercept,
                slope,
                level_gap,
                rate,
            } = self.upper
            {
                return intercept + slope * x - level_gap * (-rate * (x - self.x[n - 1])).exp();
            }
        }
        let j = self.segment(x);
        let w = (x - self.x[j]) / (self.x[j + 1] - self.x[j]);
        self.y[j] + w * (self.y[j + 1] - self.y[j])
    }

    /// First derivative at `x`; NaN below the first knot
    pub fn derivative(&self, x: f64) -> f64 {
        if x.is_nan() || x < self.x[0] {
            return f64::NAN;
        }
        let n = self.x.len();
        if x > self.x[n - 1] {
            if let UpperTail::Decay {
                slope,
                level_gap,
                rate,
                ..
            } = self.upper
            {
                return slope + level_gap * rate * (-rate * (x - self.x[n - 1])).exp();
            }
        }
        let j = self.segment(x);
        (self.y[j + 1] - self.y[j]) / (self.x[j + 1] - self.x[j])
    }

    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

impl Distance for LinearInterp {
    /// Largest knot difference when the knot counts agree, else the count gap
    fn distance(&self, other: &Self) -> f64 {
        if self.x.len() != other.x.len() {
            return (self.x.len() as f64 - other.x.len() as f64).abs();
        }
        self.x
            .iter()
            .zip(&other.x)
            .chain(self.y.iter().zip(&other.y))
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolates_between_knots() {
        let f = LinearInterp::new(vec![0.0, 1.0, 3.0], vec![0.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(f.eval(0.5), 1.0);
        assert_relative_eq!(f.eval(2.0), 2.5);
        assert_relative_eq!(f.eval(3.0), 3.0);
        assert_relative_eq!(f.derivative(2.0), 0.5);
    }

    #[test]
    fn test_undefined_below_first_knot() {
        let f = LinearInterp::new(vec![-1.0, 1.0], vec![0.0, 1.0]).unwrap();
        assert!(f.eval(-1.0001).is_nan());
        assert_relative_eq!(f.eval(-1.0), 0.0);
    }

    #[test]
    fn test_linear_extrapolation_above() {
        let f = LinearInterp::new(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
        assert_relative_eq!(f.eval(5.0), 6.0);
    }

    #[test]
    fn test_decay_tail_is_continuous_and_approaches_limit() {
        // Last segment slope 0.5, limit slope 0.25: the tail bends toward the limit
        let f = LinearInterp::with_limit(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 1.5], 1.2, 0.25)
            .unwrap();
        assert_relative_eq!(f.eval(2.0 + 1e-9), 1.5, epsilon = 1e-6);
        assert_relative_eq!(f.derivative(2.0 + 1e-9), 0.5, epsilon = 1e-6);

        let far = 500.0;
        assert_relative_eq!(f.eval(far), 1.2 + 0.25 * far, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_unsorted_knots() {
        let err = LinearInterp::new(vec![0.0, 2.0, 1.0], vec![0.0, 1.0, 2.0]).unwrap_err();
        assert_eq!(err, InterpError::NotIncreasing { index: 2 });
        assert!(LinearInterp::new(vec![0.0], vec![0.0]).is_err());
    }

    #[test]
    fn test_distance() {
        let a = LinearInterp::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        let b = LinearInterp::new(vec![0.0, 1.0], vec![0.0, 1.25]).unwrap();
        let c = LinearInterp::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]).unwrap();
        assert_relative_eq!(a.distance(&b), 0.25);
        assert_relative_eq!(a.distance(&c), 1.0);
        assert_eq!(a.distance(&a), 0.0);
    }
}
