//! Grid of end-of-period assets above the borrowing constraint
//!
//! Points are spaced multi-exponentially: the bounds are pushed through
//! `ln(1 + x)` `nest` times, spaced uniformly, then mapped back. Each extra
//! nesting level concentrates more points near the lower bound, where the
//! consumption function bends the most.

use crate::error::GridError;

/// Multi-exponentially spaced grid on `[min, max]` with `count` points
///
/// `nest = 0` gives plain geometric spacing. The endpoints are pinned to
/// exactly `min` and `max`.
pub fn make_grid_exp_mult(
    min: f64,
    max: f64,
    count: usize,
    nest: u32,
) -> Result<Vec<f64>, GridError> {
    if !(min.is_finite() && min > 0.0) {
        return Err(GridError::NonPositiveMin(min));
    }
    if !(max.is_finite() && max > min) {
        return Err(GridError::MaxNotAboveMin { min, max });
    }
    if count < 2 {
        return Err(GridError::TooFewPoints(count));
    }

    let step = |lo: f64, hi: f64, i: usize| lo + (hi - lo) * i as f64 / (count - 1) as f64;

    let mut grid: Vec<f64> = if nest == 0 {
        let (lo, hi) = (min.ln(), max.ln());
        (0..count).map(|i| step(lo, hi, i).exp()).collect()
    } else {
        let (mut lo, mut hi) = (min, max);
        for _ in 0..nest {
            lo = lo.ln_1p();
            hi = hi.ln_1p();
        }
        (0..count)
            .map(|i| {
                let mut g = step(lo, hi, i);
                for _ in 0..nest {
                    g = g.exp_m1();
                }
                g
            })
            .collect()
    };

    grid[0] = min;
    grid[count - 1] = max;
    Ok(grid)
}

/// Sorted, de-duplicated grid of normalized assets above the constraint
#[derive(Debug, Clone, PartialEq)]
pub struct AssetGrid {
    points: Vec<f64>,
}

impl AssetGrid {
    /// Build the base grid and merge in any extra points
    pub fn build(
        min: f64,
        max: f64,
        count: usize,
        nest: u32,
        extra: &[f64],
    ) -> Result<Self, GridError> {
        let mut points = make_grid_exp_mult(min, max, count, nest)?;

        for &x in extra {
            if !(x.is_finite() && x > 0.0) {
                return Err(GridError::InvalidExtraPoint(x));
            }
            points.push(x);
        }

        points.sort_by(f64::total_cmp);
        points.dedup_by(|b, a| (*b - *a).abs() <= f64::EPSILON * a.abs().max(1.0));

        Ok(Self { points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.points[0]
    }

    pub fn last(&self) -> f64 {
        self.points[self.points.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_strictly_increasing(points: &[f64]) {
        for w in points.windows(2) {
            assert!(w[1] > w[0], "grid not increasing: {} then {}", w[0], w[1]);
        }
    }

    #[test]
    fn test_grid_endpoints_and_monotonicity() {
        for nest in 0..4 {
            let grid = AssetGrid::build(0.001, 50.0, 48, nest, &[]).unwrap();
            assert_eq!(grid.len(), 48);
            assert_eq!(grid.first(), 0.001);
            assert_eq!(grid.last(), 50.0);
            assert_strictly_increasing(grid.points());
        }
    }

    #[test]
    fn test_nesting_densifies_near_minimum() {
        let flat = make_grid_exp_mult(0.001, 50.0, 48, 0).unwrap();
        let nested = make_grid_exp_mult(0.001, 50.0, 48, 3).unwrap();
        // Spacing grows away from the lower bound
        let nested_gaps: Vec<f64> = nested.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(nested_gaps.first().unwrap() < nested_gaps.last().unwrap());
        assert!(nested_gaps.windows(2).all(|w| w[1] >= w[0]));
        assert!(flat[1] > 0.001 && nested[1] > 0.001);
    }

    #[test]
    fn test_extra_points_merged_and_deduplicated() {
        let grid = AssetGrid::build(1.0, 10.0, 4, 0, &[5.0, 10.0, 20.0]).unwrap();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.last(), 20.0);
        assert_strictly_increasing(grid.points());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert_eq!(
            make_grid_exp_mult(1.0, 1.0, 10, 3),
            Err(GridError::MaxNotAboveMin { min: 1.0, max: 1.0 })
        );
        assert_eq!(make_grid_exp_mult(0.0, 1.0, 10, 3), Err(GridError::NonPositiveMin(0.0)));
        assert_eq!(make_grid_exp_mult(0.1, 1.0, 1, 3), Err(GridError::TooFewPoints(1)));
        assert_eq!(
            AssetGrid::build(0.1, 1.0, 5, 0, &[-2.0]),
            Err(GridError::InvalidExtraPoint(-2.0))
        );
    }
}
