//! Grid construction, clamp-to-edge interpolation and unit helpers.

use crate::common::constants::{ELECTRON_REST_ENERGY_EV, EV_TO_MEV, SPEED_OF_LIGHT_CM_S};
use crate::domain::project::DEFAULT_GRID_POINTS;

pub fn linear_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    if count < 2 {
        return None;
    }

    let step = (end - start) / ((count - 1) as f64);
    let mut grid = Vec::with_capacity(count);
    for index in 0..count {
        grid.push(start + step * (index as f64));
    }

    if let Some(last) = grid.last_mut() {
        *last = end;
    }

    Some(grid)
}

/// `10^x` over `linear_grid(start_exponent, end_exponent, count)`.
pub fn log_spaced(start_exponent: f64, end_exponent: f64, count: usize) -> Option<Vec<f64>> {
    linear_grid(start_exponent, end_exponent, count)
        .map(|exponents| exponents.into_iter().map(pow10).collect())
}

/// Uniform resampling axis over `[0, 1]` shared by every 2-D channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGrid {
    points: Vec<f64>,
}

impl TargetGrid {
    pub const MIN_POINTS: usize = 3;

    pub fn new(count: usize) -> Option<Self> {
        if count < Self::MIN_POINTS {
            return None;
        }
        linear_grid(0.0, 1.0, count).map(|points| Self { points })
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

    /// Points after the leading zero.
    pub fn interior(&self) -> &[f64] {
        &self.points[1..]
    }

    /// `log10` of every point after the leading zero.
    pub fn log10_interior(&self) -> Vec<f64> {
        self.interior().iter().map(|point| point.log10()).collect()
    }

    pub fn zeros(&self) -> Vec<f64> {
        vec![0.0; self.points.len()]
    }
}

impl Default for TargetGrid {
    fn default() -> Self {
        Self {
            points: linear_grid(0.0, 1.0, DEFAULT_GRID_POINTS).unwrap_or_default(),
        }
    }
}

/// Piecewise-linear interpolation on a non-decreasing grid. Queries outside
/// the grid return the boundary value.
pub fn interpolate_linear(x: f64, x_grid: &[f64], y_grid: &[f64]) -> Option<f64> {
    if x_grid.len() < 2 || x_grid.len() != y_grid.len() {
        return None;
    }

    if !x_grid.windows(2).all(|window| window[0] <= window[1]) {
        return None;
    }

    let last_index = x_grid.len() - 1;
    if x.is_nan() {
        return Some(f64::NAN);
    }
    if x < x_grid[0] {
        return Some(y_grid[0]);
    }
    if x >= x_grid[last_index] {
        return Some(y_grid[last_index]);
    }

    let lower = x_grid.partition_point(|knot| *knot <= x) - 1;
    let upper = lower + 1;
    let x0 = x_grid[lower];
    let x1 = x_grid[upper];
    if x1 == x0 {
        return Some(y_grid[upper]);
    }

    let slope = (y_grid[upper] - y_grid[lower]) / (x1 - x0);
    Some(slope * (x - x0) + y_grid[lower])
}

/// Vector form of [`interpolate_linear`]. A strictly decreasing grid is
/// reversed together with its values before interpolation.
pub fn interpolate_many(queries: &[f64], x_grid: &[f64], y_grid: &[f64]) -> Option<Vec<f64>> {
    if x_grid.len() != y_grid.len() {
        return None;
    }

    let descending = x_grid.len() >= 2 && x_grid.windows(2).all(|window| window[0] > window[1]);
    let (x_sorted, y_sorted): (Vec<f64>, Vec<f64>) = if descending {
        (
            x_grid.iter().rev().copied().collect(),
            y_grid.iter().rev().copied().collect(),
        )
    } else {
        (x_grid.to_vec(), y_grid.to_vec())
    };

    queries
        .iter()
        .map(|query| interpolate_linear(*query, &x_sorted, &y_sorted))
        .collect()
}

/// Interpolates `queries` against `x_known`, or against `log10(x_known)`
/// when `log_space` is set.
pub fn interpolate_1d(
    queries: &[f64],
    x_known: &[f64],
    y_known: &[f64],
    log_space: bool,
) -> Option<Vec<f64>> {
    if log_space {
        let log_known: Vec<f64> = x_known.iter().map(|value| value.log10()).collect();
        interpolate_many(queries, &log_known, y_known)
    } else {
        interpolate_many(queries, x_known, y_known)
    }
}

pub fn pow10(exponent: f64) -> f64 {
    10_f64.powf(exponent)
}

pub fn ev_to_mev(energy_ev: f64) -> f64 {
    energy_ev * EV_TO_MEV
}

/// Positron speed in cm/s from its kinetic energy in eV.
pub fn positron_velocity(energy_ev: f64) -> f64 {
    let gamma = (ELECTRON_REST_ENERGY_EV + energy_ev) / ELECTRON_REST_ENERGY_EV;
    SPEED_OF_LIGHT_CM_S * (1.0 - (1.0 / gamma).powi(2)).sqrt()
}
