//! Axis length to equilibrium radius for cells in mitosis.
//!
//! A mitotic cell is two overlapping disks of radius `r` fused along its axis.
//! The deformation angle `theta` relates to the axis length through
//!
//! ```text
//! L(theta) = sqrt(2π) · 2 · (1 + cos(theta/2)) / sqrt(sin(theta) − theta + 2π)
//! ```
//!
//! which decreases from 4 at `theta = 0` (two touching unit disks) to `2√2` at
//! `theta = π` (a single disk of radius √2). The radius is then
//! `L / (2 + 2·cos(theta/2))`.
//!
//! Inverting `L(theta)` is done with two tables built once up front: a dense
//! forward table over `theta` searched by bisection, and a fast table mapping
//! hashed axis lengths straight to `theta`.

use cellpop_common::{MAX_AXIS_LENGTH, MIN_MITOTIC_AXIS_LENGTH};
use std::f64::consts::PI;
use thiserror::Error;

/// Table entries per unit of `theta` and of axis length.
pub const RESOLUTION: f64 = 10_000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("axis length {axis_length} is below the minimum mitotic axis length {minimum}")]
    BelowMitoticThreshold { axis_length: f64, minimum: f64 },
}

/// Axis length implied by a deformation angle.
pub fn axis_length_for_theta(theta: f64) -> f64 {
    let num = (2.0 * PI).sqrt() * 2.0 * (1.0 + (theta / 2.0).cos());
    let denom = (theta.sin() - theta + 2.0 * PI).sqrt();
    num / denom
}

/// Radius of a mitotic cell with the given axis length and deformation angle.
pub fn radius_for(axis_length: f64, theta: f64) -> f64 {
    axis_length / (2.0 + 2.0 * (theta / 2.0).cos())
}

#[derive(Debug, Clone)]
pub struct DeformationSolver {
    /// `L(i / RESOLUTION)` for theta in [0, π], sorted high to low.
    slow: Vec<f64>,
    /// `theta` for axis length `MIN_MITOTIC_AXIS_LENGTH + i / RESOLUTION`.
    fast: Vec<f64>,
}

impl DeformationSolver {
    /// Builds both tables. This is the expensive part; do it once.
    pub fn new() -> Self {
        let slow_len = (PI * RESOLUTION).floor() as usize + 1;
        let slow: Vec<f64> = (0..slow_len)
            .map(|i| axis_length_for_theta(i as f64 / RESOLUTION))
            .collect();

        let mut solver = Self { slow, fast: Vec::new() };

        let fast_len = ((MAX_AXIS_LENGTH - MIN_MITOTIC_AXIS_LENGTH) * RESOLUTION).ceil() as usize + 1;
        let fast: Vec<f64> = (0..fast_len)
            .map(|i| solver.theta_slow(MIN_MITOTIC_AXIS_LENGTH + i as f64 / RESOLUTION))
            .collect();
        solver.fast = fast;

        log::debug!(
            "Deformation solver built: {} forward samples, {} fast entries.",
            solver.slow.len(),
            solver.fast.len()
        );
        solver
    }

    /// Bisection over the forward table; returns the `theta` of the entry
    /// whose axis length is closest to `axis_length`.
    pub fn theta_slow(&self, axis_length: f64) -> f64 {
        // First index whose value drops below the query.
        let split = self.slow.partition_point(|&v| v >= axis_length);
        let last = self.slow.len() - 1;
        let (imin, imax) = match split {
            0 => (0, 1.min(last)),
            s if s > last => (last.saturating_sub(1), last),
            s => (s - 1, s),
        };
        if axis_length - self.slow[imax] < self.slow[imin] - axis_length {
            imin as f64 / RESOLUTION
        } else {
            imax as f64 / RESOLUTION
        }
    }

    /// Constant-time `theta` lookup through the fast table.
    pub fn theta(&self, axis_length: f64) -> Result<f64, SolverError> {
        Ok(self.fast[self.hash_axis_length(axis_length)?])
    }

    /// Equilibrium radius for a mitotic axis length.
    pub fn radius(&self, axis_length: f64) -> Result<f64, SolverError> {
        let theta = self.theta(axis_length)?;
        Ok(radius_for(axis_length, theta))
    }

    fn hash_axis_length(&self, axis_length: f64) -> Result<usize, SolverError> {
        // Negated comparison so NaN is rejected too.
        if !(axis_length >= MIN_MITOTIC_AXIS_LENGTH) {
            return Err(SolverError::BelowMitoticThreshold {
                axis_length,
                minimum: MIN_MITOTIC_AXIS_LENGTH,
            });
        }
        let i = ((axis_length - MIN_MITOTIC_AXIS_LENGTH) * RESOLUTION).floor() as usize;
        Ok(i.min(self.fast.len() - 1))
    }
}

impl Default for DeformationSolver {
    fn default() -> Self {
        Self::new()
    }
}
