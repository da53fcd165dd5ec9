//! Mortality calibration to a target life expectancy
//!
//! A single multiplier `k` scales the whole hazard curve. Life expectancy is
//! strictly decreasing in `k`, so bisection over the bracket is enough.

use super::life_table::life_expectancy;
use crate::solver::{bisect, Bisection, BisectionConfig};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const MIN_SCALING_FACTOR: f64 = 0.05;
pub const MAX_SCALING_FACTOR: f64 = 5.0;

/// Tolerance and iteration budget for the calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Accepted distance from the target, in years
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_iterations: 50,
        }
    }
}

/// Where the calibrated factor ended up relative to the bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationBound {
    /// Target reached inside the bracket
    Interior,
    /// Target above the best achievable e0; clamped to the lowest factor
    ClampedLow,
    /// Target below the worst achievable e0; clamped to the highest factor
    ClampedHigh,
}

/// Calibrated hazard curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibratedMortality {
    pub scaled_mx: Vec<f64>,
    pub achieved_e0: f64,
    pub scaling_factor: f64,
    pub bound: CalibrationBound,
}

fn scale(mx: &[f64], k: f64) -> Vec<f64> {
    mx.iter().map(|m| m * k).collect()
}

/// Find `k` such that `e0(k * mx)` matches `target_e0`
///
/// Unreachable targets clamp to the nearest bracket bound and report the e0
/// achieved there.
pub fn calibrate_mortality(mx: &[f64], target_e0: f64, config: CalibrationConfig) -> CalibratedMortality {
    let search = BisectionConfig {
        value_tolerance: config.tolerance,
        x_tolerance: 0.0,
        max_iterations: config.max_iterations,
    };

    let outcome = bisect(
        |k| life_expectancy(&scale(mx, k)) - target_e0,
        MIN_SCALING_FACTOR,
        MAX_SCALING_FACTOR,
        search,
    );

    let (scaling_factor, bound) = match outcome {
        Bisection::Root(root) => {
            debug!(
                "Mortality calibrated to e0 {:.2}: k = {:.5} after {} iterations (converged: {})",
                target_e0, root.x, root.iterations, root.converged
            );
            (root.x, CalibrationBound::Interior)
        }
        // e0 at the lowest factor is still short of the target
        Bisection::NoSignChange { f_lo, .. } if f_lo < 0.0 => {
            warn!(
                "Target e0 {:.2} exceeds the reachable maximum {:.2}; clamping k to {}",
                target_e0,
                target_e0 + f_lo,
                MIN_SCALING_FACTOR
            );
            (MIN_SCALING_FACTOR, CalibrationBound::ClampedLow)
        }
        Bisection::NoSignChange { f_hi, .. } => {
            warn!(
                "Target e0 {:.2} is below the reachable minimum {:.2}; clamping k to {}",
                target_e0,
                target_e0 + f_hi,
                MAX_SCALING_FACTOR
            );
            (MAX_SCALING_FACTOR, CalibrationBound::ClampedHigh)
        }
    };

    let scaled_mx = scale(mx, scaling_factor);
    let achieved_e0 = life_expectancy(&scaled_mx);
    CalibratedMortality {
        scaled_mx,
        achieved_e0,
        scaling_factor,
        bound,
    }
}
