//! Safe pullover checking from radar returns.
//!
//! The radar's delivery thread overwrites a cached point set; the control
//! loop asks [`SafePulloverChecker::is_pullover_safe`] on demand, which fits
//! a plane to a snapshot of that set outside the lock.

mod checker;
mod radar;
mod ransac;

pub use checker::SafePulloverChecker;
pub use radar::{RadarCallback, RadarDetection, RadarFeed, RadarSensor, SensorError, SimulatedRadar};
pub use ransac::{PlaneFit, PlaneFitter, RansacPlaneFitter};

use serde::{Deserialize, Serialize};

/// Thresholds of the pullover decision.
///
/// The defaults are starting points, not tuned values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulloverConfig {
    /// Maximum point-to-plane distance of an inlier, in meters
    pub inlier_dist_thresh: f32,
    /// Minimum `inliers / points` for a safe decision
    pub min_inlier_ratio: f32,
    /// Minimum point count and inlier count for a safe decision
    pub min_inliers: usize,
    pub ransac_max_trials: usize,
}

impl Default for PulloverConfig {
    fn default() -> Self {
        Self {
            inlier_dist_thresh: 0.3,
            min_inlier_ratio: 0.6,
            min_inliers: 20,
            ransac_max_trials: 400,
        }
    }
}
