//! Supervisor configuration.
//!
//! All tunables live in one [`SupervisorConfig`] that loads from JSON. Missing
//! sections and fields fall back to their defaults. Validation uses
//! `Validation` to report ALL violations at once instead of stopping at the
//! first one.
//!
//! # Example
//!
//! ```rust
//! use vehicle_supervisor::config::{ConfigError, SupervisorConfig};
//!
//! let config = SupervisorConfig::from_json(r#"{ "vehicle": { "inattention_timeout": 3.0 } }"#)
//!     .unwrap();
//! assert_eq!(config.vehicle.inattention_timeout, 3.0);
//! assert_eq!(config.pullover.min_inliers, 20);
//!
//! let invalid = SupervisorConfig::from_json(
//!     r#"{ "pullover": { "min_inlier_ratio": 1.5, "ransac_max_trials": 0 } }"#,
//! );
//! match invalid {
//!     Err(ConfigError::Invalid { violations }) => assert_eq!(violations.len(), 2),
//!     _ => panic!("expected validation failure"),
//! }
//! ```

mod error;
mod rules;

pub use error::{ConfigError, ConfigViolation};

use crate::inattention::InattentionConfig;
use crate::machine::TraceConfig;
use crate::pullover::PulloverConfig;
use crate::vehicle::VehicleConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Every tunable of the supervisor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub vehicle: VehicleConfig,
    pub inattention: InattentionConfig,
    pub pullover: PulloverConfig,
    pub trace: TraceConfig,
}

impl SupervisorConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field, accumulating all violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let checks = vec![
            rules::non_negative("vehicle.inattention_timeout", self.vehicle.inattention_timeout),
            rules::unit_range("vehicle.pullover_brake", self.vehicle.pullover_brake),
            rules::non_negative("vehicle.stop_speed", self.vehicle.stop_speed),
            rules::unit_range("inattention.eye_threshold", self.inattention.eye_threshold),
            rules::at_least(
                "inattention.poll_interval_ms",
                self.inattention.poll_interval_ms,
                1,
            ),
            rules::at_least(
                "inattention.join_timeout_ms",
                self.inattention.join_timeout_ms,
                1,
            ),
            rules::positive(
                "pullover.inlier_dist_thresh",
                self.pullover.inlier_dist_thresh,
            ),
            rules::unit_range("pullover.min_inlier_ratio", self.pullover.min_inlier_ratio),
            // a plane needs three points
            rules::at_least("pullover.min_inliers", self.pullover.min_inliers as u64, 3),
            rules::at_least(
                "pullover.ransac_max_trials",
                self.pullover.ransac_max_trials as u64,
                1,
            ),
        ];

        Validation::all_vec(checks).map(|_| ())
    }

    /// Return the configuration if it is valid.
    pub fn validated(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(errors) => Err(ConfigError::Invalid {
                violations: errors.iter().cloned().collect(),
            }),
        }
    }
}
