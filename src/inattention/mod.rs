//! Driver inattention detection.
//!
//! A dedicated worker thread owns the camera and the eye-state classifier.
//! The control loop triggers detections through a capacity-1 queue and
//! reads the latest completed result from a cache, so it never waits on
//! camera I/O or inference.

mod camera;
mod classifier;
mod detector;

pub use camera::{BlankCamera, CameraSource};
pub use classifier::{ClassifierError, EyeDetection, EyeStateClassifier};
pub use detector::{DetectorError, InattentionDetector};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Detector settings.
///
/// The defaults are starting points, not tuned values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InattentionConfig {
    /// Detection threshold passed to the classifier factory of
    /// [`InattentionDetector::spawn_with`]
    pub eye_threshold: f32,
    /// Classifier label meaning "eyes open"
    pub eyes_open_label: u32,
    /// How often the idle worker checks for shutdown
    pub poll_interval_ms: u64,
    /// How long `close` waits for the worker before detaching it
    pub join_timeout_ms: u64,
}

impl InattentionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

impl Default for InattentionConfig {
    fn default() -> Self {
        Self {
            eye_threshold: 0.15,
            eyes_open_label: 1,
            poll_interval_ms: 100,
            join_timeout_ms: 1000,
        }
    }
}
