//! Radar sensor contract and a simulated sensor.

use nalgebra::Point3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// One radar return in sensor-local polar coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadarDetection {
    /// Distance in meters
    pub depth: f32,
    /// Horizontal angle in radians
    pub azimuth: f32,
    /// Vertical angle in radians
    pub altitude: f32,
    /// Radial velocity in m/s
    pub velocity: f32,
}

impl RadarDetection {
    /// Cartesian position in the sensor frame.
    pub fn to_point(&self) -> Point3<f32> {
        let (sin_alt, cos_alt) = self.altitude.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        Point3::new(
            self.depth * cos_alt * cos_az,
            self.depth * cos_alt * sin_az,
            self.depth * sin_alt,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("Radar sensor is already stopped")]
    AlreadyStopped,

    #[error("Radar sensor is unavailable: {0}")]
    Unavailable(String),
}

/// Frame callback, invoked on the sensor's delivery thread.
pub type RadarCallback = Arc<dyn Fn(&[RadarDetection]) + Send + Sync>;

/// Subscription interface of a radar sensor.
pub trait RadarSensor: Send {
    /// Deliver every subsequent frame to `callback`.
    fn listen(&mut self, callback: RadarCallback) -> Result<(), SensorError>;

    /// End the subscription.
    fn stop(&mut self) -> Result<(), SensorError>;
}

/// In-process radar whose frames are pushed through a [`RadarFeed`].
pub struct SimulatedRadar {
    subscriber: Arc<Mutex<Option<RadarCallback>>>,
    online: bool,
}

impl SimulatedRadar {
    pub fn new() -> Self {
        Self {
            subscriber: Arc::new(Mutex::new(None)),
            online: true,
        }
    }

    /// A sensor that refuses subscriptions.
    pub fn offline() -> Self {
        Self {
            online: false,
            ..Self::new()
        }
    }

    /// Handle for pushing frames to the current subscriber.
    pub fn feed(&self) -> RadarFeed {
        RadarFeed {
            subscriber: Arc::clone(&self.subscriber),
        }
    }
}

impl Default for SimulatedRadar {
    fn default() -> Self {
        Self::new()
    }
}

impl RadarSensor for SimulatedRadar {
    fn listen(&mut self, callback: RadarCallback) -> Result<(), SensorError> {
        if !self.online {
            return Err(SensorError::Unavailable("simulated radar is offline".to_string()));
        }
        *self.subscriber.lock() = Some(callback);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        match self.subscriber.lock().take() {
            Some(_) => Ok(()),
            None => Err(SensorError::AlreadyStopped),
        }
    }
}

/// Producer side of a [`SimulatedRadar`]. Cheap to clone and safe to move
/// to another thread.
#[derive(Clone)]
pub struct RadarFeed {
    subscriber: Arc<Mutex<Option<RadarCallback>>>,
}

impl RadarFeed {
    /// Push one frame. Returns `false` when nobody is subscribed.
    pub fn deliver(&self, frame: &[RadarDetection]) -> bool {
        let callback = self.subscriber.lock().clone();
        match callback {
            Some(callback) => {
                callback(frame);
                true
            }
            None => false,
        }
    }
}
