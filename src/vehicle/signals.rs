//! Inputs and outputs the driving-mode graph exchanges with the vehicle.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Control output applied to the vehicle once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleControl {
    /// Throttle in `[0, 1]`
    pub throttle: f32,
    /// Steering in `[-1, 1]`
    pub steer: f32,
    /// Brake in `[0, 1]`
    pub brake: f32,
    pub hand_brake: bool,
}

impl VehicleControl {
    /// Full brake with the hand brake engaged.
    pub fn hold() -> Self {
        Self {
            throttle: 0.0,
            steer: 0.0,
            brake: 1.0,
            hand_brake: true,
        }
    }
}

/// Source of the driver's attentiveness.
///
/// Implementations must not block the control tick.
pub trait AttentionMonitor: Send + Sync {
    /// `true` when the driver is currently considered inattentive.
    fn is_inattentive(&self) -> bool;
}

/// Source of the "roadside is clear" decision.
pub trait PulloverAssessor: Send + Sync {
    fn is_pullover_safe(&self) -> bool;
}

/// The vehicle actor being supervised.
pub trait VehicleActuator: Send {
    /// Current velocity in m/s.
    fn velocity(&self) -> Vector3<f32>;

    fn apply_control(&mut self, control: &VehicleControl);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_control_is_neutral() {
        let control = VehicleControl::default();
        assert_eq!(control.throttle, 0.0);
        assert_eq!(control.brake, 0.0);
        assert!(!control.hand_brake);
    }

    #[test]
    fn hold_engages_every_brake() {
        let control = VehicleControl::hold();
        assert_eq!(control.brake, 1.0);
        assert_eq!(control.throttle, 0.0);
        assert!(control.hand_brake);
    }
}
