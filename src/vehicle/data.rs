//! Payload threaded through the driving-mode callbacks.

use crate::vehicle::signals::{AttentionMonitor, PulloverAssessor, VehicleActuator, VehicleControl};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Tunables of the driving-mode graph.
///
/// The defaults are starting points for simulation, not validated values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Seconds the driver may stay inattentive before pull-over preparation
    pub inattention_timeout: f32,
    /// Brake applied while pulling over
    pub pullover_brake: f32,
    /// Speed in m/s at or below which a pulling-over vehicle counts as stopped
    pub stop_speed: f32,
    /// Log the control output every time it is applied
    pub log_vehicle_controls: bool,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            inattention_timeout: 5.0,
            pullover_brake: 0.3,
            stop_speed: 0.1,
            log_vehicle_controls: false,
        }
    }
}

/// Everything the vehicle states read and write.
///
/// Requests and commands are injected by the caller between ticks through
/// [`HierarchicalStateMachine::data_mut`](crate::machine::HierarchicalStateMachine::data_mut).
pub struct VehicleData {
    pub config: VehicleConfig,
    /// Speed sampled at the start of the current tick, in m/s
    pub speed: f32,
    /// Output written by the active states and applied at the end of the tick
    pub control: VehicleControl,
    /// What the human driver is doing
    pub driver_input: VehicleControl,
    /// Output of the external lane-keeping controller
    pub assist_command: VehicleControl,
    pub lane_keeping_toggle_requested: bool,
    pub manual_takeover_requested: bool,
    pub attention: Arc<dyn AttentionMonitor>,
    pub pullover: Arc<dyn PulloverAssessor>,
    pub actuator: Box<dyn VehicleActuator>,
}

impl VehicleData {
    pub fn new(
        config: VehicleConfig,
        attention: Arc<dyn AttentionMonitor>,
        pullover: Arc<dyn PulloverAssessor>,
        actuator: Box<dyn VehicleActuator>,
    ) -> Self {
        Self {
            config,
            speed: 0.0,
            control: VehicleControl::default(),
            driver_input: VehicleControl::default(),
            assist_command: VehicleControl::default(),
            lane_keeping_toggle_requested: false,
            manual_takeover_requested: false,
            attention,
            pullover,
            actuator,
        }
    }
}

impl fmt::Debug for VehicleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleData")
            .field("config", &self.config)
            .field("speed", &self.speed)
            .field("control", &self.control)
            .field("driver_input", &self.driver_input)
            .field("assist_command", &self.assist_command)
            .field(
                "lane_keeping_toggle_requested",
                &self.lane_keeping_toggle_requested,
            )
            .field("manual_takeover_requested", &self.manual_takeover_requested)
            .finish_non_exhaustive()
    }
}
