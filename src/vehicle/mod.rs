//! Driving-mode state graph built on the hierarchical engine.
//!
//! The root `Vehicle` state samples the speed at the start of each tick and
//! applies the control output at the end of it; the active leaf decides what
//! that output is. Attentiveness and pull-over safety are read through
//! [`AttentionMonitor`] and [`PulloverAssessor`], so the graph runs the same
//! against the real detectors or against test doubles.

mod data;
mod signals;
mod state;

pub use data::{VehicleConfig, VehicleData};
pub use signals::{AttentionMonitor, PulloverAssessor, VehicleActuator, VehicleControl};
pub use state::{VehicleState, VehicleTimer};

use crate::builder::{BuildError, StateMachineBuilder};
use crate::machine::{HierarchicalStateMachine, TraceConfig};

/// Build the driving-mode machine, starting in manual driving.
pub fn vehicle_state_machine(
    data: VehicleData,
    trace: TraceConfig,
) -> Result<HierarchicalStateMachine<VehicleState>, BuildError> {
    let timeout = data.config.inattention_timeout;
    StateMachineBuilder::new()
        .initial(VehicleState::Vehicle)
        .timer(VehicleTimer::Inattention, timeout)
        .data(data)
        .trace(trace)
        .build()
}
