//! Driving-mode hierarchy and its transition tables.

use crate::core::{Context, State, TimerKey, Transition};
use crate::vehicle::data::VehicleData;
use crate::vehicle::signals::VehicleControl;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Timers used by the driving-mode graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleTimer {
    /// Grace period before an inattentive driver triggers pull-over preparation
    Inattention,
}

impl TimerKey for VehicleTimer {
    const ALL: &'static [Self] = &[Self::Inattention];

    fn index(self) -> usize {
        self as usize
    }
}

/// Driving modes.
///
/// ```text
/// Vehicle [ManualDriving]
/// ├── ManualDriving
/// ├── LaneKeeping [DriverAttentive]
/// │   ├── DriverAttentive
/// │   ├── DriverInattentive
/// │   └── PullOverPreparation
/// ├── PullingOver
/// └── Stopped
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleState {
    Vehicle,
    ManualDriving,
    LaneKeeping,
    DriverAttentive,
    DriverInattentive,
    PullOverPreparation,
    PullingOver,
    Stopped,
}

type Ctx = Context<VehicleTimer>;

fn toggle_requested(data: &VehicleData, _ctx: &Ctx) -> bool {
    data.lane_keeping_toggle_requested
}

fn takeover_requested(data: &VehicleData, _ctx: &Ctx) -> bool {
    data.manual_takeover_requested
}

fn driver_inattentive(data: &VehicleData, _ctx: &Ctx) -> bool {
    data.attention.is_inattentive()
}

fn driver_attentive(data: &VehicleData, _ctx: &Ctx) -> bool {
    !data.attention.is_inattentive()
}

fn inattention_elapsed(_data: &VehicleData, ctx: &Ctx) -> bool {
    ctx.timer(VehicleTimer::Inattention).is_elapsed()
}

fn pullover_safe(data: &VehicleData, _ctx: &Ctx) -> bool {
    data.pullover.is_pullover_safe()
}

fn vehicle_stopped(data: &VehicleData, _ctx: &Ctx) -> bool {
    data.speed <= data.config.stop_speed
}

fn clear_toggle(data: &mut VehicleData, _ctx: &mut Ctx) {
    data.lane_keeping_toggle_requested = false;
}

fn clear_takeover(data: &mut VehicleData, _ctx: &mut Ctx) {
    data.manual_takeover_requested = false;
}

const LEAVE_LANE_KEEPING: Transition<VehicleState> =
    Transition::when(VehicleState::ManualDriving, toggle_requested).with_action(clear_toggle);

const TAKE_OVER: Transition<VehicleState> =
    Transition::when(VehicleState::ManualDriving, takeover_requested).with_action(clear_takeover);

const MANUAL_DRIVING: &[Transition<VehicleState>] = &[Transition::when(
    VehicleState::LaneKeeping,
    toggle_requested,
)
.with_action(clear_toggle)];

const DRIVER_ATTENTIVE: &[Transition<VehicleState>] = &[
    LEAVE_LANE_KEEPING,
    Transition::when(VehicleState::DriverInattentive, driver_inattentive),
];

const DRIVER_INATTENTIVE: &[Transition<VehicleState>] = &[
    LEAVE_LANE_KEEPING,
    Transition::when(VehicleState::DriverAttentive, driver_attentive),
    Transition::when(VehicleState::PullOverPreparation, inattention_elapsed),
];

const PULL_OVER_PREPARATION: &[Transition<VehicleState>] = &[
    LEAVE_LANE_KEEPING,
    Transition::when(VehicleState::PullingOver, pullover_safe),
];

const PULLING_OVER: &[Transition<VehicleState>] = &[
    TAKE_OVER,
    Transition::when(VehicleState::Stopped, vehicle_stopped),
];

const STOPPED: &[Transition<VehicleState>] = &[TAKE_OVER];

impl State for VehicleState {
    type Data = VehicleData;
    type Timer = VehicleTimer;

    fn name(&self) -> &'static str {
        match self {
            Self::Vehicle => "Vehicle",
            Self::ManualDriving => "ManualDriving",
            Self::LaneKeeping => "LaneKeeping",
            Self::DriverAttentive => "DriverAttentive",
            Self::DriverInattentive => "DriverInattentive",
            Self::PullOverPreparation => "PullOverPreparation",
            Self::PullingOver => "PullingOver",
            Self::Stopped => "Stopped",
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            Self::Vehicle => None,
            Self::ManualDriving | Self::LaneKeeping | Self::PullingOver | Self::Stopped => {
                Some(Self::Vehicle)
            }
            Self::DriverAttentive | Self::DriverInattentive | Self::PullOverPreparation => {
                Some(Self::LaneKeeping)
            }
        }
    }

    fn entry_child(&self) -> Option<Self> {
        match self {
            Self::Vehicle => Some(Self::ManualDriving),
            Self::LaneKeeping => Some(Self::DriverAttentive),
            _ => None,
        }
    }

    fn transitions(&self) -> &'static [Transition<Self>] {
        match self {
            Self::ManualDriving => MANUAL_DRIVING,
            Self::DriverAttentive => DRIVER_ATTENTIVE,
            Self::DriverInattentive => DRIVER_INATTENTIVE,
            Self::PullOverPreparation => PULL_OVER_PREPARATION,
            Self::PullingOver => PULLING_OVER,
            Self::Stopped => STOPPED,
            Self::Vehicle | Self::LaneKeeping => &[],
        }
    }

    fn on_entry(&self, data: &mut VehicleData, ctx: &mut Ctx) {
        if let Self::DriverInattentive = self {
            ctx.timer_mut(VehicleTimer::Inattention)
                .reset_to(data.config.inattention_timeout);
        }
    }

    fn on_do(&self, data: &mut VehicleData, _ctx: &mut Ctx) {
        match self {
            Self::Vehicle => {
                data.speed = data.actuator.velocity().norm();
                data.control = VehicleControl::default();
            }
            Self::ManualDriving => data.control = data.driver_input,
            Self::LaneKeeping => data.control = data.assist_command,
            Self::PullingOver => {
                data.control = VehicleControl {
                    throttle: 0.0,
                    steer: data.assist_command.steer,
                    brake: data.config.pullover_brake,
                    hand_brake: false,
                };
            }
            Self::Stopped => data.control = VehicleControl::hold(),
            _ => {}
        }
    }

    fn on_late_do(&self, data: &mut VehicleData, _ctx: &mut Ctx) {
        if let Self::Vehicle = self {
            if data.config.log_vehicle_controls {
                info!(
                    throttle = data.control.throttle,
                    steer = data.control.steer,
                    brake = data.control.brake,
                    hand_brake = data.control.hand_brake,
                    speed = data.speed,
                    "applying vehicle control"
                );
            }
            data.actuator.apply_control(&data.control);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateGraph;

    #[test]
    fn hierarchy_is_well_formed() {
        let graph = StateGraph::explore(VehicleState::Vehicle).unwrap();

        assert_eq!(graph.root(), VehicleState::Vehicle);
        assert_eq!(graph.leaf_of(VehicleState::Vehicle), VehicleState::ManualDriving);
        assert_eq!(
            graph.leaf_of(VehicleState::LaneKeeping),
            VehicleState::DriverAttentive
        );
        for state in [
            VehicleState::ManualDriving,
            VehicleState::DriverInattentive,
            VehicleState::PullOverPreparation,
            VehicleState::PullingOver,
            VehicleState::Stopped,
        ] {
            assert!(graph.contains(state), "{} not reachable", state.name());
            assert!(state.is_leaf());
        }
    }

    #[test]
    fn lane_keeping_children_share_lane_keeping_ancestor() {
        let graph = StateGraph::explore(VehicleState::Vehicle).unwrap();

        assert_eq!(
            graph.lowest_common_ancestor(
                VehicleState::DriverAttentive,
                VehicleState::DriverInattentive
            ),
            Some(VehicleState::LaneKeeping)
        );
        assert_eq!(
            graph.lowest_common_ancestor(
                VehicleState::PullOverPreparation,
                VehicleState::PullingOver
            ),
            Some(VehicleState::Vehicle)
        );
    }

    #[test]
    fn every_exit_from_lane_keeping_clears_the_toggle() {
        for state in [
            VehicleState::DriverAttentive,
            VehicleState::DriverInattentive,
            VehicleState::PullOverPreparation,
        ] {
            let first = state.transitions()[0];
            assert_eq!(first.target(), VehicleState::ManualDriving);
            assert!(first.has_action());
        }
    }

    #[test]
    fn timer_keys_are_indexed_in_order() {
        for (i, key) in VehicleTimer::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }
}
