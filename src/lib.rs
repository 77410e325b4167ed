//! Vehicle supervisor: a hierarchical state machine for driving modes
//!
//! The crate is built around a synchronous, tick-driven hierarchical state
//! machine. States form a tree declared through the `State` trait; every
//! tick fires at most one transition, exiting up to the lowest common
//! ancestor and entering down to the target leaf, then runs the `on_do`
//! pass over the active path.
//!
//! On top of the engine sit the driving-mode graph and two decision
//! modules that feed it without blocking the tick:
//!
//! - **core**: states, guards, transitions, timers, the validated graph and history
//! - **machine**: the engine and its logging switches
//! - **builder**: fluent construction with timers and trace settings
//! - **vehicle**: manual driving, lane keeping, pull-over and stop modes
//! - **inattention**: background eye-state detection with a cached result
//! - **pullover**: radar point cache and a fail-closed plane-fit decision
//! - **config**: JSON configuration with accumulated validation
//!
//! # Example
//!
//! ```rust
//! use vehicle_supervisor::core::{Context, NoTimers, State, Transition};
//! use vehicle_supervisor::HierarchicalStateMachine;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
//! enum Drive {
//!     Car,
//!     Manual,
//!     Cruising,
//! }
//!
//! fn fast(speed: &f32, _ctx: &Context<NoTimers>) -> bool {
//!     *speed > 50.0
//! }
//!
//! const MANUAL: &[Transition<Drive>] = &[Transition::when(Drive::Cruising, fast)];
//!
//! impl State for Drive {
//!     type Data = f32;
//!     type Timer = NoTimers;
//!
//!     fn name(&self) -> &'static str {
//!         match self {
//!             Self::Car => "Car",
//!             Self::Manual => "Manual",
//!             Self::Cruising => "Cruising",
//!         }
//!     }
//!
//!     fn parent(&self) -> Option<Self> {
//!         match self {
//!             Self::Car => None,
//!             _ => Some(Self::Car),
//!         }
//!     }
//!
//!     fn entry_child(&self) -> Option<Self> {
//!         match self {
//!             Self::Car => Some(Self::Manual),
//!             _ => None,
//!         }
//!     }
//!
//!     fn transitions(&self) -> &'static [Transition<Self>] {
//!         match self {
//!             Self::Manual => MANUAL,
//!             _ => &[],
//!         }
//!     }
//!
//!     fn on_do(&self, speed: &mut f32, ctx: &mut Context<NoTimers>) {
//!         match self {
//!             Self::Manual => *speed += 10.0 * ctx.dt(),
//!             Self::Cruising => *speed += ctx.dt(),
//!             Self::Car => {}
//!         }
//!     }
//! }
//!
//! let mut machine = HierarchicalStateMachine::new(Drive::Car, 10.0).unwrap();
//! assert_eq!(machine.current_state(), Drive::Manual);
//!
//! for _ in 0..6 {
//!     machine.step(1.0);
//! }
//!
//! assert_eq!(machine.current_state(), Drive::Cruising);
//! assert_eq!(*machine.data(), 61.0);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod inattention;
pub mod machine;
pub mod pullover;
pub mod vehicle;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use config::SupervisorConfig;
pub use crate::core::{Context, GraphError, State, StateHistory, Timer, TimerKey, Transition};
pub use inattention::InattentionDetector;
pub use machine::{HierarchicalStateMachine, TraceConfig};
pub use pullover::SafePulloverChecker;
pub use vehicle::{vehicle_state_machine, VehicleState};
