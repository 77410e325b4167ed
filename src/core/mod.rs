//! Core hierarchical state machine types.
//!
//! This module contains the building blocks the engine is made of:
//! - State descriptors via the `State` trait
//! - Guards and transitions as plain, `const`-constructible data
//! - Timers and the per-tick `Context`
//! - The validated `StateGraph` (ancestry, leaf resolution, LCA)
//! - Transition history
//!
//! Nothing in this module performs I/O.

mod context;
mod graph;
mod guard;
mod history;
mod state;
mod timer;
mod transition;

pub use context::Context;
pub use graph::{GraphError, StateGraph};
pub use guard::{Guard, Predicate};
pub use history::{StateHistory, TransitionRecord};
pub use state::State;
pub use timer::{NoTimers, Timer, TimerKey};
pub use transition::{Action, Transition};
