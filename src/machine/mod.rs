//! The hierarchical state machine engine.
//!
//! The engine owns the validated [`StateGraph`](crate::core::StateGraph),
//! the user data, the timer context and the transition history, and runs
//! the lifecycle callbacks in hierarchy order on every tick.

mod engine;
mod trace;

pub use engine::{HierarchicalStateMachine, DEFAULT_HISTORY_LIMIT};
pub use trace::TraceConfig;
