//! Builder API for state machine construction.
//!
//! [`StateMachineBuilder`] collects the initial state, the user data, timer
//! durations and logging switches, and validates the hierarchy when the
//! machine is built.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
