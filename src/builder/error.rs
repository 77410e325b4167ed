//! Build errors for the state machine builder.

use crate::core::GraphError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Machine data not specified. Call .data(data) before .build()")]
    MissingData,

    #[error("Timer '{timer}' has invalid duration {duration}. Durations must be finite and non-negative")]
    InvalidTimerDuration { timer: String, duration: f32 },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
