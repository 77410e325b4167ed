//! Switches for the engine's lifecycle logging.

use serde::{Deserialize, Serialize};

/// Selects which lifecycle events the engine emits through `tracing`.
///
/// Entry, exit, transition and action events are logged at `debug`, the
/// per-tick `on_do` and `on_late_do` passes at `trace`. Everything is off
/// by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub log_entries: bool,
    pub log_dos: bool,
    pub log_late_dos: bool,
    pub log_exits: bool,
    pub log_transitions: bool,
    pub log_transition_actions: bool,
}

impl TraceConfig {
    /// Log every lifecycle event.
    pub fn verbose() -> Self {
        Self {
            log_entries: true,
            log_dos: true,
            log_late_dos: true,
            log_exits: true,
            log_transitions: true,
            log_transition_actions: true,
        }
    }

    /// Log mode changes only: entries, exits and transitions.
    pub fn transitions_only() -> Self {
        Self {
            log_entries: true,
            log_exits: true,
            log_transitions: true,
            ..Self::default()
        }
    }
}
