//! State transition history tracking.
//!
//! Every transition fired by a machine is recorded with the tick it fired
//! on and a wall-clock timestamp, giving a persistable trace of mode
//! changes.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single fired transition between two leaf states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// The leaf that was active before the transition
    pub from: S,
    /// The leaf that became active
    pub to: S,
    /// Machine tick on which the transition fired, starting at 1
    pub tick: u64,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of fired transitions.
///
/// The `record` method is immutable and returns a new history with the
/// transition added. A history created with [`bounded`](Self::bounded)
/// keeps only the most recent records, dropping the oldest first.
///
/// # Example
///
/// ```rust
/// use vehicle_supervisor::core::{NoTimers, State, StateHistory, TransitionRecord};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Mode {
///     Manual,
///     Assisted,
/// }
///
/// impl State for Mode {
///     type Data = ();
///     type Timer = NoTimers;
///
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Manual => "Manual",
///             Self::Assisted => "Assisted",
///         }
///     }
/// }
///
/// let history = StateHistory::new().record(TransitionRecord {
///     from: Mode::Manual,
///     to: Mode::Assisted,
///     tick: 3,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec![&Mode::Manual, &Mode::Assisted]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<TransitionRecord<S>>,
    #[serde(default)]
    limit: Option<usize>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: None,
        }
    }

    /// History that retains at most `limit` records.
    pub fn bounded(limit: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(limit.min(1024)),
            limit: Some(limit),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: TransitionRecord<S>) -> Self {
        let mut history = self.clone();
        history.push(transition);
        history
    }

    /// Append a transition in place, evicting the oldest records past the
    /// limit.
    pub(crate) fn push(&mut self, transition: TransitionRecord<S>) {
        self.transitions.push_back(transition);
        if let Some(limit) = self.limit {
            while self.transitions.len() > limit {
                self.transitions.pop_front();
            }
        }
    }

    /// Maximum number of retained records, `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Get the path of leaves traversed.
    ///
    /// Returns the source of the first retained transition followed by the
    /// target of every retained transition, or an empty path when nothing
    /// fired.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Wall-clock time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Retained records, oldest first.
    pub fn transitions(&self) -> &VecDeque<TransitionRecord<S>> {
        &self.transitions
    }

    pub fn last(&self) -> Option<&TransitionRecord<S>> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
