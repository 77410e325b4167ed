//! Countdown timers advanced once per tick.
//!
//! Timers are addressed through a closed enumeration implementing
//! [`TimerKey`], so every timer a machine can use is known up front and
//! allocated when the machine is constructed.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Remaining-duration countdown measured in seconds.
///
/// A timer is elapsed once its remaining time reaches zero. A default
/// timer has a zero duration and therefore reports elapsed immediately.
///
/// # Example
///
/// ```rust
/// use vehicle_supervisor::core::Timer;
///
/// let mut timer = Timer::default();
/// assert!(timer.is_elapsed());
///
/// timer.reset_to(2.0);
/// timer.step(1.0);
/// assert!(!timer.is_elapsed());
/// timer.step(1.0);
/// assert!(timer.is_elapsed());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    duration: f32,
    remaining: f32,
}

impl Timer {
    /// Create an armed timer with the given configured duration.
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Re-arm the timer with its configured duration.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// Re-arm the timer with an explicit duration.
    ///
    /// The configured duration is left untouched, so a later [`reset`](Self::reset)
    /// falls back to it.
    pub fn reset_to(&mut self, duration: f32) {
        self.remaining = duration;
    }

    /// Advance the countdown. Elapsed timers do not move.
    pub fn step(&mut self, dt: f32) {
        if !self.is_elapsed() {
            self.remaining -= dt;
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

/// Closed set of timer identifiers used by a state machine.
///
/// `ALL` lists every key exactly once and `index` must return the key's
/// position in `ALL`. Fieldless enums satisfy this with `self as usize`.
///
/// # Example
///
/// ```rust
/// use vehicle_supervisor::core::TimerKey;
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum CarTimer {
///     TurnOn,
///     Cooldown,
/// }
///
/// impl TimerKey for CarTimer {
///     const ALL: &'static [Self] = &[Self::TurnOn, Self::Cooldown];
///
///     fn index(self) -> usize {
///         self as usize
///     }
/// }
///
/// assert_eq!(CarTimer::Cooldown.index(), 1);
/// ```
pub trait TimerKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every key, in index order.
    const ALL: &'static [Self];

    /// Position of this key in [`ALL`](Self::ALL).
    fn index(self) -> usize;
}

/// Timer key for machines that use no timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoTimers {}

impl TimerKey for NoTimers {
    const ALL: &'static [Self] = &[];

    fn index(self) -> usize {
        match self {}
    }
}
