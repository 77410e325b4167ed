//! Shared mutable context passed to every state callback.

use super::timer::{Timer, TimerKey};
use std::marker::PhantomData;

/// Per-tick context: the current `dt` and the machine's timers.
///
/// One timer per [`TimerKey::ALL`] entry is allocated when the context is
/// created. Timers live as long as the machine; leaving a state never
/// destroys them, only an explicit reset re-arms them.
#[derive(Clone, Debug)]
pub struct Context<K: TimerKey> {
    dt: f32,
    timers: Vec<Timer>,
    _keys: PhantomData<K>,
}

impl<K: TimerKey> Context<K> {
    pub fn new() -> Self {
        debug_assert!(
            K::ALL.iter().enumerate().all(|(i, key)| key.index() == i),
            "TimerKey::index must match the key's position in TimerKey::ALL"
        );

        Self {
            dt: 0.0,
            timers: vec![Timer::default(); K::ALL.len()],
            _keys: PhantomData,
        }
    }

    /// Duration of the current tick in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn timer(&self, key: K) -> &Timer {
        &self.timers[key.index()]
    }

    pub fn timer_mut(&mut self, key: K) -> &mut Timer {
        &mut self.timers[key.index()]
    }

    /// Iterate over every timer together with its key.
    pub fn timers(&self) -> impl Iterator<Item = (K, &Timer)> + '_ {
        K::ALL.iter().copied().zip(self.timers.iter())
    }

    pub(crate) fn configure(&mut self, key: K, duration: f32) {
        self.timers[key.index()] = Timer::new(duration);
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.dt = dt;
        for timer in &mut self.timers {
            timer.step(dt);
        }
    }
}

impl<K: TimerKey> Default for Context<K> {
    fn default() -> Self {
        Self::new()
    }
}
