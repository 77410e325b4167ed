//! Guard predicates for controlling state transitions.
//!
//! Guards are plain function pointers over the machine's data and context,
//! so transition tables can be declared as constants and tested on their
//! own.

use super::context::Context;
use super::state::State;

/// Signature of a guard predicate.
pub type Predicate<S> = fn(&<S as State>::Data, &Context<<S as State>::Timer>) -> bool;

/// Predicate that determines if a transition can fire.
///
/// # Example
///
/// ```rust
/// use vehicle_supervisor::core::{Context, Guard, NoTimers, State};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Gate {
///     Closed,
/// }
///
/// impl State for Gate {
///     type Data = u32;
///     type Timer = NoTimers;
///
///     fn name(&self) -> &'static str {
///         "Closed"
///     }
/// }
///
/// fn crowded(visitors: &u32, _ctx: &Context<NoTimers>) -> bool {
///     *visitors > 10
/// }
///
/// let guard: Guard<Gate> = Guard::new(crowded);
/// let ctx = Context::new();
///
/// assert!(guard.check(&11, &ctx));
/// assert!(!guard.check(&3, &ctx));
/// ```
pub struct Guard<S: State> {
    predicate: Predicate<S>,
}

impl<S: State> Guard<S> {
    pub const fn new(predicate: Predicate<S>) -> Self {
        Guard { predicate }
    }

    /// Evaluate the predicate against the current data and context.
    pub fn check(&self, data: &S::Data, ctx: &Context<S::Timer>) -> bool {
        (self.predicate)(data, ctx)
    }
}

impl<S: State> Clone for Guard<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: State> Copy for Guard<S> {}
