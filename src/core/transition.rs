//! Transition descriptors: guard, target and action as plain data.

use super::context::Context;
use super::guard::{Guard, Predicate};
use super::state::State;

/// Action run between the exit and entry sequences of a transition.
pub type Action<S> = fn(&mut <S as State>::Data, &mut Context<<S as State>::Timer>);

/// A transition from the active leaf to a target state.
///
/// Transitions are built with `const fn` constructors, so a state's table
/// can be a `const` slice:
///
/// ```rust
/// use vehicle_supervisor::core::{Context, NoTimers, State, Transition};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl State for Door {
///     type Data = u32;
///     type Timer = NoTimers;
///
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
/// }
///
/// fn pushed(count: &u32, _ctx: &Context<NoTimers>) -> bool {
///     *count > 0
/// }
///
/// fn consume_push(count: &mut u32, _ctx: &mut Context<NoTimers>) {
///     *count -= 1;
/// }
///
/// const FROM_CLOSED: &[Transition<Door>] =
///     &[Transition::when(Door::Open, pushed).with_action(consume_push)];
///
/// let ctx = Context::new();
/// assert!(FROM_CLOSED[0].is_enabled(&1, &ctx));
/// assert_eq!(FROM_CLOSED[0].target(), Door::Open);
/// ```
pub struct Transition<S: State> {
    to: S,
    guard: Option<Guard<S>>,
    action: Option<Action<S>>,
}

impl<S: State> Transition<S> {
    /// Unconditional transition to `to`.
    pub const fn always(to: S) -> Self {
        Self {
            to,
            guard: None,
            action: None,
        }
    }

    /// Transition to `to` that fires when `predicate` holds.
    pub const fn when(to: S, predicate: Predicate<S>) -> Self {
        Self {
            to,
            guard: Some(Guard::new(predicate)),
            action: None,
        }
    }

    /// Attach an action run after the exit sequence and before the entry
    /// sequence.
    pub const fn with_action(mut self, action: Action<S>) -> Self {
        self.action = Some(action);
        self
    }

    /// The state this transition leads to, before entry-child resolution.
    pub fn target(&self) -> S {
        self.to
    }

    /// Check whether the transition can fire (pure).
    pub fn is_enabled(&self, data: &S::Data, ctx: &Context<S::Timer>) -> bool {
        self.guard.as_ref().is_none_or(|g| g.check(data, ctx))
    }

    pub(crate) fn run_action(&self, data: &mut S::Data, ctx: &mut Context<S::Timer>) {
        if let Some(action) = self.action {
            action(data, ctx);
        }
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }
}

impl<S: State> Clone for Transition<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: State> Copy for Transition<S> {}
