//! Core State trait for hierarchical state machine states.
//!
//! A state is a stateless template: it describes where it sits in the
//! hierarchy, which transitions leave it, and what happens on entry, every
//! tick and on exit. All mutable payload lives in the machine's data value.

use super::context::Context;
use super::timer::TimerKey;
use super::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for hierarchical state machine states.
///
/// States are identified by kind, not by instance. Implementations are
/// fieldless enums so that `Eq` and `Hash` compare variants only, and two
/// descriptors of the same kind are interchangeable everywhere in the
/// engine.
///
/// The hierarchy is declared statically: [`parent`](State::parent) maps a
/// state to the state that contains it, and [`entry_child`](State::entry_child)
/// names the child that becomes active when a composite state is targeted.
/// A state without an entry child is a leaf.
///
/// # Required Traits
///
/// - `Copy + Eq + Hash`: kind identity, used for ancestor-path membership
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states appear in persisted transition history
///
/// # Example
///
/// ```rust
/// use vehicle_supervisor::core::{Context, NoTimers, State, Transition};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Lamp {
///     Powered,
///     On,
///     Off,
/// }
///
/// fn switch_pressed(pressed: &bool, _ctx: &Context<NoTimers>) -> bool {
///     *pressed
/// }
///
/// const ON: &[Transition<Lamp>] = &[Transition::when(Lamp::Off, switch_pressed)];
/// const OFF: &[Transition<Lamp>] = &[Transition::when(Lamp::On, switch_pressed)];
///
/// impl State for Lamp {
///     type Data = bool;
///     type Timer = NoTimers;
///
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Powered => "Powered",
///             Self::On => "On",
///             Self::Off => "Off",
///         }
///     }
///
///     fn parent(&self) -> Option<Self> {
///         match self {
///             Self::Powered => None,
///             Self::On | Self::Off => Some(Self::Powered),
///         }
///     }
///
///     fn entry_child(&self) -> Option<Self> {
///         match self {
///             Self::Powered => Some(Self::Off),
///             _ => None,
///         }
///     }
///
///     fn transitions(&self) -> &'static [Transition<Self>] {
///         match self {
///             Self::On => ON,
///             Self::Off => OFF,
///             Self::Powered => &[],
///         }
///     }
/// }
///
/// assert!(Lamp::On.is_leaf());
/// assert!(!Lamp::Powered.is_leaf());
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Payload threaded through every callback.
    type Data: 'static;

    /// Timer identifiers available through the [`Context`].
    type Timer: TimerKey;

    /// Get the state's name for display/logging.
    fn name(&self) -> &'static str;

    /// The state containing this one, `None` for the root.
    fn parent(&self) -> Option<Self> {
        None
    }

    /// The child entered when this state is the target of a transition.
    fn entry_child(&self) -> Option<Self> {
        None
    }

    /// Outgoing transitions, evaluated in order; the first enabled one fires.
    ///
    /// Only the active leaf's table is consulted, so transitions shared by
    /// all children of a composite state are listed on each child.
    fn transitions(&self) -> &'static [Transition<Self>] {
        &[]
    }

    fn on_entry(&self, _data: &mut Self::Data, _ctx: &mut Context<Self::Timer>) {}

    /// Called every tick on the active leaf and each of its ancestors,
    /// outermost first.
    fn on_do(&self, _data: &mut Self::Data, _ctx: &mut Context<Self::Timer>) {}

    /// Called every tick after the `on_do` pass, innermost first.
    fn on_late_do(&self, _data: &mut Self::Data, _ctx: &mut Context<Self::Timer>) {}

    fn on_exit(&self, _data: &mut Self::Data, _ctx: &mut Context<Self::Timer>) {}

    /// Check if this state can be active at rest.
    fn is_leaf(&self) -> bool {
        self.entry_child().is_none()
    }
}
