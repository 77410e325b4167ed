//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{Context, State, StateHistory};
use crate::machine::{HierarchicalStateMachine, TraceConfig, DEFAULT_HISTORY_LIMIT};

/// Builder for constructing hierarchical state machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use vehicle_supervisor::builder::StateMachineBuilder;
/// use vehicle_supervisor::core::{NoTimers, State};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Lamp {
///     Off,
/// }
///
/// impl State for Lamp {
///     type Data = u32;
///     type Timer = NoTimers;
///
///     fn name(&self) -> &'static str {
///         "Off"
///     }
/// }
///
/// let machine = StateMachineBuilder::new()
///     .initial(Lamp::Off)
///     .data(0)
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.current_state(), Lamp::Off);
/// ```
pub struct StateMachineBuilder<S: State> {
    initial: Option<S>,
    data: Option<S::Data>,
    timers: Vec<(S::Timer, f32)>,
    trace: TraceConfig,
    history_limit: usize,
}

impl<S: State> StateMachineBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            data: None,
            timers: Vec::new(),
            trace: TraceConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Set the initial state (required). Composite states resolve to their
    /// entry leaf.
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the user data (required).
    pub fn data(mut self, data: S::Data) -> Self {
        self.data = Some(data);
        self
    }

    /// Configure and arm a timer before the machine starts.
    pub fn timer(mut self, key: S::Timer, duration: f32) -> Self {
        self.timers.push((key, duration));
        self
    }

    pub fn trace(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }

    /// Keep at most `limit` transition records, dropping the oldest.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the state machine, validating the hierarchy reachable from the
    /// initial state and running the initial entry callbacks.
    pub fn build(self) -> Result<HierarchicalStateMachine<S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let data = self.data.ok_or(BuildError::MissingData)?;

        let mut context = Context::new();
        for (key, duration) in self.timers {
            if !duration.is_finite() || duration < 0.0 {
                return Err(BuildError::InvalidTimerDuration {
                    timer: format!("{key:?}"),
                    duration,
                });
            }
            context.configure(key, duration);
        }

        Ok(HierarchicalStateMachine::start(
            initial,
            data,
            context,
            self.trace,
            StateHistory::bounded(self.history_limit),
        )?)
    }
}

impl<S: State> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GraphError, TimerKey, Transition};
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum TestTimer {
        Warmup,
    }

    impl TimerKey for TestTimer {
        const ALL: &'static [Self] = &[Self::Warmup];

        fn index(self) -> usize {
            self as usize
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Root,
        Idle,
        Running,
        Orphan,
    }

    fn warmed_up(_data: &u32, ctx: &Context<TestTimer>) -> bool {
        ctx.timer(TestTimer::Warmup).is_elapsed()
    }

    const IDLE: &[Transition<TestState>] = &[Transition::when(TestState::Running, warmed_up)];

    impl State for TestState {
        type Data = u32;
        type Timer = TestTimer;

        fn name(&self) -> &'static str {
            match self {
                Self::Root => "Root",
                Self::Idle => "Idle",
                Self::Running => "Running",
                Self::Orphan => "Orphan",
            }
        }

        fn parent(&self) -> Option<Self> {
            match self {
                Self::Idle | Self::Running => Some(Self::Root),
                _ => None,
            }
        }

        fn entry_child(&self) -> Option<Self> {
            match self {
                Self::Root => Some(Self::Idle),
                Self::Orphan => Some(Self::Running),
                _ => None,
            }
        }

        fn transitions(&self) -> &'static [Transition<Self>] {
            match self {
                Self::Idle => IDLE,
                _ => &[],
            }
        }

        fn on_do(&self, data: &mut u32, _ctx: &mut Context<TestTimer>) {
            if matches!(self, Self::Running) {
                *data += 1;
            }
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = StateMachineBuilder::<TestState>::new().data(0).build();
        assert!(matches!(result, Err(BuildError::MissingInitialState)));

        let result = StateMachineBuilder::<TestState>::new()
            .initial(TestState::Root)
            .build();
        assert!(matches!(result, Err(BuildError::MissingData)));
    }

    #[test]
    fn configured_timer_is_armed_before_first_tick() {
        let mut machine = StateMachineBuilder::new()
            .initial(TestState::Root)
            .data(0)
            .timer(TestTimer::Warmup, 2.0)
            .build()
            .unwrap();

        assert_eq!(machine.current_state(), TestState::Idle);
        assert_eq!(machine.context().timer(TestTimer::Warmup).remaining(), 2.0);

        machine.step(1.0);
        assert_eq!(machine.current_state(), TestState::Idle);
        machine.step(1.0);
        assert_eq!(machine.current_state(), TestState::Running);
        assert_eq!(*machine.data(), 1);
    }

    #[test]
    fn unconfigured_timer_starts_elapsed() {
        let mut machine = StateMachineBuilder::new()
            .initial(TestState::Root)
            .data(0)
            .build()
            .unwrap();

        machine.step(0.1);
        assert_eq!(machine.current_state(), TestState::Running);
    }

    #[test]
    fn negative_timer_duration_is_rejected() {
        let result = StateMachineBuilder::new()
            .initial(TestState::Root)
            .data(0)
            .timer(TestTimer::Warmup, -1.0)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::InvalidTimerDuration { ref timer, .. }) if timer == "Warmup"
        ));
    }

    #[test]
    fn malformed_hierarchy_surfaces_graph_error() {
        let result = StateMachineBuilder::new()
            .initial(TestState::Orphan)
            .data(0)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::Graph(GraphError::EntryChildNotNested { .. }))
        ));
    }

    #[test]
    fn trace_config_is_carried_into_machine() {
        let machine = StateMachineBuilder::new()
            .initial(TestState::Root)
            .data(0)
            .trace(TraceConfig::verbose())
            .build()
            .unwrap();

        assert_eq!(machine.trace_config(), TraceConfig::verbose());
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum Blinker {
        Root,
        On,
        Off,
    }

    fn always(_data: &u32, _ctx: &Context<TestTimer>) -> bool {
        true
    }

    const BLINK_ON: &[Transition<Blinker>] = &[Transition::when(Blinker::Off, always)];
    const BLINK_OFF: &[Transition<Blinker>] = &[Transition::when(Blinker::On, always)];

    impl State for Blinker {
        type Data = u32;
        type Timer = TestTimer;

        fn name(&self) -> &'static str {
            match self {
                Self::Root => "Root",
                Self::On => "On",
                Self::Off => "Off",
            }
        }

        fn parent(&self) -> Option<Self> {
            match self {
                Self::Root => None,
                _ => Some(Self::Root),
            }
        }

        fn entry_child(&self) -> Option<Self> {
            match self {
                Self::Root => Some(Self::On),
                _ => None,
            }
        }

        fn transitions(&self) -> &'static [Transition<Self>] {
            match self {
                Self::On => BLINK_ON,
                Self::Off => BLINK_OFF,
                Self::Root => &[],
            }
        }
    }

    #[test]
    fn history_limit_caps_flapping_machine() {
        let mut machine = StateMachineBuilder::new()
            .initial(Blinker::Root)
            .data(0)
            .history_limit(16)
            .build()
            .unwrap();

        for tick in 1..=5_000u64 {
            machine.step(0.01);
            assert!(machine.history().len() <= 16);
            assert_eq!(machine.history().last().map(|r| r.tick), Some(tick));
        }

        assert_eq!(machine.history().len(), 16);
        assert_eq!(machine.history().limit(), Some(16));
        assert_eq!(machine.current_state(), Blinker::On);
    }
}
