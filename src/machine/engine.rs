//! Hierarchical state machine that runs the lifecycle callbacks.

use crate::core::{
    Context, GraphError, State, StateGraph, StateHistory, Transition, TransitionRecord,
};
use crate::machine::trace::TraceConfig;
use chrono::Utc;
use tracing::{debug, trace};

/// Number of transition records a machine keeps unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

/// Synchronous, tick-driven hierarchical state machine.
///
/// Exactly one leaf state is active at any time. Each [`step`](Self::step):
///
/// 1. advances `dt` and every timer,
/// 2. fires the first enabled transition of the active leaf, exiting up to
///    the lowest common ancestor, running the action, then entering down
///    to the target's leaf,
/// 3. runs `on_do` from the root down to the active leaf, then
///    `on_late_do` from the leaf back up to the root.
///
/// The machine holds no locks; callers serialize calls to `step`. Its
/// history keeps the most recent [`DEFAULT_HISTORY_LIMIT`] transitions;
/// use [`StateMachineBuilder::history_limit`](crate::StateMachineBuilder::history_limit)
/// to change that.
pub struct HierarchicalStateMachine<S: State> {
    graph: StateGraph<S>,
    current: S,
    data: S::Data,
    context: Context<S::Timer>,
    history: StateHistory<S>,
    ticks: u64,
    trace: TraceConfig,
}

impl<S: State> HierarchicalStateMachine<S> {
    /// Create a machine in the leaf below `initial`, entering every state
    /// from the root down to that leaf.
    pub fn new(initial: S, data: S::Data) -> Result<Self, GraphError> {
        Self::start(
            initial,
            data,
            Context::new(),
            TraceConfig::default(),
            StateHistory::bounded(DEFAULT_HISTORY_LIMIT),
        )
    }

    pub(crate) fn start(
        initial: S,
        data: S::Data,
        context: Context<S::Timer>,
        trace: TraceConfig,
        history: StateHistory<S>,
    ) -> Result<Self, GraphError> {
        let graph = StateGraph::explore(initial)?;
        let leaf = graph.leaf_of(initial);
        let path = graph.path_from_root(leaf);

        let mut machine = Self {
            graph,
            current: leaf,
            data,
            context,
            history,
            ticks: 0,
            trace,
        };

        for state in path {
            machine.enter(state);
        }

        Ok(machine)
    }

    /// Advance the machine by `dt` seconds and return the updated data.
    pub fn step(&mut self, dt: f32) -> &S::Data {
        self.ticks += 1;
        self.context.advance(dt);

        let fired = self
            .current
            .transitions()
            .iter()
            .find(|t| t.is_enabled(&self.data, &self.context))
            .copied();

        if let Some(transition) = fired {
            self.fire(transition);
        }

        let path = self.graph.path_from_root(self.current);
        for state in &path {
            if self.trace.log_dos {
                trace!(state = state.name(), "do");
            }
            state.on_do(&mut self.data, &mut self.context);
        }
        for state in path.iter().rev() {
            if self.trace.log_late_dos {
                trace!(state = state.name(), "late do");
            }
            state.on_late_do(&mut self.data, &mut self.context);
        }

        &self.data
    }

    fn fire(&mut self, transition: Transition<S>) {
        let source = self.current;
        let target = self.graph.leaf_of(transition.target());
        let lca = self.graph.lowest_common_ancestor(source, target);

        if self.trace.log_transitions {
            debug!(
                from = source.name(),
                to = target.name(),
                lca = lca.map(|s| s.name()),
                tick = self.ticks,
                "transition"
            );
        }

        for state in self.graph.exit_path(source, lca) {
            if self.trace.log_exits {
                debug!(state = state.name(), "exit");
            }
            state.on_exit(&mut self.data, &mut self.context);
        }

        if self.trace.log_transition_actions && transition.has_action() {
            debug!(from = source.name(), to = target.name(), "transition action");
        }
        transition.run_action(&mut self.data, &mut self.context);

        self.current = target;
        for state in self.graph.entry_path(target, lca) {
            self.enter(state);
        }

        self.history.push(TransitionRecord {
            from: source,
            to: target,
            tick: self.ticks,
            timestamp: Utc::now(),
        });
    }

    fn enter(&mut self, state: S) {
        if self.trace.log_entries {
            debug!(state = state.name(), "entry");
        }
        state.on_entry(&mut self.data, &mut self.context);
    }

    /// The active leaf state.
    pub fn current_state(&self) -> S {
        self.current
    }

    /// Check whether `state` is the active leaf or one of its ancestors.
    pub fn is_in(&self, state: S) -> bool {
        self.current == state || self.graph.ancestors(self.current).contains(&state)
    }

    pub fn data(&self) -> &S::Data {
        &self.data
    }

    /// Mutable access for injecting inputs between ticks.
    pub fn data_mut(&mut self) -> &mut S::Data {
        &mut self.data
    }

    pub fn context(&self) -> &Context<S::Timer> {
        &self.context
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Number of completed calls to [`step`](Self::step).
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn trace_config(&self) -> TraceConfig {
        self.trace
    }

    pub fn into_data(self) -> S::Data {
        self.data
    }
}
