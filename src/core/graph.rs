//! Validated view of a state hierarchy.
//!
//! The graph is explored once, when a machine is constructed, from the
//! initial state through parents, entry children and transition targets.
//! Malformed hierarchies are rejected here so that stepping the machine
//! never has to walk an unbounded parent or entry-child chain.

use super::state::State;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors describing a malformed state hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Parent chain of '{state}' is cyclic")]
    CyclicAncestry { state: String },

    #[error("Entry-child chain of '{state}' is cyclic")]
    CyclicEntryChild { state: String },

    #[error("Entry child '{child}' of '{parent}' does not declare '{parent}' as its parent")]
    EntryChildNotNested { parent: String, child: String },

    #[error("States '{first}' and '{second}' belong to disjoint hierarchies")]
    DisjointTrees { first: String, second: String },
}

/// Ancestor paths and leaf resolution for every reachable state.
#[derive(Clone, Debug)]
pub struct StateGraph<S: State> {
    root: S,
    ancestors: HashMap<S, Vec<S>>,
    leaves: HashMap<S, S>,
}

impl<S: State> StateGraph<S> {
    /// Explore and validate every state reachable from `initial`.
    pub fn explore(initial: S) -> Result<Self, GraphError> {
        let mut root: Option<S> = None;
        let mut ancestors = HashMap::new();
        let mut leaves = HashMap::new();
        let mut pending = vec![initial];
        let mut seen = HashSet::new();

        while let Some(state) = pending.pop() {
            if !seen.insert(state) {
                continue;
            }

            let chain = ancestor_chain(state)?;
            let state_root = chain.last().copied().unwrap_or(state);
            match root {
                None => root = Some(state_root),
                Some(existing) if existing != state_root => {
                    return Err(GraphError::DisjointTrees {
                        first: existing.name().to_string(),
                        second: state_root.name().to_string(),
                    });
                }
                Some(_) => {}
            }

            leaves.insert(state, deepest_entry_child(state)?);

            if let Some(child) = state.entry_child() {
                if child.parent() != Some(state) {
                    return Err(GraphError::EntryChildNotNested {
                        parent: state.name().to_string(),
                        child: child.name().to_string(),
                    });
                }
                pending.push(child);
            }
            pending.extend(chain.iter().copied());
            pending.extend(state.transitions().iter().map(|t| t.target()));

            ancestors.insert(state, chain);
        }

        Ok(Self {
            root: root.unwrap_or(initial),
            ancestors,
            leaves,
        })
    }

    pub fn root(&self) -> S {
        self.root
    }

    pub fn contains(&self, state: S) -> bool {
        self.ancestors.contains_key(&state)
    }

    /// Strict ancestors of `state`, innermost first.
    pub fn ancestors(&self, state: S) -> &[S] {
        self.ancestors
            .get(&state)
            .expect("state was reached while exploring the graph")
    }

    /// The leaf reached by following entry children from `state`.
    pub fn leaf_of(&self, state: S) -> S {
        *self
            .leaves
            .get(&state)
            .expect("state was reached while exploring the graph")
    }

    /// First ancestor of `source` that is also an ancestor of `target`.
    pub fn lowest_common_ancestor(&self, source: S, target: S) -> Option<S> {
        let target_ancestors: HashSet<S> = self.ancestors(target).iter().copied().collect();
        self.ancestors(source)
            .iter()
            .copied()
            .find(|ancestor| target_ancestors.contains(ancestor))
    }

    /// States exited when leaving `source` towards `lca`: the source itself,
    /// then its ancestors up to but excluding `lca`, innermost first.
    pub fn exit_path(&self, source: S, lca: Option<S>) -> Vec<S> {
        std::iter::once(source)
            .chain(
                self.ancestors(source)
                    .iter()
                    .copied()
                    .take_while(|ancestor| Some(*ancestor) != lca),
            )
            .collect()
    }

    /// States entered when arriving at `target` from `lca`: ancestors just
    /// below `lca` down to the target itself, outermost first.
    pub fn entry_path(&self, target: S, lca: Option<S>) -> Vec<S> {
        let mut path: Vec<S> = self
            .ancestors(target)
            .iter()
            .copied()
            .take_while(|ancestor| Some(*ancestor) != lca)
            .collect();
        path.reverse();
        path.push(target);
        path
    }

    /// Path from the root down to `state`, outermost first.
    pub fn path_from_root(&self, state: S) -> Vec<S> {
        self.entry_path(state, None)
    }
}

fn ancestor_chain<S: State>(state: S) -> Result<Vec<S>, GraphError> {
    let mut chain = Vec::new();
    let mut visited = HashSet::from([state]);
    let mut cursor = state.parent();

    while let Some(parent) = cursor {
        if !visited.insert(parent) {
            return Err(GraphError::CyclicAncestry {
                state: state.name().to_string(),
            });
        }
        chain.push(parent);
        cursor = parent.parent();
    }

    Ok(chain)
}

fn deepest_entry_child<S: State>(state: S) -> Result<S, GraphError> {
    let mut visited = HashSet::from([state]);
    let mut leaf = state;

    while let Some(child) = leaf.entry_child() {
        if !visited.insert(child) {
            return Err(GraphError::CyclicEntryChild {
                state: state.name().to_string(),
            });
        }
        leaf = child;
    }

    Ok(leaf)
}
