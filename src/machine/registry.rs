//! Transition registry indexed by (source, event).

use super::transition::{Source, SourceKey, Transition};
use crate::core::{Event, State};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

type Shared<S, E, D, A> = Arc<Transition<S, E, D, A>>;

/// Ordered transition lists per (source key, event).
pub(crate) struct Registry<S: State, E: Event, D, A> {
    entries: HashMap<(SourceKey<S>, E), Vec<Shared<S, E, D, A>>>,
}

impl<S: State, E: Event, D, A> Registry<S, E, D, A> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// File a transition at the end of the list for each key it declares.
    pub(crate) fn add(&mut self, transition: Transition<S, E, D, A>) -> Shared<S, E, D, A> {
        let shared = Arc::new(transition);
        for key in shared.from.keys() {
            self.entries
                .entry((key, shared.event.clone()))
                .or_default()
                .push(Arc::clone(&shared));
        }
        shared
    }

    /// Remove every entry for `event` under the keys of `from`, optionally
    /// only those targeting `to`. Returns the number of entries removed.
    pub(crate) fn remove(&mut self, from: &Source<S>, event: &E, to: Option<&S>) -> usize {
        let mut removed = 0;
        for key in from.keys() {
            let index = (key, event.clone());
            let Some(list) = self.entries.get_mut(&index) else {
                continue;
            };
            let before = list.len();
            list.retain(|t| to.is_some_and(|to| t.to != *to));
            removed += before - list.len();
            if list.is_empty() {
                self.entries.remove(&index);
            }
        }
        removed
    }

    /// Exact-state matches in registration order, then wildcard matches in
    /// registration order.
    pub(crate) fn candidates(&self, current: &S, event: &E) -> Vec<Shared<S, E, D, A>> {
        let exact = self
            .entries
            .get(&(SourceKey::State(current.clone()), event.clone()));
        let wildcard = self.entries.get(&(SourceKey::Any, event.clone()));

        exact
            .into_iter()
            .chain(wildcard)
            .flatten()
            .cloned()
            .collect()
    }

    /// Every state named as a concrete source or as a destination.
    pub(crate) fn states(&self) -> HashSet<S> {
        let mut states = HashSet::new();
        for ((key, _), list) in &self.entries {
            if let SourceKey::State(state) = key {
                states.insert(state.clone());
            }
            states.extend(list.iter().map(|t| t.to.clone()));
        }
        states
    }

    pub(crate) fn events(&self) -> HashSet<E> {
        self.entries.keys().map(|(_, event)| event.clone()).collect()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
