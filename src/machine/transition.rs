//! Transition definitions.

use crate::core::{Context, Event, Guard, Hook, State};
use serde::{Deserialize, Serialize};

/// The source side of a transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum Source<S: State> {
    /// Matches from every state not matched by an exact-state transition
    /// for the same event.
    Any,
    /// Matches from any of the listed states.
    States(Vec<S>),
}

impl<S: State> Source<S> {
    /// Check if this source covers `state`.
    pub fn covers(&self, state: &S) -> bool {
        match self {
            Self::Any => true,
            Self::States(states) => states.contains(state),
        }
    }

    pub(crate) fn keys(&self) -> Vec<SourceKey<S>> {
        match self {
            Self::Any => vec![SourceKey::Any],
            Self::States(states) => states.iter().cloned().map(SourceKey::State).collect(),
        }
    }
}

impl<S: State> From<S> for Source<S> {
    fn from(state: S) -> Self {
        Self::States(vec![state])
    }
}

impl<S: State> From<Vec<S>> for Source<S> {
    fn from(states: Vec<S>) -> Self {
        Self::States(states)
    }
}

/// Registry index key: one concrete state or the wildcard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SourceKey<S> {
    Any,
    State(S),
}

/// A rule mapping one or more source states plus an event to a
/// destination state, with an optional guard and lifecycle hooks.
///
/// A transition with several source states is stored once and shared by
/// every registry key it is filed under, so its hooks fire once per
/// dispatch.
pub struct Transition<S: State, E: Event, D, A> {
    pub from: Source<S>,
    pub event: E,
    pub to: S,
    pub guard: Option<Guard<D, A>>,
    pub on_enter: Option<Hook<D, A>>,
    pub on_exit: Option<Hook<D, A>>,
    pub on_leave: Option<Hook<D, A>>,
}

impl<S: State, E: Event, D, A> Transition<S, E, D, A> {
    /// A bare transition with no guard and no hooks.
    pub fn new(from: impl Into<Source<S>>, event: E, to: S) -> Self {
        Self {
            from: from.into(),
            event,
            to,
            guard: None,
            on_enter: None,
            on_exit: None,
            on_leave: None,
        }
    }

    /// Check the guard if present; a missing guard always passes.
    pub async fn allows(&self, context: &Context<D>, args: &A) -> bool {
        match &self.guard {
            Some(guard) => guard.check(context, args).await,
            None => true,
        }
    }

    /// Check if this transition applies to `event` from `state`, guard aside.
    pub fn matches(&self, state: &S, event: &E) -> bool {
        self.event == *event && self.from.covers(state)
    }
}

impl<S: State, E: Event, D, A> Clone for Transition<S, E, D, A> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            event: self.event.clone(),
            to: self.to.clone(),
            guard: self.guard.clone(),
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
            on_leave: self.on_leave.clone(),
        }
    }
}

impl<S: State, E: Event, D, A> std::fmt::Debug for Transition<S, E, D, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("event", &self.event)
            .field("to", &self.to)
            .field("guarded", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}
