//! State transition history tracking.
//!
//! Every committed transition is appended to an ordered, serializable
//! history. Recording consumes the history and hands back the extended
//! one, so a history value never changes behind a reader's back.

use super::state::{Event, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use turnstile::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "draft".to_string(),
///     to: "assembly".to_string(),
///     event: "create".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, "assembly");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State, E: Event> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// The event that triggered the transition
    pub event: E,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// # Example
///
/// ```rust
/// use turnstile::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: 1u8,
///         to: 2u8,
///         event: 10u8,
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: 2u8,
///         to: 3u8,
///         event: 11u8,
///         timestamp: Utc::now(),
///     });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&1u8, &2, &3]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State, E: Event> {
    transitions: Vec<StateTransition<S, E>>,
}

impl<S: State, E: Event> Default for StateHistory<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> StateHistory<S, E> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning the extended history.
    pub fn record(mut self, transition: StateTransition<S, E>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the first `from` state, then
    /// the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Get the events that drove the machine, in order.
    pub fn events(&self) -> Vec<&E> {
        self.transitions.iter().map(|t| &t.event).collect()
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions.
    pub fn transitions(&self) -> &[StateTransition<S, E>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
