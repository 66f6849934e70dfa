//! The shape of a machine as seen by configuration rules.

use crate::core::{Event, State};
use crate::machine::{Source, Transition};

/// One transition reduced to the parts rules look at.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionShape<S: State, E: Event> {
    pub from: Source<S>,
    pub event: E,
    pub to: S,
}

impl<S: State, E: Event, D, A> From<&Transition<S, E, D, A>> for TransitionShape<S, E> {
    fn from(transition: &Transition<S, E, D, A>) -> Self {
        Self {
            from: transition.from.clone(),
            event: transition.event.clone(),
            to: transition.to.clone(),
        }
    }
}

/// Everything a builder is about to turn into a machine.
#[derive(Clone, Debug)]
pub struct MachineConfig<S: State, E: Event> {
    pub initial: S,
    pub transitions: Vec<TransitionShape<S, E>>,
    /// Hosting states in declaration order; duplicates are kept.
    pub hosts: Vec<S>,
    pub subscribed_events: Vec<E>,
}

impl<S: State, E: Event> MachineConfig<S, E> {
    /// Whether some transition can move the machine into `state`, or it is
    /// where the machine starts.
    pub fn is_reachable(&self, state: &S) -> bool {
        self.initial == *state || self.transitions.iter().any(|t| t.to == *state)
    }

    pub fn knows_event(&self, event: &E) -> bool {
        self.transitions.iter().any(|t| t.event == *event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> String {
        value.to_string()
    }

    #[test]
    fn reachability_counts_initial_and_targets() {
        let config = MachineConfig {
            initial: s("draft"),
            transitions: vec![TransitionShape {
                from: Source::from(s("draft")),
                event: s("create"),
                to: s("assembly"),
            }],
            hosts: Vec::new(),
            subscribed_events: Vec::new(),
        };

        assert!(config.is_reachable(&s("draft")));
        assert!(config.is_reachable(&s("assembly")));
        assert!(!config.is_reachable(&s("shipping")));
        assert!(config.knows_event(&s("create")));
        assert!(!config.knows_event(&s("ship")));
    }
}
