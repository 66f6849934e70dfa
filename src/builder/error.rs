//! Build errors for state machine and transition builders.

use crate::validation::ConfigViolation;
use thiserror::Error;

/// Errors that can occur when building state machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition event not specified. Call .on(event)")]
    MissingEvent,

    #[error("Transition source state not specified. Call .from(state), .from_states(..) or .from_any()")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    /// Configuration rules were violated. Every violation is reported, not
    /// just the first.
    #[error("Invalid machine configuration: {}", format_violations(.violations))]
    Invalid { violations: Vec<ConfigViolation> },

    #[error("Nested machine for state '{state}' failed to build: {source}")]
    Nested {
        state: String,
        #[source]
        source: Box<BuildError>,
    },
}

impl BuildError {
    /// The configuration violations behind an `Invalid` error.
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            Self::Invalid { violations } => violations,
            _ => &[],
        }
    }
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
