//! Configuration violations reported when a machine is built.

use thiserror::Error;

/// A rule broken by a machine's configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("Transition on '{event}' to '{to}' lists no source states")]
    EmptySourceSet { event: String, to: String },

    #[error("Transition on '{event}' leaves final state '{state}'")]
    TransitionFromFinalState { state: String, event: String },

    #[error("State '{state}' hosts a nested machine but no transition enters it")]
    UnreachableHostState { state: String },

    #[error("State '{state}' hosts more than one nested machine")]
    DuplicateHostState { state: String },

    #[error("Subscriber registered for unknown event '{event}'")]
    UnknownSubscribedEvent { event: String },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}
