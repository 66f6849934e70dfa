//! Errors surfaced by a running state machine.

use crate::builder::BuildError;
use crate::core::{BoxError, HookKind};
use thiserror::Error;

/// Errors that can occur while dispatching events or reconfiguring a
/// machine.
///
/// A hook, listener or factory failure keeps the original error untouched
/// as its [`source`](std::error::Error::source).
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("No transition for event '{event}' from state '{state}'")]
    InvalidTransition { event: String, state: String },

    #[error("Guard blocked event '{event}' from state '{state}'")]
    GuardFailed { event: String, state: String },

    /// A hook or listener returned an error. When `committed` is true the
    /// machine already moved to the new state before the failure.
    #[error("{hook} failed for event '{event}' from state '{state}': {source}")]
    HookFailed {
        hook: HookKind,
        event: String,
        state: String,
        committed: bool,
        #[source]
        source: BoxError,
    },

    #[error("Context initialization failed: {source}")]
    Initialization {
        #[source]
        source: BoxError,
    },

    #[error("Dependency '{name}' failed to resolve: {source}")]
    Injection {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("State '{state}' already hosts a nested machine")]
    StateAlreadyHosted { state: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl MachineError {
    pub(crate) fn hook(
        hook: HookKind,
        event: impl Into<String>,
        state: impl Into<String>,
        source: BoxError,
    ) -> Self {
        Self::HookFailed {
            hook,
            event: event.into(),
            state: state.into(),
            committed: hook.after_commit(),
            source,
        }
    }

    /// No transition is registered for the current state and event.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Transitions exist but every guard rejected the dispatch.
    pub fn is_guard_failed(&self) -> bool {
        matches!(self, Self::GuardFailed { .. })
    }

    /// A hook or listener failed.
    pub fn is_hook_failure(&self) -> bool {
        matches!(self, Self::HookFailed { .. })
    }

    /// Whether the state was already changed when the error happened.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::HookFailed { committed: true, .. })
    }

    /// The event that was being dispatched, if the error concerns one.
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::InvalidTransition { event, .. }
            | Self::GuardFailed { event, .. }
            | Self::HookFailed { event, .. } => Some(event),
            _ => None,
        }
    }

    /// The state the event was dispatched from, if the error concerns one.
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::InvalidTransition { state, .. }
            | Self::GuardFailed { state, .. }
            | Self::HookFailed { state, .. } => Some(state),
            _ => None,
        }
    }

    /// The error returned by the failing hook, listener or factory.
    pub fn hook_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::HookFailed { source, .. }
            | Self::Initialization { source }
            | Self::Injection { source, .. } => Some(&**source),
            _ => None,
        }
    }

    /// Downcast the failing hook's error to its concrete type.
    pub fn downcast_source<T: std::error::Error + 'static>(&self) -> Option<&T> {
        self.hook_source().and_then(|source| source.downcast_ref::<T>())
    }
}
