//! Checkpoint and resume functionality for state machines.
//!
//! A checkpoint captures where a machine stands: its current state, the
//! history that led there, and the same for the nested machine active in
//! that state. Hooks, guards, listeners and context data are not part of
//! it; a checkpoint is restored into a machine built from the same
//! definition.
//!
//! # Example
//!
//! ```rust
//! use turnstile::StateMachineBuilder;
//! use turnstile::checkpoint::Checkpoint;
//! use turnstile::machine::Transition;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let build = || {
//!     StateMachineBuilder::<String, String>::new()
//!         .initial("draft".to_string())
//!         .add_transition(Transition::new("draft".to_string(), "create".to_string(), "assembly".to_string()))
//!         .build()
//! };
//!
//! let machine = build()?;
//! machine.fire("create".to_string()).await?;
//! let json = machine.checkpoint().await.to_json()?;
//!
//! let resumed = build()?;
//! resumed.restore(Checkpoint::from_json(&json)?).await?;
//! assert_eq!(resumed.state().await, "assembly");
//! # Ok(())
//! # }
//! ```

use crate::core::{Event, State, StateHistory};
use crate::machine::{Engine, StateMachine};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable checkpoint of state machine state.
/// Does NOT include hooks, guards or context data (not serializable).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State, E: Event> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// Id of the machine the checkpoint was taken from
    pub machine_id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Initial state of the machine
    pub initial_state: S,

    /// Current state of the machine
    pub current_state: S,

    /// Transitions committed since the machine last started
    pub history: StateHistory<S, E>,

    /// Checkpoint of the nested machine active in `current_state`
    pub child: Option<Box<Checkpoint<S, E>>>,
}

impl<S: State, E: Event> Checkpoint<S, E> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }

    /// Check that the recorded history actually leads from the initial
    /// state to the current one.
    fn check_history(&self) -> Result<(), CheckpointError> {
        let path = self.history.get_path();
        match (path.first(), path.last()) {
            (Some(first), _) if **first != self.initial_state => {
                Err(CheckpointError::ValidationFailed(format!(
                    "history starts at '{}', not at initial state '{}'",
                    first.name(),
                    self.initial_state.name()
                )))
            }
            (_, Some(last)) if **last != self.current_state => {
                Err(CheckpointError::ValidationFailed(format!(
                    "history ends at '{}', not at current state '{}'",
                    last.name(),
                    self.current_state.name()
                )))
            }
            (None, _) if self.current_state != self.initial_state => {
                Err(CheckpointError::ValidationFailed(format!(
                    "empty history but current state '{}' is not the initial state",
                    self.current_state.name()
                )))
            }
            _ => Ok(()),
        }
    }
}

impl<S, E, D, A> Engine<S, E, D, A>
where
    S: State,
    E: Event,
    D: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    fn capture(&self) -> BoxFuture<'_, Checkpoint<S, E>> {
        Box::pin(async move {
            let child = match self.children.get(&self.current) {
                Some(child) => Some(Box::new(child.engine().lock().await.capture().await)),
                None => None,
            };
            Checkpoint {
                version: CHECKPOINT_VERSION,
                id: uuid::Uuid::new_v4().to_string(),
                machine_id: self.id.clone(),
                timestamp: Utc::now(),
                initial_state: self.initial.clone(),
                current_state: self.current.clone(),
                history: self.history.clone(),
                child,
            }
        })
    }

    /// Everything that can be checked before anything is changed.
    fn verify<'a>(&'a self, checkpoint: &'a Checkpoint<S, E>) -> BoxFuture<'a, Result<(), CheckpointError>> {
        Box::pin(async move {
            checkpoint.check_version()?;
            if checkpoint.initial_state != self.initial {
                return Err(CheckpointError::ValidationFailed(format!(
                    "checkpoint starts at '{}' but machine '{}' starts at '{}'",
                    checkpoint.initial_state.name(),
                    self.id,
                    self.initial.name()
                )));
            }
            checkpoint.check_history()?;

            match (&checkpoint.child, self.children.get(&checkpoint.current_state)) {
                (Some(nested), Some(child)) => child.engine().lock().await.verify(nested).await,
                (Some(_), None) => Err(CheckpointError::ValidationFailed(format!(
                    "state '{}' hosts no nested machine",
                    checkpoint.current_state.name()
                ))),
                (None, _) => Ok(()),
            }
        })
    }

    fn apply(&mut self, checkpoint: Checkpoint<S, E>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.current = checkpoint.current_state;
            self.history = checkpoint.history;
            self.last = None;

            if let Some(child) = self.children.get(&self.current) {
                match checkpoint.child {
                    Some(nested) => child.engine().lock().await.apply(*nested).await,
                    None => child.reset().await,
                }
            }
        })
    }
}

impl<S, E, D, A> StateMachine<S, E, D, A>
where
    S: State,
    E: Event,
    D: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// Snapshot the current state, history and active nested machine.
    pub async fn checkpoint(&self) -> Checkpoint<S, E> {
        self.engine().lock().await.capture().await
    }

    /// Move the machine to the position recorded in `checkpoint` without
    /// running any hook or listener. The checkpoint is checked in full
    /// first; on error nothing changes.
    pub async fn restore(&self, checkpoint: Checkpoint<S, E>) -> Result<(), CheckpointError> {
        let mut engine = self.engine().lock().await;
        engine.verify(&checkpoint).await?;
        tracing::debug!(
            machine = %engine.id,
            checkpoint = %checkpoint.id,
            state = %checkpoint.current_state.name(),
            "restoring checkpoint"
        );
        engine.apply(checkpoint).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateTransition;

    fn s(value: &str) -> String {
        value.to_string()
    }

    fn sample() -> Checkpoint<String, String> {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: s("cp-1"),
            machine_id: s("order-7"),
            timestamp: Utc::now(),
            initial_state: s("draft"),
            current_state: s("assembly"),
            history: StateHistory::new().record(StateTransition {
                from: s("draft"),
                to: s("assembly"),
                event: s("create"),
                timestamp: Utc::now(),
            }),
            child: None,
        }
    }

    #[test]
    fn json_round_trip_keeps_history() {
        let json = sample().to_json().unwrap();
        let restored: Checkpoint<String, String> = Checkpoint::from_json(&json).unwrap();

        assert_eq!(restored.current_state, "assembly");
        assert_eq!(restored.history.get_path(), vec!["draft", "assembly"]);
    }

    #[test]
    fn binary_round_trip_keeps_child() {
        let mut checkpoint = sample();
        checkpoint.child = Some(Box::new(sample()));

        let bytes = checkpoint.to_binary().unwrap();
        let restored: Checkpoint<String, String> = Checkpoint::from_binary(&bytes).unwrap();

        assert_eq!(restored.child.unwrap().machine_id, "order-7");
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut checkpoint = sample();
        checkpoint.version = 99;
        let json = checkpoint.to_json().unwrap();

        let err = Checkpoint::<String, String>::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::UnsupportedVersion {
                found: 99,
                supported: CHECKPOINT_VERSION
            }
        ));
    }

    #[test]
    fn garbage_fails_to_deserialize() {
        let err = Checkpoint::<String, String>::from_json("{not json").unwrap_err();
        assert!(matches!(err, CheckpointError::DeserializationFailed(_)));
    }

    #[test]
    fn history_must_lead_to_current_state() {
        let mut checkpoint = sample();
        checkpoint.current_state = s("shipping");
        assert!(matches!(
            checkpoint.check_history(),
            Err(CheckpointError::ValidationFailed(_))
        ));

        let mut untouched = sample();
        untouched.history = StateHistory::new();
        assert!(untouched.check_history().is_err());
        untouched.current_state = s("draft");
        assert!(untouched.check_history().is_ok());
    }
}
