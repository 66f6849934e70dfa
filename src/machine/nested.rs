//! Child machines hosted by parent states.

use super::engine::Engine;
use super::error::MachineError;
use super::handle::StateMachine;
use crate::core::{Event, State, StateHistory};
use futures::future::BoxFuture;

impl<S, E, D, A> Engine<S, E, D, A>
where
    S: State,
    E: Event,
    D: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// The child hosted by the current state, if any.
    pub(crate) fn active_child(&self) -> Option<StateMachine<S, E, D, A>> {
        self.children.get(&self.current).cloned()
    }

    /// Back to the initial state with no history and no data. Resolved
    /// dependencies are kept. The child hosted by the initial state is
    /// restarted too.
    pub(crate) fn restart(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            tracing::debug!(machine = %self.id, initial = %self.initial.name(), "machine restarted");
            self.current = self.initial.clone();
            self.last = None;
            self.history = StateHistory::new();
            self.slot.reset_data();
            if let Some(child) = self.children.get(&self.current) {
                child.reset().await;
            }
        })
    }

    /// Whether this machine or its active descendant is in `state`.
    pub(crate) fn is<'a>(&'a self, state: &'a S) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            if self.current == *state {
                return true;
            }
            match self.children.get(&self.current) {
                Some(child) => child.engine().lock().await.is(state).await,
                None => false,
            }
        })
    }

    /// Attach `child` under `state`. If the machine is currently in `state`
    /// the child is active right away, starting from its initial state.
    pub(crate) fn host(
        &mut self,
        state: S,
        child: StateMachine<S, E, D, A>,
    ) -> Result<(), MachineError> {
        if self.children.contains_key(&state) {
            return Err(MachineError::StateAlreadyHosted {
                state: state.name().into_owned(),
            });
        }
        tracing::debug!(machine = %self.id, state = %state.name(), child = child.id(), "nested machine attached");
        self.children.insert(state, child);
        Ok(())
    }

    /// Detach and discard the child hosted by `state`.
    pub(crate) async fn unhost(&mut self, state: &S) -> bool {
        match self.children.remove(state) {
            Some(child) => {
                child.reset().await;
                tracing::debug!(machine = %self.id, state = %state.name(), "nested machine removed");
                true
            }
            None => false,
        }
    }
}
