//! The guard/hook pipeline run for every dispatched event.

use super::engine::Engine;
use super::error::MachineError;
use super::registry::Registry;
use super::subscribers::Notification;
use super::transition::Transition;
use crate::core::{BoxError, Context, Event, HookKind, State, StateTransition};
use chrono::Utc;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Outcome of evaluating an event without acting on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Nothing is registered for the event from the current state.
    Unknown,
    /// Candidates exist but every guard rejected.
    Blocked,
    Allowed,
}

/// Pick the first candidate whose guard passes. Guards are awaited one at
/// a time in registration order; later guards never run once one passes.
async fn select<S, E, D, A>(
    registry: &Registry<S, E, D, A>,
    machine: &str,
    current: &S,
    context: &Context<D>,
    event: &E,
    args: &A,
) -> Result<Arc<Transition<S, E, D, A>>, MachineError>
where
    S: State,
    E: Event,
{
    let candidates = registry.candidates(current, event);
    if candidates.is_empty() {
        return Err(MachineError::InvalidTransition {
            event: event.name().into_owned(),
            state: current.name().into_owned(),
        });
    }

    for candidate in candidates {
        let allowed = candidate.allows(context, args).await;
        tracing::trace!(
            machine,
            event = %event.name(),
            from = %current.name(),
            to = %candidate.to.name(),
            allowed,
            "guard evaluated"
        );
        if allowed {
            return Ok(candidate);
        }
    }

    Err(MachineError::GuardFailed {
        event: event.name().into_owned(),
        state: current.name().into_owned(),
    })
}

impl<S, E, D, A> Engine<S, E, D, A>
where
    S: State,
    E: Event,
    D: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// Dispatch `event`, offering it to the active child first.
    ///
    /// Boxed because a child dispatch recurses through the same path.
    pub(crate) fn dispatch<'a>(
        &'a mut self,
        event: &'a E,
        args: &'a A,
    ) -> BoxFuture<'a, Result<S, MachineError>> {
        Box::pin(async move {
            self.slot.ready().await?;

            if let Some(child) = self.active_child() {
                let mut engine = child.engine().lock().await;
                match engine.dispatch(event, args).await {
                    Err(err) if err.is_invalid_transition() => {
                        tracing::debug!(
                            machine = %self.id,
                            child = %engine.id,
                            event = %event.name(),
                            "child does not handle event, falling through"
                        );
                    }
                    outcome => return outcome,
                }
            }

            self.run(event, args).await
        })
    }

    /// Evaluate `event` against guards only, consulting the active child
    /// first. No hook or listener runs and no state changes.
    pub(crate) fn verdict<'a>(
        &'a mut self,
        event: &'a E,
        args: &'a A,
    ) -> BoxFuture<'a, Result<Verdict, MachineError>> {
        Box::pin(async move {
            let context = self.slot.ready().await?;

            if let Some(child) = self.children.get(&self.current) {
                let verdict = child.engine().lock().await.verdict(event, args).await?;
                if verdict != Verdict::Unknown {
                    return Ok(verdict);
                }
            }

            match select(&self.registry, &self.id, &self.current, context, event, args).await {
                Ok(_) => Ok(Verdict::Allowed),
                Err(MachineError::InvalidTransition { .. }) => Ok(Verdict::Unknown),
                Err(MachineError::GuardFailed { .. }) => Ok(Verdict::Blocked),
                Err(err) => Err(err),
            }
        })
    }

    /// The pipeline for this machine's own registry.
    async fn run(&mut self, event: &E, args: &A) -> Result<S, MachineError> {
        let from = self.current.clone();
        let context = self.slot.ready().await?;
        let winner = select(&self.registry, &self.id, &from, context, event, args).await?;
        let to = winner.to.clone();

        tracing::debug!(
            machine = %self.id,
            event = %event.name(),
            from = %from.name(),
            to = %to.name(),
            "transition selected"
        );

        let failed = |hook: HookKind, source: BoxError| {
            tracing::warn!(
                machine = %self.id,
                event = %event.name(),
                from = %from.name(),
                to = %to.name(),
                hook = %hook,
                error = %source,
                "hook failed"
            );
            MachineError::hook(hook, event.name(), from.name(), source)
        };

        if let Some(on_leave) = self.last.as_ref().and_then(|last| last.on_leave.as_ref()) {
            on_leave
                .call(context, args)
                .await
                .map_err(|source| failed(HookKind::OnLeave, source))?;
        }

        if let Some(child) = self.children.get(&from) {
            child.reset().await;
        }

        if let Some(on_enter) = &winner.on_enter {
            on_enter
                .call(context, args)
                .await
                .map_err(|source| failed(HookKind::OnEnter, source))?;
        }

        self.current = to.clone();
        self.history = std::mem::take(&mut self.history).record(StateTransition {
            from: from.clone(),
            to: to.clone(),
            event: event.clone(),
            timestamp: Utc::now(),
        });
        self.last = Some(Arc::clone(&winner));
        if let Some(child) = self.children.get(&to) {
            child.reset().await;
        }

        tracing::debug!(
            machine = %self.id,
            event = %event.name(),
            from = %from.name(),
            to = %to.name(),
            "transition committed"
        );

        for listener in self.subscribers.listeners_for(event) {
            listener
                .call(Notification {
                    machine_id: &self.id,
                    event,
                    from: &from,
                    to: &to,
                    context,
                })
                .await
                .map_err(|source| failed(HookKind::Subscriber, source))?;
        }

        if let Some(on_exit) = &winner.on_exit {
            on_exit
                .call(context, args)
                .await
                .map_err(|source| failed(HookKind::OnExit, source))?;
        }

        Ok(to)
    }
}
