//! The public, cloneable handle to a running machine.

use super::container::Factory;
use super::dispatch::Verdict;
use super::engine::Engine;
use super::error::MachineError;
use super::subscribers::{Listener, Subscription};
use super::transition::{Source, Transition};
use crate::builder::StateMachineBuilder;
use crate::core::{BoxError, Context, Event, State, StateHistory};
use std::any::Any;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A running state machine.
///
/// Cloning the handle is cheap and every clone drives the same instance.
/// Operations on one instance wait their turn in arrival order, and each
/// one finishes completely (hooks and listeners included) before the next
/// starts. Separate instances never wait on each other.
///
/// Hooks and listeners receive the context directly and must not call back
/// into the handle of the machine running them.
pub struct StateMachine<S: State, E: Event, D = (), A = ()> {
    id: Arc<str>,
    engine: Arc<Mutex<Engine<S, E, D, A>>>,
}

impl<S: State, E: Event, D, A> Clone for StateMachine<S, E, D, A> {
    fn clone(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<S: State, E: Event, D, A> std::fmt::Debug for StateMachine<S, E, D, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<S, E, D, A> StateMachine<S, E, D, A>
where
    S: State,
    E: Event,
    D: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    pub(crate) fn from_engine(engine: Engine<S, E, D, A>) -> Self {
        Self {
            id: Arc::from(engine.id.as_str()),
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub(crate) fn engine(&self) -> &Mutex<Engine<S, E, D, A>> {
        &self.engine
    }

    pub(crate) async fn reset(&self) {
        self.engine.lock().await.restart().await;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current state of this machine (not of its children).
    pub async fn state(&self) -> S {
        self.engine.lock().await.current.clone()
    }

    /// Whether this machine, or the child active in its current state, is
    /// in `state`.
    pub async fn is(&self, state: &S) -> bool {
        self.engine.lock().await.is(state).await
    }

    /// Dispatch `event` and return the state this machine ends up in.
    ///
    /// When the current state hosts a child, the child gets the event first
    /// and its outcome is final unless it has no transition for the event.
    /// The returned state is always this machine's own, even when the child
    /// consumed the event; use [`is`](Self::is) to look at nested states.
    pub async fn transition(&self, event: E, args: A) -> Result<S, MachineError> {
        let mut engine = self.engine.lock().await;
        tracing::debug!(machine = %self.id, event = %event.name(), "dispatch started");
        engine.dispatch(&event, &args).await?;
        Ok(engine.current.clone())
    }

    /// Check whether `event` would be accepted, without running hooks or
    /// changing state. May resolve the context for the first time.
    pub async fn can(&self, event: E, args: A) -> Result<bool, MachineError> {
        let verdict = self.engine.lock().await.verdict(&event, &args).await?;
        Ok(verdict == Verdict::Allowed)
    }

    /// Register another transition; it is tried after existing ones.
    pub async fn add_transition(&self, transition: Transition<S, E, D, A>) {
        let mut engine = self.engine.lock().await;
        tracing::debug!(machine = %self.id, transition = ?transition, "transition added");
        engine.registry.add(transition);
    }

    /// Remove transitions for `event` from `from`, optionally only those
    /// leading to `to`. Returns how many registry entries were dropped;
    /// removing something absent is a no-op.
    pub async fn remove_transition(
        &self,
        from: impl Into<Source<S>>,
        event: E,
        to: Option<S>,
    ) -> usize {
        let from = from.into();
        self.engine
            .lock()
            .await
            .registry
            .remove(&from, &event, to.as_ref())
    }

    /// Host a nested machine in `state`.
    pub async fn add_state(
        &self,
        state: S,
        builder: StateMachineBuilder<S, E, D, A>,
    ) -> Result<(), MachineError> {
        let child = builder.build()?;
        self.engine.lock().await.host(state, child)
    }

    /// Discard the nested machine hosted by `state`, if there is one.
    pub async fn remove_state(&self, state: &S) -> bool {
        self.engine.lock().await.unhost(state).await
    }

    /// Handle to the nested machine hosted by `state`.
    pub async fn child(&self, state: &S) -> Option<Self> {
        self.engine.lock().await.children.get(state).cloned()
    }

    /// Call `listener` after every committed transition on `event`.
    pub async fn on(&self, event: E, listener: Listener<S, E, D>) -> Subscription {
        self.engine
            .lock()
            .await
            .subscribers
            .subscribe(Some(event), listener)
    }

    /// Call `listener` after every committed transition.
    pub async fn on_any(&self, listener: Listener<S, E, D>) -> Subscription {
        self.engine.lock().await.subscribers.subscribe(None, listener)
    }

    /// Remove a listener. Returns whether it was still registered.
    pub async fn off(&self, subscription: Subscription) -> bool {
        self.engine.lock().await.subscribers.unsubscribe(subscription)
    }

    /// Register a dependency produced by a synchronous factory.
    pub async fn inject<T, F>(&self, name: impl Into<String>, factory: F) -> Result<(), MachineError>
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.register(name.into(), Factory::from_fn(factory)).await
    }

    /// Register a ready-made dependency.
    pub async fn inject_value<T>(&self, name: impl Into<String>, value: T) -> Result<(), MachineError>
    where
        T: Any + Send + Sync,
    {
        self.register(name.into(), Factory::value(value)).await
    }

    /// Register a dependency produced by an async factory.
    pub async fn inject_async<T, F, Fut>(
        &self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), MachineError>
    where
        T: Any + Send + Sync,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        self.register(name.into(), Factory::from_async(factory)).await
    }

    async fn register(&self, name: String, factory: Factory) -> Result<(), MachineError> {
        tracing::debug!(machine = %self.id, dependency = %name, "dependency registered");
        self.engine.lock().await.slot.register(name, factory).await
    }

    /// Read the context. `None` until the first dispatch or `can` resolved it.
    pub async fn inspect<R>(&self, f: impl FnOnce(&Context<D>) -> R) -> Option<R> {
        self.engine.lock().await.slot.context().map(f)
    }

    pub async fn history(&self) -> StateHistory<S, E> {
        self.engine.lock().await.history.clone()
    }

    /// Every state this machine can name: the initial state, transition
    /// sources and targets, and states hosting a nested machine.
    pub async fn known_states(&self) -> HashSet<S> {
        let engine = self.engine.lock().await;
        let mut states = engine.registry.states();
        states.insert(engine.initial.clone());
        states.extend(engine.children.keys().cloned());
        states
    }

    /// Every event some transition of this machine reacts to.
    pub async fn known_events(&self) -> HashSet<E> {
        self.engine.lock().await.registry.events()
    }
}

impl<S, E, D> StateMachine<S, E, D, ()>
where
    S: State,
    E: Event,
    D: Send + Sync + 'static,
{
    /// Dispatch an event that takes no arguments.
    pub async fn fire(&self, event: E) -> Result<S, MachineError> {
        self.transition(event, ()).await
    }
}
