//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{BoxError, Event, State};
use crate::machine::{
    ContextSlot, DataInit, Engine, Factory, Listener, Registry, StateMachine, Subscribers,
    Transition,
};
use crate::validation::{ConfigRules, ConfigValidation, MachineConfig, TransitionShape};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use stillwater::validation::Validation;

type StatesFactory<S, E, D, A> =
    Box<dyn FnOnce() -> Vec<(S, StateMachineBuilder<S, E, D, A>)> + Send>;

/// Builder for constructing state machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use turnstile::{StateMachineBuilder, TransitionBuilder};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let machine = StateMachineBuilder::<String, String>::new()
///     .initial("draft".to_string())
///     .transition(
///         TransitionBuilder::new()
///             .on("create".to_string())
///             .from("draft".to_string())
///             .to("assembly".to_string()),
///     )?
///     .build()?;
///
/// assert_eq!(machine.fire("create".to_string()).await?, "assembly");
/// # Ok(())
/// # }
/// ```
pub struct StateMachineBuilder<S: State, E: Event, D = (), A = ()> {
    id: Option<String>,
    initial: Option<S>,
    data: DataInit<D>,
    transitions: Vec<Transition<S, E, D, A>>,
    subscriptions: Vec<(Option<E>, Listener<S, E, D>)>,
    states: Vec<(S, StateMachineBuilder<S, E, D, A>)>,
    state_factories: Vec<StatesFactory<S, E, D, A>>,
    dependencies: Vec<(String, Factory)>,
    rules: ConfigRules<S, E>,
}

impl<S, E, D, A> StateMachineBuilder<S, E, D, A>
where
    S: State,
    E: Event,
    D: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// Create a builder whose contexts start from a copy of `data`.
    /// Use this when `D` has no `Default`.
    pub fn with_data(data: D) -> Self
    where
        D: Clone,
    {
        Self::with_data_fn(move || data.clone())
    }

    /// Create a builder whose contexts start from whatever `init` returns.
    pub fn with_data_fn<F>(init: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
    {
        Self {
            id: None,
            initial: None,
            data: sync_init(init),
            transitions: Vec::new(),
            subscriptions: Vec::new(),
            states: Vec::new(),
            state_factories: Vec::new(),
            dependencies: Vec::new(),
            rules: ConfigRules::new(),
        }
    }

    /// Set the machine id. Defaults to a fresh UUID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Start every context from a copy of `data`.
    pub fn data(self, data: D) -> Self
    where
        D: Clone,
    {
        self.data_with(move || data.clone())
    }

    /// Produce the data with a synchronous function. Called on first use
    /// and again whenever the machine is reset as a nested child.
    pub fn data_with<F>(mut self, init: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
    {
        self.data = sync_init(init);
        self
    }

    /// Produce the data asynchronously. A failure surfaces as
    /// [`MachineError::Initialization`](crate::MachineError::Initialization)
    /// and is retried on the next call.
    pub fn data_async<F, Fut>(mut self, init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<D, BoxError>> + Send + 'static,
    {
        self.data = Arc::new(move || init().boxed());
        self
    }

    /// Go back to starting every context from `D::default()`.
    pub fn default_data(self) -> Self
    where
        D: Default,
    {
        self.data_with(D::default)
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, E, D, A>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, E, D, A>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, E, D, A>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Call `listener` after every committed transition on `event`.
    pub fn subscribe(mut self, event: E, listener: Listener<S, E, D>) -> Self {
        self.subscriptions.push((Some(event), listener));
        self
    }

    /// Call `listener` after every committed transition.
    pub fn subscribe_all(mut self, listener: Listener<S, E, D>) -> Self {
        self.subscriptions.push((None, listener));
        self
    }

    /// Host a nested machine in `state`.
    pub fn state(mut self, state: S, child: StateMachineBuilder<S, E, D, A>) -> Self {
        self.states.push((state, child));
        self
    }

    /// Host several nested machines produced by `factory`. The factory runs
    /// once, during `build`.
    pub fn states<F>(mut self, factory: F) -> Self
    where
        F: FnOnce() -> Vec<(S, StateMachineBuilder<S, E, D, A>)> + Send + 'static,
    {
        self.state_factories.push(Box::new(factory));
        self
    }

    /// Register a dependency produced by a synchronous factory.
    pub fn inject<T, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.dependencies.push((name.into(), Factory::from_fn(factory)));
        self
    }

    /// Register a ready-made dependency.
    pub fn inject_value<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.dependencies.push((name.into(), Factory::value(value)));
        self
    }

    /// Register a dependency produced by an async factory.
    pub fn inject_async<T, F, Fut>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        self.dependencies
            .push((name.into(), Factory::from_async(factory)));
        self
    }

    /// Fail the build on unreachable host states and on subscriptions to
    /// events no transition uses. Without this they are only logged.
    pub fn strict(mut self) -> Self {
        self.rules = self.rules.strict();
        self
    }

    /// Add a custom configuration check run by `build`.
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&MachineConfig<S, E>) -> ConfigValidation + Send + Sync + 'static,
    {
        self.rules = self.rules.require(check);
        self
    }

    /// Add a custom configuration predicate run by `build`.
    pub fn require_pred<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&MachineConfig<S, E>) -> bool + Send + Sync + 'static,
    {
        self.rules = self.rules.require_pred(predicate, message);
        self
    }

    /// Build the state machine.
    /// Returns an error if required fields are missing or if the
    /// configuration breaks any rule; every broken rule is reported.
    pub fn build(self) -> Result<StateMachine<S, E, D, A>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let mut states = self.states;
        for factory in self.state_factories {
            states.extend(factory());
        }

        let config = MachineConfig {
            initial: initial.clone(),
            transitions: self.transitions.iter().map(TransitionShape::from).collect(),
            hosts: states.iter().map(|(state, _)| state.clone()).collect(),
            subscribed_events: self
                .subscriptions
                .iter()
                .filter_map(|(event, _)| event.clone())
                .collect(),
        };
        if let Validation::Failure(errors) = self.rules.check(&config) {
            return Err(BuildError::Invalid {
                violations: errors.iter().cloned().collect(),
            });
        }

        let mut children = HashMap::new();
        for (state, builder) in states {
            let child = builder.build().map_err(|source| BuildError::Nested {
                state: state.name().into_owned(),
                source: Box::new(source),
            })?;
            children.insert(state, child);
        }

        let mut registry = Registry::new();
        for transition in self.transitions {
            registry.add(transition);
        }

        let mut subscribers = Subscribers::new();
        for (event, listener) in self.subscriptions {
            subscribers.subscribe(event, listener);
        }

        let id = self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        tracing::debug!(
            machine = %id,
            initial = %initial.name(),
            nested = children.len(),
            "machine built"
        );

        let slot = ContextSlot::new(self.data, self.dependencies);
        Ok(StateMachine::from_engine(Engine::new(
            id,
            initial,
            registry,
            subscribers,
            slot,
            children,
        )))
    }
}

impl<S, E, D, A> StateMachineBuilder<S, E, D, A>
where
    S: State,
    E: Event,
    D: Default + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// Create a new builder. Contexts start from `D::default()` unless
    /// [`data`](Self::data), [`data_with`](Self::data_with) or
    /// [`data_async`](Self::data_async) says otherwise.
    pub fn new() -> Self {
        Self::with_data_fn(D::default)
    }
}

impl<S, E, D, A> Default for StateMachineBuilder<S, E, D, A>
where
    S: State,
    E: Event,
    D: Default + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

fn sync_init<D, F>(init: F) -> DataInit<D>
where
    D: Send + 'static,
    F: Fn() -> D + Send + Sync + 'static,
{
    Arc::new(move || {
        let data = init();
        async move { Ok(data) }.boxed()
    })
}
