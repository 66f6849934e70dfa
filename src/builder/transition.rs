//! Builder for constructing state transitions.

use crate::builder::error::BuildError;
use crate::core::{Context, Event, Guard, GuardFuture, Hook, State};
use crate::machine::{Source, Transition};

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<S: State, E: Event, D, A> {
    from: Option<Source<S>>,
    event: Option<E>,
    to: Option<S>,
    guard: Option<Guard<D, A>>,
    on_enter: Option<Hook<D, A>>,
    on_exit: Option<Hook<D, A>>,
    on_leave: Option<Hook<D, A>>,
}

impl<S: State, E: Event, D, A> TransitionBuilder<S, E, D, A> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            to: None,
            guard: None,
            on_enter: None,
            on_exit: None,
            on_leave: None,
        }
    }

    /// Set the triggering event (required).
    pub fn on(mut self, event: E) -> Self {
        self.event = Some(event);
        self
    }

    /// Set a single source state.
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(Source::from(state));
        self
    }

    /// Set several source states; the transition is shared between them.
    pub fn from_states(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.from = Some(Source::States(states.into_iter().collect()));
        self
    }

    /// Match from any state without an exact transition for the event.
    pub fn from_any(mut self) -> Self {
        self.from = Some(Source::Any);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard predicate (optional).
    pub fn guard(mut self, guard: Guard<D, A>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Context<D>, &A) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Add a guard whose answer is produced by a future (optional).
    pub fn when_async<F>(mut self, predicate: F) -> Self
    where
        F: for<'a> Fn(&'a Context<D>, &'a A) -> GuardFuture<'a> + Send + Sync + 'static,
    {
        self.guard = Some(Guard::from_async(predicate));
        self
    }

    pub fn on_enter(mut self, hook: Hook<D, A>) -> Self {
        self.on_enter = Some(hook);
        self
    }

    pub fn on_exit(mut self, hook: Hook<D, A>) -> Self {
        self.on_exit = Some(hook);
        self
    }

    /// Hook run when the machine next leaves through another transition.
    pub fn on_leave(mut self, hook: Hook<D, A>) -> Self {
        self.on_leave = Some(hook);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, E, D, A>, BuildError> {
        let event = self.event.ok_or(BuildError::MissingEvent)?;
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(Transition {
            from,
            event,
            to,
            guard: self.guard,
            on_enter: self.on_enter,
            on_exit: self.on_exit,
            on_leave: self.on_leave,
        })
    }
}

impl<S: State, E: Event, D, A> Default for TransitionBuilder<S, E, D, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Injected;

    type Builder = TransitionBuilder<String, String, u32, ()>;

    fn s(value: &str) -> String {
        value.to_string()
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = Builder::new().from(s("draft")).to(s("assembly")).build();
        assert!(matches!(result, Err(BuildError::MissingEvent)));

        let result = Builder::new().on(s("create")).to(s("assembly")).build();
        assert!(matches!(result, Err(BuildError::MissingFromState)));

        let result = Builder::new().on(s("create")).from(s("draft")).build();
        assert!(matches!(result, Err(BuildError::MissingToState)));
    }

    #[tokio::test]
    async fn builder_with_guard() {
        let transition = Builder::new()
            .on(s("ship"))
            .from(s("assembly"))
            .to(s("shipping"))
            .when(|ctx, _| ctx.data >= 3)
            .build()
            .unwrap();

        assert!(transition.allows(&Context::new(3, Injected::default()), &()).await);
        assert!(!transition.allows(&Context::new(1, Injected::default()), &()).await);
    }

    #[tokio::test]
    async fn builder_with_async_guard() {
        let transition = Builder::new()
            .on(s("ship"))
            .from(s("assembly"))
            .to(s("shipping"))
            .when_async(|ctx, _| Box::pin(async move { ctx.data % 2 == 0 }))
            .build()
            .unwrap();

        assert!(transition.allows(&Context::new(4, Injected::default()), &()).await);
        assert!(!transition.allows(&Context::new(3, Injected::default()), &()).await);
    }

    #[test]
    fn multiple_sources_and_wildcard() {
        let shared = Builder::new()
            .on(s("ship"))
            .from_states([s("assembly"), s("warehouse")])
            .to(s("shipping"))
            .build()
            .unwrap();
        assert!(shared.matches(&s("warehouse"), &s("ship")));
        assert!(!shared.matches(&s("draft"), &s("ship")));

        let cancel = Builder::new()
            .on(s("cancel"))
            .from_any()
            .to(s("cancelled"))
            .build()
            .unwrap();
        assert_eq!(cancel.from, Source::Any);
    }

    #[test]
    fn hooks_are_carried_over() {
        let transition = Builder::new()
            .on(s("create"))
            .from(s("draft"))
            .to(s("assembly"))
            .on_enter(Hook::from_fn(|ctx: &mut Context<u32>, _: &()| {
                ctx.data += 1;
                Ok(())
            }))
            .on_leave(Hook::from_fn(|_: &mut Context<u32>, _: &()| Ok(())))
            .build()
            .unwrap();

        assert!(transition.on_enter.is_some());
        assert!(transition.on_exit.is_none());
        assert!(transition.on_leave.is_some());
    }
}
