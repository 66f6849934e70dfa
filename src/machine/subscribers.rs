//! Subscriber registry: listeners notified after a transition commits.

use crate::core::{BoxError, Context, Event, State};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

/// What a listener is told about a committed transition.
///
/// The notification is the listener's explicit receiver: it names the
/// machine and exposes its context read-only.
pub struct Notification<'a, S, E, D> {
    pub machine_id: &'a str,
    pub event: &'a E,
    pub from: &'a S,
    pub to: &'a S,
    pub context: &'a Context<D>,
}

/// Future returned by an asynchronous listener.
pub type ListenerFuture<'a> = BoxFuture<'a, Result<(), BoxError>>;

type ListenerFn<S, E, D> =
    dyn for<'a> Fn(Notification<'a, S, E, D>) -> ListenerFuture<'a> + Send + Sync;

/// Callback registered with `on` / `on_any`.
pub struct Listener<S, E, D> {
    f: Arc<ListenerFn<S, E, D>>,
}

impl<S, E, D> Listener<S, E, D> {
    pub fn from_async<F>(f: F) -> Self
    where
        F: for<'a> Fn(Notification<'a, S, E, D>) -> ListenerFuture<'a> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Notification<'_, S, E, D>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::from_async(move |notification| {
            let result = f(notification);
            Box::pin(async move { result })
        })
    }

    pub(crate) fn call<'a>(&self, notification: Notification<'a, S, E, D>) -> ListenerFuture<'a> {
        (self.f)(notification)
    }
}

impl<S, E, D> Clone for Listener<S, E, D> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

/// Token returned on registration; hand it back to `off` to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

type Entry<S, E, D> = (u64, Listener<S, E, D>);

pub(crate) struct Subscribers<S, E: Event, D> {
    next_id: u64,
    scoped: HashMap<E, Vec<Entry<S, E, D>>>,
    global: Vec<Entry<S, E, D>>,
}

impl<S: State, E: Event, D> Subscribers<S, E, D> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            scoped: HashMap::new(),
            global: Vec::new(),
        }
    }

    /// Register a listener for one event, or for every event when `event`
    /// is `None`.
    pub(crate) fn subscribe(&mut self, event: Option<E>, listener: Listener<S, E, D>) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        match event {
            Some(event) => self.scoped.entry(event).or_default().push((id, listener)),
            None => self.global.push((id, listener)),
        }
        Subscription { id }
    }

    pub(crate) fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.len();
        self.global.retain(|(id, _)| *id != subscription.id);
        self.scoped.retain(|_, entries| {
            entries.retain(|(id, _)| *id != subscription.id);
            !entries.is_empty()
        });
        self.len() < before
    }

    /// Listeners for `event`: scoped ones first, then global ones, each in
    /// registration order.
    pub(crate) fn listeners_for(&self, event: &E) -> Vec<Listener<S, E, D>> {
        self.scoped
            .get(event)
            .into_iter()
            .flatten()
            .chain(&self.global)
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.global.len() + self.scoped.values().map(Vec::len).sum::<usize>()
    }
}
