//! The state owned by one machine instance.

use super::container::ContextSlot;
use super::handle::StateMachine;
use super::registry::Registry;
use super::subscribers::Subscribers;
use super::transition::Transition;
use crate::core::{Event, State, StateHistory};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything one machine owns. Only ever touched through the instance
/// lock held by [`StateMachine`].
pub(crate) struct Engine<S: State, E: Event, D, A> {
    pub(crate) id: String,
    pub(crate) initial: S,
    pub(crate) current: S,
    pub(crate) registry: Registry<S, E, D, A>,
    pub(crate) subscribers: Subscribers<S, E, D>,
    pub(crate) slot: ContextSlot<D>,
    /// Winner of the previous dispatch; its `on_leave` runs next time.
    pub(crate) last: Option<Arc<Transition<S, E, D, A>>>,
    pub(crate) children: HashMap<S, StateMachine<S, E, D, A>>,
    pub(crate) history: StateHistory<S, E>,
}

impl<S: State, E: Event, D, A> Engine<S, E, D, A> {
    pub(crate) fn new(
        id: String,
        initial: S,
        registry: Registry<S, E, D, A>,
        subscribers: Subscribers<S, E, D>,
        slot: ContextSlot<D>,
        children: HashMap<S, StateMachine<S, E, D, A>>,
    ) -> Self {
        Self {
            id,
            current: initial.clone(),
            initial,
            registry,
            subscribers,
            slot,
            last: None,
            children,
            history: StateHistory::new(),
        }
    }
}
