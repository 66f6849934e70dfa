//! The mutable context shared by guards, hooks and listeners.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error type returned by hooks, listeners and factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type-erased value produced by a dependency factory.
pub(crate) type Resolved = Arc<dyn Any + Send + Sync>;

/// Application data plus the dependencies resolved for one machine.
///
/// A machine owns exactly one context. Hooks receive it as `&mut`, guards
/// and listeners as `&`, and callers outside a dispatch read it through
/// [`StateMachine::inspect`](crate::StateMachine::inspect).
pub struct Context<D> {
    /// Application-defined payload.
    pub data: D,
    /// Collaborators supplied through the dependency container.
    pub injected: Injected,
}

impl<D> Context<D> {
    pub(crate) fn new(data: D, injected: Injected) -> Self {
        Self { data, injected }
    }

    /// Shorthand for `self.injected.get::<T>(name)`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.injected.get(name)
    }
}

impl<D: fmt::Debug> fmt::Debug for Context<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("data", &self.data)
            .field("injected", &self.injected)
            .finish()
    }
}

/// Resolved dependencies, keyed by name.
#[derive(Clone, Default)]
pub struct Injected {
    values: HashMap<String, Resolved>,
}

impl Injected {
    /// Look up a dependency and downcast it to `T`.
    ///
    /// Returns `None` when the name is unknown or was registered with a
    /// different type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|value| value.downcast_ref::<T>())
    }

    /// Like [`get`](Self::get), but returns the shared handle.
    pub fn get_arc<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.values
            .get(name)
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, name: String, value: Resolved) {
        self.values.insert(name, value);
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Injected").field("names", &names).finish()
    }
}
