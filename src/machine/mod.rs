//! The running machine: transition registry, dispatch pipeline, dependency
//! container, subscribers and nested composition behind one async handle.
//!
//! Dispatching an event runs these steps in order, each awaited before the
//! next:
//!
//! 1. resolve the context on first use
//! 2. offer the event to the child hosted by the current state
//! 3. pick the first candidate whose guard passes
//! 4. `on_leave` of the previous winner
//! 5. `on_enter` of the new winner
//! 6. commit the new state
//! 7. notify subscribers
//! 8. `on_exit` of the new winner

mod container;
mod dispatch;
mod engine;
mod error;
mod handle;
mod nested;
mod registry;
mod subscribers;
mod transition;

pub(crate) use container::{ContextSlot, DataInit, Factory};
pub(crate) use engine::Engine;
pub(crate) use registry::Registry;
pub(crate) use subscribers::Subscribers;

pub use error::MachineError;
pub use handle::StateMachine;
pub use subscribers::{Listener, ListenerFuture, Notification, Subscription};
pub use transition::{Source, Transition};
