//! Core state machine types.
//!
//! This module contains the building blocks every machine is made of:
//! - State and event identifiers via the `State` and `Event` traits
//! - The shared `Context` and its injected dependencies
//! - Guard predicates and lifecycle hooks
//! - Immutable history tracking

mod context;
mod guard;
mod history;
mod hook;
mod state;

pub(crate) use context::Resolved;
pub use context::{BoxError, Context, Injected};
pub use guard::{Guard, GuardFuture};
pub use history::{StateHistory, StateTransition};
pub use hook::{Hook, HookFuture, HookKind};
pub use state::{Event, State};
