//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and macros for creating state machines
//! with minimal boilerplate while maintaining type safety.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Context, Event, Guard, State};
use crate::machine::Transition;

/// Create an unconditional transition without hooks.
///
/// # Example
///
/// ```
/// use turnstile::builder::simple_transition;
/// use turnstile::{event_enum, state_enum};
///
/// state_enum! {
///     enum MyState {
///         Start,
///         End,
///     }
///     final: [End]
/// }
///
/// event_enum! {
///     enum MyEvent {
///         Finish,
///     }
/// }
///
/// let transition = simple_transition::<_, _, (), ()>(MyState::Start, MyEvent::Finish, MyState::End);
/// assert!(transition.matches(&MyState::Start, &MyEvent::Finish));
/// ```
pub fn simple_transition<S, E, D, A>(from: S, event: E, to: S) -> Transition<S, E, D, A>
where
    S: State,
    E: Event,
{
    Transition::new(from, event, to)
}

/// Create a transition with a guard predicate.
///
/// # Example
///
/// ```
/// use turnstile::builder::guarded_transition;
///
/// let transition = guarded_transition::<String, String, u32, (), _>(
///     "assembly".to_string(),
///     "ship".to_string(),
///     "shipping".to_string(),
///     |ctx, _| ctx.data > 0,
/// );
/// assert!(transition.guard.is_some());
/// ```
pub fn guarded_transition<S, E, D, A, F>(from: S, event: E, to: S, guard: F) -> Transition<S, E, D, A>
where
    S: State,
    E: Event,
    F: Fn(&Context<D>, &A) -> bool + Send + Sync + 'static,
{
    Transition {
        guard: Some(Guard::new(guard)),
        ..Transition::new(from, event, to)
    }
}
