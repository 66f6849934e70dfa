//! Turnstile: an asynchronous finite-state-machine engine
//!
//! A machine tracks the current state of one entity (an order, a document,
//! a traffic light) and moves it along a declarative transition table when
//! events are dispatched. Each dispatch selects the first transition whose
//! guard passes, runs its lifecycle hooks in a fixed order, commits the new
//! state and notifies subscribers.
//!
//! # Core Concepts
//!
//! - **State / Event**: opaque, comparable identifiers via the `State` and
//!   `Event` traits; generate them for enums with [`state_enum!`] and
//!   [`event_enum!`]
//! - **Context**: application data plus lazily resolved dependencies,
//!   owned by one machine and handed to guards and hooks
//! - **Guards**: pure predicates that decide which transition fires
//! - **Hooks**: async `on_leave` / `on_enter` / `on_exit` callbacks that may
//!   mutate the context
//! - **Nested machines**: a state may host a child machine that sees events
//!   first while the parent is in that state
//! - **History and checkpoints**: every committed transition is recorded;
//!   the position of a machine can be saved and restored
//!
//! # Example
//!
//! ```rust
//! use turnstile::{event_enum, state_enum, Context, Hook, StateMachineBuilder, TransitionBuilder};
//!
//! state_enum! {
//!     enum Order {
//!         Draft,
//!         Assembly,
//!         Shipping,
//!     }
//! }
//!
//! event_enum! {
//!     enum OrderEvent {
//!         Create,
//!         Ship,
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let order = StateMachineBuilder::<Order, OrderEvent, Vec<String>>::new()
//!     .initial(Order::Draft)
//!     .transition(
//!         TransitionBuilder::new()
//!             .on(OrderEvent::Create)
//!             .from(Order::Draft)
//!             .to(Order::Assembly)
//!             .on_enter(Hook::from_fn(|ctx: &mut Context<Vec<String>>, _: &()| {
//!                 ctx.data.push("assembling".to_string());
//!                 Ok(())
//!             })),
//!     )?
//!     .transition(
//!         TransitionBuilder::new()
//!             .on(OrderEvent::Ship)
//!             .from(Order::Assembly)
//!             .to(Order::Shipping),
//!     )?
//!     .build()?;
//!
//! order.fire(OrderEvent::Create).await?;
//! order.fire(OrderEvent::Ship).await?;
//!
//! assert!(order.is(&Order::Shipping).await);
//! assert!(order.fire(OrderEvent::Create).await.unwrap_err().is_invalid_transition());
//! # Ok(())
//! # }
//! ```

pub mod accessors;
pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod machine;
pub mod validation;

pub use accessors::{Accessor, AccessorOutput, Accessors};
pub use builder::{BuildError, StateMachineBuilder, TransitionBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use core::{BoxError, Context, Event, Guard, Hook, HookKind, State, StateHistory};
pub use machine::{Listener, MachineError, Notification, Source, StateMachine, Subscription, Transition};
