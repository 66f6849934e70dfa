//! Identifier traits for states and events.
//!
//! The engine never looks inside a state or an event. It only compares,
//! hashes and names them, so any identifier domain works: enums, strings
//! or integers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Clone`: states are copied into history records and checkpoints
/// - `Eq` + `Hash`: states index the transition registry and nested machines
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states must be serializable for checkpoints
///
/// # Example
///
/// ```rust
/// use turnstile::core::State;
/// use serde::{Deserialize, Serialize};
/// use std::borrow::Cow;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum OrderState {
///     Draft,
///     Shipping,
///     Delivered,
/// }
///
/// impl State for OrderState {
///     fn name(&self) -> Cow<'_, str> {
///         match self {
///             Self::Draft => "Draft".into(),
///             Self::Shipping => "Shipping".into(),
///             Self::Delivered => "Delivered".into(),
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Delivered)
///     }
/// }
///
/// assert_eq!(OrderState::Draft.name(), "Draft");
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the state's name for display and logging.
    fn name(&self) -> Cow<'_, str>;

    /// Check if this is a final (terminal) state.
    ///
    /// Transitions declared out of a final state are rejected when a
    /// machine is built. Wildcard transitions are not affected.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

/// Trait for the events that trigger transitions.
///
/// Events carry the same constraints as [`State`]; they are opaque,
/// comparable identifiers.
pub trait Event:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the event's name for display and logging.
    fn name(&self) -> Cow<'_, str>;
}

impl State for String {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl Event for String {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

macro_rules! integer_identifiers {
    ($($ty:ty),* $(,)?) => {
        $(
            impl State for $ty {
                fn name(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }

            impl Event for $ty {
                fn name(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

integer_identifiers!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
