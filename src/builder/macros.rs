//! Macros for ergonomic state machine construction.

/// Generate a `State` implementation for a simple enum.
///
/// The enum gets the derives the engine needs and `name()` returns the
/// variant name.
///
/// # Example
///
/// ```
/// use turnstile::state_enum;
/// use turnstile::core::State;
///
/// state_enum! {
///     pub enum OrderState {
///         Draft,
///         Assembly,
///         Shipping,
///         Delivered,
///     }
///     final: [Delivered]
/// }
///
/// assert_eq!(OrderState::Assembly.name(), "Assembly");
/// assert!(OrderState::Delivered.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> ::std::borrow::Cow<'_, str> {
                match self {
                    $(Self::$variant => ::std::borrow::Cow::Borrowed(stringify!($variant))),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}

/// Generate an `Event` implementation for a simple enum.
///
/// # Example
///
/// ```
/// use turnstile::event_enum;
/// use turnstile::core::Event;
///
/// event_enum! {
///     pub enum OrderEvent {
///         Create,
///         Ship,
///         Deliver,
///     }
/// }
///
/// assert_eq!(OrderEvent::Ship.name(), "Ship");
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Event for $name {
            fn name(&self) -> ::std::borrow::Cow<'_, str> {
                match self {
                    $(Self::$variant => ::std::borrow::Cow::Borrowed(stringify!($variant))),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Event, State};

    state_enum! {
        enum TestState {
            Initial,
            Processing,
            Complete,
            Failed,
        }
        final: [Complete, Failed]
    }

    event_enum! {
        enum TestEvent {
            Start,
            Finish,
        }
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        let state = TestState::Initial;
        assert_eq!(state.name(), "Initial");
        assert!(!state.is_final());

        assert!(TestState::Complete.is_final());
        assert!(TestState::Failed.is_final());
    }

    #[test]
    fn state_enum_supports_visibility() {
        state_enum! {
            pub enum PublicState {
                A,
                B,
            }
            final: [B]
        }

        let _state = PublicState::A;
    }

    #[test]
    fn state_enum_works_without_final() {
        state_enum! {
            enum MinimalState {
                One,
                Two,
            }
        }

        assert!(!MinimalState::One.is_final());
        assert!(!MinimalState::Two.is_final());
    }

    #[test]
    fn event_enum_macro_generates_trait() {
        assert_eq!(TestEvent::Start.name(), "Start");
        assert_ne!(TestEvent::Start, TestEvent::Finish);
    }

    #[test]
    fn generated_types_round_trip_through_json() {
        let json = serde_json::to_string(&TestState::Processing).unwrap();
        let back: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TestState::Processing);
    }
}
