//! Build-time configuration validation.
//!
//! A machine's configuration is checked once, when it is built, using
//! Stillwater's `Validation` type so that every violation is reported in a
//! single pass instead of stopping at the first one.
//!
//! Built-in rules:
//! - a transition must list at least one source state
//! - a final state may not be the explicit source of a transition
//! - a state may host at most one nested machine
//!
//! Transitions can be added after the build, so two cross-reference rules
//! only fail the build under [`ConfigRules::strict`] and are logged as
//! warnings otherwise:
//! - a state hosting a nested machine must be reachable
//! - subscribers may only scope to events some transition uses
//!
//! # Example
//!
//! ```rust
//! use turnstile::validation::{ConfigRules, MachineConfig};
//!
//! let rules: ConfigRules<String, String> = ConfigRules::new()
//!     .strict()
//!     .require_pred(|config: &MachineConfig<String, String>| !config.transitions.is_empty(), "empty machine");
//! # let _ = rules;
//! ```

mod config;
mod rules;
mod violations;

pub use config::{MachineConfig, TransitionShape};
pub use rules::{ConfigCheck, ConfigRules, ConfigValidation};
pub use violations::ConfigViolation;
