//! Configuration rules checked at build time using Validation.

use crate::core::{Event, State};
use crate::machine::Source;
use crate::validation::config::MachineConfig;
use crate::validation::violations::ConfigViolation;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Result of checking one or more rules.
pub type ConfigValidation = Validation<(), NonEmptyVec<ConfigViolation>>;

/// Type alias for custom configuration checks
pub type ConfigCheck<S, E> = Box<dyn Fn(&MachineConfig<S, E>) -> ConfigValidation + Send + Sync>;

/// The rules a configuration must satisfy. The structural rules always
/// run; custom checks run after them.
///
/// Host reachability and subscription checks look for transitions that may
/// still be added at runtime, so they only fail the build in
/// [`strict`](Self::strict) mode. Otherwise their findings are logged.
pub struct ConfigRules<S: State, E: Event> {
    pub(crate) custom: Vec<ConfigCheck<S, E>>,
    strict: bool,
}

impl<S: State, E: Event> ConfigRules<S, E> {
    pub fn new() -> Self {
        Self {
            custom: Vec::new(),
            strict: false,
        }
    }

    /// Treat unreachable host states and subscriptions to unknown events
    /// as violations.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Add a custom check returning a Validation.
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&MachineConfig<S, E>) -> ConfigValidation + Send + Sync + 'static,
    {
        self.custom.push(Box::new(check));
        self
    }

    /// Add a custom predicate; `message` is reported when it returns false.
    pub fn require_pred<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&MachineConfig<S, E>) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.require(move |config| {
            if predicate(config) {
                Validation::success(())
            } else {
                Validation::fail(ConfigViolation::CustomCheckFailed {
                    message: message.clone(),
                })
            }
        })
    }

    /// Check every rule, accumulating ALL violations.
    pub fn check(&self, config: &MachineConfig<S, E>) -> ConfigValidation {
        let mut checks = vec![
            non_empty_sources(config),
            no_exit_from_final(config),
            hosts_unique(config),
        ];

        let cross_references = [hosts_reachable(config), subscriptions_known(config)];
        if self.strict {
            checks.extend(cross_references);
        } else {
            for outcome in cross_references {
                if let Validation::Failure(violations) = outcome {
                    for violation in violations.iter() {
                        tracing::warn!(%violation, "configuration refers to something not registered yet");
                    }
                }
            }
        }

        checks.extend(self.custom.iter().map(|check| check(config)));

        Validation::all_vec(checks).map(|_| ())
    }
}

impl<S: State, E: Event> Default for ConfigRules<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

fn collect(violations: Vec<ConfigViolation>) -> ConfigValidation {
    let checks: Vec<ConfigValidation> = violations
        .into_iter()
        .map(|violation| Validation::fail(violation))
        .collect();
    Validation::all_vec(checks).map(|_| ())
}

fn non_empty_sources<S: State, E: Event>(config: &MachineConfig<S, E>) -> ConfigValidation {
    collect(
        config
            .transitions
            .iter()
            .filter(|t| matches!(&t.from, Source::States(states) if states.is_empty()))
            .map(|t| ConfigViolation::EmptySourceSet {
                event: t.event.name().into_owned(),
                to: t.to.name().into_owned(),
            })
            .collect(),
    )
}

/// Wildcard transitions are exempt; they only ever match non-final states
/// by the caller's choice.
fn no_exit_from_final<S: State, E: Event>(config: &MachineConfig<S, E>) -> ConfigValidation {
    let mut violations = Vec::new();
    for t in &config.transitions {
        if let Source::States(states) = &t.from {
            violations.extend(states.iter().filter(|s| s.is_final()).map(|state| {
                ConfigViolation::TransitionFromFinalState {
                    state: state.name().into_owned(),
                    event: t.event.name().into_owned(),
                }
            }));
        }
    }
    collect(violations)
}

fn hosts_reachable<S: State, E: Event>(config: &MachineConfig<S, E>) -> ConfigValidation {
    let mut seen = HashSet::new();
    collect(
        config
            .hosts
            .iter()
            .filter(|host| seen.insert(*host) && !config.is_reachable(host))
            .map(|host| ConfigViolation::UnreachableHostState {
                state: host.name().into_owned(),
            })
            .collect(),
    )
}

fn hosts_unique<S: State, E: Event>(config: &MachineConfig<S, E>) -> ConfigValidation {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    collect(
        config
            .hosts
            .iter()
            .filter(|host| !seen.insert(*host) && reported.insert(*host))
            .map(|host| ConfigViolation::DuplicateHostState {
                state: host.name().into_owned(),
            })
            .collect(),
    )
}

fn subscriptions_known<S: State, E: Event>(config: &MachineConfig<S, E>) -> ConfigValidation {
    let mut seen = HashSet::new();
    collect(
        config
            .subscribed_events
            .iter()
            .filter(|event| seen.insert(*event) && !config.knows_event(event))
            .map(|event| ConfigViolation::UnknownSubscribedEvent {
                event: event.name().into_owned(),
            })
            .collect(),
    )
}
