//! Named accessors generated from a machine's states and events.
//!
//! For a machine with a `Draft` state and a `Create` event the table holds
//! `is_draft`, `can_create` and `create`. The table is generated once and
//! only calls the machine's public `is`, `can` and `transition`; states or
//! events added afterwards need a fresh table.

use crate::core::{Event, State};
use crate::machine::{MachineError, StateMachine};
use std::collections::BTreeMap;

/// What a generated name stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accessor<S, E> {
    Is(S),
    Can(E),
    Fire(E),
}

/// Result of calling an accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessorOutput<S> {
    /// From `is_*` and `can_*`.
    Flag(bool),
    /// From an event accessor: the state the machine ended up in.
    State(S),
}

pub struct Accessors<S: State, E: Event, D = (), A = ()> {
    machine: StateMachine<S, E, D, A>,
    table: BTreeMap<String, Accessor<S, E>>,
}

impl<S, E, D, A> Accessors<S, E, D, A>
where
    S: State,
    E: Event,
    D: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// Build the table from the machine's current states and events.
    ///
    /// When two identifiers produce the same name the first one, in name
    /// order with states before events, keeps it.
    pub async fn generate(machine: &StateMachine<S, E, D, A>) -> Self {
        let mut states: Vec<S> = machine.known_states().await.into_iter().collect();
        states.sort_by(|a, b| a.name().cmp(&b.name()));
        let mut events: Vec<E> = machine.known_events().await.into_iter().collect();
        events.sort_by(|a, b| a.name().cmp(&b.name()));

        let mut table = BTreeMap::new();
        let mut claim = |name: String, accessor: Accessor<S, E>| {
            if let Some(existing) = table.get(&name) {
                tracing::warn!(
                    machine = machine.id(),
                    name = %name,
                    kept = ?existing,
                    dropped = ?accessor,
                    "accessor name collision"
                );
            } else {
                table.insert(name, accessor);
            }
        };

        for state in states {
            claim(format!("is_{}", snake_case(&state.name())), Accessor::Is(state));
        }
        for event in events {
            let name = snake_case(&event.name());
            claim(format!("can_{name}"), Accessor::Can(event.clone()));
            claim(name, Accessor::Fire(event));
        }

        Self {
            machine: machine.clone(),
            table,
        }
    }

    /// Generated names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Accessor<S, E>> {
        self.table.get(name)
    }

    /// Run the accessor called `name`. `None` if no such accessor exists.
    /// `args` is ignored by `is_*` accessors.
    pub async fn call(&self, name: &str, args: A) -> Option<Result<AccessorOutput<S>, MachineError>> {
        let accessor = self.table.get(name)?;
        let output = match accessor {
            Accessor::Is(state) => Ok(AccessorOutput::Flag(self.machine.is(state).await)),
            Accessor::Can(event) => self
                .machine
                .can(event.clone(), args)
                .await
                .map(AccessorOutput::Flag),
            Accessor::Fire(event) => self
                .machine
                .transition(event.clone(), args)
                .await
                .map(AccessorOutput::State),
        };
        Some(output)
    }
}

/// `DontWalk`, `dont-walk` and `dont walk` all become `dont_walk`.
fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
