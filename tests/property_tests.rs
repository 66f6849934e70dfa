//! Property-based tests for dispatch, queries and history.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated transition tables and event sequences.

use chrono::Utc;
use proptest::prelude::*;
use turnstile::core::{Event, State, StateHistory, StateTransition};
use turnstile::{event_enum, state_enum, Checkpoint, Source, StateMachine, StateMachineBuilder, Transition};

state_enum! {
    enum Phase {
        Idle,
        Running,
        Paused,
        Done,
    }
}

event_enum! {
    enum Signal {
        Start,
        Pause,
        Resume,
        Stop,
    }
}

const PHASES: [Phase; 4] = [Phase::Idle, Phase::Running, Phase::Paused, Phase::Done];
const SIGNALS: [Signal; 4] = [Signal::Start, Signal::Pause, Signal::Resume, Signal::Stop];

prop_compose! {
    fn arbitrary_phase()(variant in 0..4usize) -> Phase {
        PHASES[variant].clone()
    }
}

prop_compose! {
    fn arbitrary_signal()(variant in 0..4usize) -> Signal {
        SIGNALS[variant].clone()
    }
}

/// `None` as a source stands for the wildcard.
type Row = (Option<Phase>, Signal, Phase);

prop_compose! {
    fn arbitrary_row()(
        wildcard in prop::bool::weighted(0.2),
        from in arbitrary_phase(),
        signal in arbitrary_signal(),
        to in arbitrary_phase(),
    ) -> Row {
        (if wildcard { None } else { Some(from) }, signal, to)
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn machine(rows: &[Row]) -> StateMachine<Phase, Signal> {
    let transitions: Vec<Transition<Phase, Signal, (), ()>> = rows
        .iter()
        .map(|(from, signal, to)| {
            let source = from.clone().map_or(Source::Any, Source::from);
            Transition::new(source, signal.clone(), to.clone())
        })
        .collect();

    StateMachineBuilder::new()
        .initial(Phase::Idle)
        .transitions(transitions)
        .build()
        .unwrap()
}

/// What dispatch should do: first exact row in order, else first wildcard.
fn expected(rows: &[Row], current: &Phase, signal: &Signal) -> Option<Phase> {
    rows.iter()
        .find(|(from, s, _)| s == signal && from.as_ref() == Some(current))
        .or_else(|| rows.iter().find(|(from, s, _)| s == signal && from.is_none()))
        .map(|(_, _, to)| to.clone())
}

proptest! {
    #[test]
    fn dispatch_follows_the_table(
        rows in prop::collection::vec(arbitrary_row(), 1..12),
        signals in prop::collection::vec(arbitrary_signal(), 0..12),
    ) {
        runtime().block_on(async {
            let machine = machine(&rows);
            let mut current = Phase::Idle;

            for signal in signals {
                let outcome = machine.fire(signal.clone()).await;
                match expected(&rows, &current, &signal) {
                    Some(to) => {
                        prop_assert_eq!(outcome.unwrap(), to.clone());
                        current = to;
                    }
                    None => {
                        prop_assert!(outcome.unwrap_err().is_invalid_transition());
                    }
                }
                prop_assert_eq!(machine.state().await, current.clone());
            }
            Ok(())
        })?;
    }

    #[test]
    fn can_never_mutates(
        rows in prop::collection::vec(arbitrary_row(), 1..12),
        signals in prop::collection::vec(arbitrary_signal(), 1..12),
    ) {
        runtime().block_on(async {
            let machine = machine(&rows);

            for signal in signals {
                let before = machine.state().await;
                let history_len = machine.history().await.len();

                let allowed = machine.can(signal.clone(), ()).await.unwrap();
                prop_assert_eq!(allowed, expected(&rows, &before, &signal).is_some());
                prop_assert_eq!(machine.state().await, before);
                prop_assert_eq!(machine.history().await.len(), history_len);

                let _ = machine.fire(signal).await;
            }
            Ok(())
        })?;
    }

    #[test]
    fn history_matches_successful_dispatches(
        rows in prop::collection::vec(arbitrary_row(), 1..12),
        signals in prop::collection::vec(arbitrary_signal(), 0..12),
    ) {
        runtime().block_on(async {
            let machine = machine(&rows);
            let mut path = vec![Phase::Idle];

            for signal in signals {
                if let Ok(to) = machine.fire(signal).await {
                    path.push(to);
                }
            }

            let history = machine.history().await;
            if history.is_empty() {
                prop_assert_eq!(path.len(), 1);
            } else {
                let recorded: Vec<Phase> = history.get_path().into_iter().cloned().collect();
                prop_assert_eq!(recorded, path);
            }
            Ok(())
        })?;
    }

    #[test]
    fn remove_transition_is_idempotent(
        rows in prop::collection::vec(arbitrary_row(), 1..12),
        from in arbitrary_phase(),
        signal in arbitrary_signal(),
    ) {
        runtime().block_on(async {
            let machine = machine(&rows);

            machine.remove_transition(from.clone(), signal.clone(), None).await;
            let state = machine.state().await;
            prop_assert_eq!(machine.remove_transition(from.clone(), signal.clone(), None).await, 0);
            prop_assert_eq!(machine.state().await, state);

            if from == Phase::Idle {
                let remaining: Vec<Row> = rows
                    .iter()
                    .filter(|(f, s, _)| !(f.as_ref() == Some(&from) && *s == signal))
                    .cloned()
                    .collect();
                let allowed = machine.can(signal.clone(), ()).await.unwrap();
                prop_assert_eq!(allowed, expected(&remaining, &Phase::Idle, &signal).is_some());
            }
            Ok(())
        })?;
    }

    #[test]
    fn checkpoint_restores_position(
        rows in prop::collection::vec(arbitrary_row(), 1..12),
        signals in prop::collection::vec(arbitrary_signal(), 0..12),
    ) {
        runtime().block_on(async {
            let original = machine(&rows);
            for signal in signals {
                let _ = original.fire(signal).await;
            }

            let bytes = original.checkpoint().await.to_binary().unwrap();
            let resumed = machine(&rows);
            resumed.restore(Checkpoint::from_binary(&bytes).unwrap()).await.unwrap();

            prop_assert_eq!(resumed.state().await, original.state().await);
            prop_assert_eq!(resumed.history().await.len(), original.history().await.len());
            Ok(())
        })?;
    }

    #[test]
    fn identifier_names_are_stable(phase in arbitrary_phase(), signal in arbitrary_signal()) {
        prop_assert_eq!(phase.name(), phase.name());
        prop_assert_eq!(signal.name(), signal.name());
        prop_assert!(!phase.is_final());
    }

    #[test]
    fn history_preserves_order(
        phases in prop::collection::vec(arbitrary_phase(), 1..10)
    ) {
        let mut history = StateHistory::new();
        let mut expected_path = vec![Phase::Idle];

        for (i, to) in phases.iter().enumerate() {
            let from = if i == 0 { Phase::Idle } else { phases[i - 1].clone() };
            history = history.record(StateTransition {
                from,
                to: to.clone(),
                event: Signal::Start,
                timestamp: Utc::now(),
            });
            expected_path.push(to.clone());
        }

        let path = history.get_path();
        prop_assert_eq!(path.len(), expected_path.len());
        for (i, phase) in path.iter().enumerate() {
            prop_assert_eq!(*phase, &expected_path[i]);
        }
    }

    #[test]
    fn history_roundtrip_serialization(
        phases in prop::collection::vec(arbitrary_phase(), 0..5)
    ) {
        let mut history = StateHistory::new();
        for (i, to) in phases.iter().enumerate() {
            let from = if i == 0 { Phase::Idle } else { phases[i - 1].clone() };
            history = history.record(StateTransition {
                from,
                to: to.clone(),
                event: Signal::Stop,
                timestamp: Utc::now(),
            });
        }

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<Phase, Signal> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(history.transitions().len(), deserialized.transitions().len());
    }
}
