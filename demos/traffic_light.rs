//! Traffic Light with a Pedestrian Crossing
//!
//! A cyclic machine whose red phase hosts a nested pedestrian signal.
//!
//! Key concepts:
//! - Cyclic state transitions (states repeat)
//! - A child machine that sees events first while its host state is active
//! - Events the child does not know fall through to the parent
//! - Re-entering the host state resets the child
//!
//! Run with: cargo run --example traffic_light

use turnstile::{event_enum, state_enum, Listener, StateMachine, StateMachineBuilder, Transition};

state_enum! {
    enum Light {
        Red,
        Yellow,
        Green,
        DontWalk,
        Walk,
    }
}

event_enum! {
    enum Timer {
        Next,
        Press,
        Timeout,
    }
}

fn pedestrian_signal() -> StateMachineBuilder<Light, Timer> {
    StateMachineBuilder::new()
        .id("pedestrian")
        .initial(Light::DontWalk)
        .add_transition(Transition::new(Light::DontWalk, Timer::Press, Light::Walk))
        .add_transition(Transition::new(Light::Walk, Timer::Timeout, Light::DontWalk))
}

async fn report(light: &StateMachine<Light, Timer>) {
    let walk = if light.is(&Light::Walk).await { "walk" } else { "don't walk" };
    println!("  now {:?} / pedestrians: {walk}", light.state().await);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Traffic Light State Machine ===\n");

    let light = StateMachineBuilder::new()
        .id("crossing")
        .initial(Light::Red)
        .transitions(vec![
            Transition::new(Light::Red, Timer::Next, Light::Green),
            Transition::new(Light::Green, Timer::Next, Light::Yellow),
            Transition::new(Light::Yellow, Timer::Next, Light::Red),
        ])
        .state(Light::Red, pedestrian_signal())
        .subscribe_all(Listener::from_fn(|n| {
            println!("  [{}] {:?} -> {:?} on {:?}", n.machine_id, n.from, n.to, n.event);
            Ok(())
        }))
        .build()?;

    println!("Initial state:");
    report(&light).await;

    println!("\nButton pressed (handled by the pedestrian signal):");
    light.fire(Timer::Press).await?;
    report(&light).await;

    println!("\nTimer advances the light (falls through to the parent):");
    light.fire(Timer::Next).await?;
    report(&light).await;

    println!("\nButton pressed while green:");
    match light.fire(Timer::Press).await {
        Ok(state) => println!("  unexpected: {state:?}"),
        Err(e) => println!("  rejected: {e}"),
    }

    println!("\nCompleting the cycle:");
    light.fire(Timer::Next).await?;
    light.fire(Timer::Next).await?;
    report(&light).await;

    let path: Vec<String> = light
        .history()
        .await
        .get_path()
        .iter()
        .map(|s| format!("{s:?}"))
        .collect();
    println!("\nParent path: {}", path.join(" -> "));

    println!("\n=== Example Complete ===");
    Ok(())
}
