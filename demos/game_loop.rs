//! Game Loop
//!
//! This example drives a small enemy AI through a fixed-step loop.
//!
//! Key concepts:
//! - Priorities (Patrol < Chase < Stunned)
//! - States requesting their own transitions from `on_update`
//! - Push/pop for an interruption that resumes where it left off
//! - Blackboard writes batched into one notification per tick
//! - Dwell-time profiling
//!
//! Run with: cargo run --example game_loop
//! Add `STAGEHAND_LOG_LEVEL=debug` to see every transition.

use stagehand::logging::init_logging;
use stagehand::prelude::*;
use std::time::Duration;

state_enum! {
    enum Ai {
        Patrol,
        Chase,
        Stunned,
    }
}

// Owner handle: fixed facts about the enemy
struct Enemy {
    name: &'static str,
    sight_range: f64,
}

struct Patrol {
    waypoint: u32,
}

impl StateNode<Ai, Enemy> for Patrol {
    fn on_enter(&mut self, ctx: &mut StateContext<'_, Ai, Enemy>) {
        println!("  {} starts patrolling", ctx.owner().name);
    }

    fn on_exit(&mut self, _ctx: &mut StateContext<'_, Ai, Enemy>) {}

    fn on_update(&mut self, ctx: &mut StateContext<'_, Ai, Enemy>) {
        self.waypoint = (self.waypoint + 1) % 4;
        let _ = ctx.blackboard_mut().set("waypoint", self.waypoint);

        let distance: f64 = ctx.blackboard().get("player_distance", f64::MAX);
        if distance <= ctx.owner().sight_range {
            ctx.change_state(Ai::Chase);
        }
    }

    fn on_pause(&mut self, _ctx: &mut StateContext<'_, Ai, Enemy>) {
        println!("  patrol paused at waypoint {}", self.waypoint);
    }

    fn on_resume(&mut self, _ctx: &mut StateContext<'_, Ai, Enemy>) {
        println!("  patrol resumed at waypoint {}", self.waypoint);
    }

    fn supports_pause(&self) -> bool {
        true
    }

    fn priority(&self) -> Priority {
        1
    }
}

struct Chase;

impl StateNode<Ai, Enemy> for Chase {
    fn on_enter(&mut self, ctx: &mut StateContext<'_, Ai, Enemy>) {
        println!("  {} spotted the player", ctx.owner().name);
    }

    fn on_exit(&mut self, _ctx: &mut StateContext<'_, Ai, Enemy>) {}

    fn on_update(&mut self, ctx: &mut StateContext<'_, Ai, Enemy>) {
        let distance: f64 = ctx.blackboard().get("player_distance", f64::MAX);
        if distance > ctx.owner().sight_range * 2.0 {
            // Lost sight: step back down to patrol.
            ctx.change_state(Ai::Patrol);
        }
    }

    fn priority(&self) -> Priority {
        5
    }
}

struct Stunned {
    remaining: Duration,
}

impl StateNode<Ai, Enemy> for Stunned {
    fn on_enter(&mut self, _ctx: &mut StateContext<'_, Ai, Enemy>) {
        self.remaining = Duration::from_millis(300);
        println!("  stunned!");
    }

    fn on_exit(&mut self, _ctx: &mut StateContext<'_, Ai, Enemy>) {
        println!("  recovered");
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_, Ai, Enemy>) {
        self.remaining = self.remaining.saturating_sub(ctx.delta());
        if self.remaining.is_zero() {
            ctx.pop_state();
        }
    }

    fn can_exit(&self) -> bool {
        self.remaining.is_zero()
    }

    fn priority(&self) -> Priority {
        100
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = init_logging(None, None);

    let mut machine = Machine::builder()
        .owner(Enemy {
            name: "Goblin",
            sight_range: 10.0,
        })
        .state(Ai::Patrol, Patrol { waypoint: 0 })
        .state(Ai::Chase, Chase)
        .state(
            Ai::Stunned,
            Stunned {
                remaining: Duration::ZERO,
            },
        )
        .build()?;

    machine.subscribe(|event| match event {
        MachineEvent::StateChanged(record) => println!(
            "[event] {} -> {}",
            record
                .from
                .as_ref()
                .map_or("<start>", |from| from.name()),
            record.to.name()
        ),
        MachineEvent::BlackboardValueChanged { key, value } => {
            println!("[event] blackboard {key} = {value}")
        }
        _ => {}
    });

    machine.run(Ai::Patrol)?;

    let tick = Duration::from_millis(100);
    let distances = [30.0, 25.0, 20.0, 18.0, 8.0, 6.0, 25.0, 40.0];
    for (frame, distance) in distances.into_iter().enumerate() {
        println!("frame {frame}: player at {distance}");
        machine.set_blackboard_value("player_distance", distance)?;

        if frame == 1 {
            // A trap goes off while patrolling.
            machine.push_state(Ai::Stunned)?;
        }
        machine.update(tick);
    }

    println!();
    println!(
        "Final state: {}",
        machine.current_state().map_or("<none>", |state| state.name())
    );
    println!("Stack depth: {}", machine.stack_depth());
    if let Some(patrol) = machine.metadata(&Ai::Patrol) {
        println!(
            "Patrol entered {}x, paused for {:?}",
            patrol.enter_count, patrol.total_paused_time
        );
    }
    println!();
    print!("{}", machine.profiler_report());

    machine.shutdown();
    Ok(())
}
