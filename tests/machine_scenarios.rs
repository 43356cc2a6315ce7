//! End-to-end scenarios driving a machine the way a game loop would.

use stagehand::prelude::*;
use stagehand::core::ManualClock;
use stagehand::validator::RuleViolation;
use stillwater::validation::Validation;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::util::SubscriberInitExt;

state_enum! {
    enum Game {
        Idle,
        Combat,
        Pause,
        Cutscene,
    }
}

/// Read-only handle shared with every state.
struct Hero {
    name: &'static str,
    max_hp: i64,
}

type Trace = Rc<RefCell<Vec<String>>>;

struct Idle {
    trace: Trace,
}

impl StateNode<Game, Hero> for Idle {
    fn on_enter(&mut self, ctx: &mut StateContext<'_, Game, Hero>) {
        self.trace.borrow_mut().push("idle:enter".into());
        let max_hp = ctx.owner().max_hp;
        let _ = ctx.blackboard_mut().set("hp", max_hp);
    }

    fn on_exit(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {
        self.trace.borrow_mut().push("idle:exit".into());
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_, Game, Hero>) {
        if ctx.blackboard().get("enemy_near", false) {
            ctx.change_state(Game::Combat);
        }
    }

    fn priority(&self) -> Priority {
        1
    }
}

struct Combat {
    trace: Trace,
}

impl StateNode<Game, Hero> for Combat {
    fn on_enter(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {
        self.trace.borrow_mut().push("combat:enter".into());
    }

    fn on_exit(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {
        self.trace.borrow_mut().push("combat:exit".into());
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_, Game, Hero>) {
        let hp: i64 = ctx.blackboard().get("hp", 0);
        let _ = ctx.blackboard_mut().set("hp", hp - 1);
        if !ctx.blackboard().get("enemy_near", true) {
            // Combat steps down to Idle on its own.
            ctx.change_state(Game::Idle);
        }
    }

    fn on_pause(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {
        self.trace.borrow_mut().push("combat:pause".into());
    }

    fn on_resume(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {
        self.trace.borrow_mut().push("combat:resume".into());
    }

    fn supports_pause(&self) -> bool {
        true
    }

    fn priority(&self) -> Priority {
        5
    }
}

struct Pause;

impl StateNode<Game, Hero> for Pause {
    fn on_enter(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {}
    fn on_exit(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {}
    fn on_update(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {}

    fn priority(&self) -> Priority {
        10
    }
}

/// Never agrees to exit. Only forced teardown ends it.
struct Cutscene;

impl StateNode<Game, Hero> for Cutscene {
    fn on_enter(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {}
    fn on_exit(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {}
    fn on_update(&mut self, _ctx: &mut StateContext<'_, Game, Hero>) {}

    fn can_exit(&self) -> bool {
        false
    }

    fn priority(&self) -> Priority {
        20
    }
}

fn game(clock: &ManualClock) -> (Machine<Game, Hero>, Trace) {
    let trace: Trace = Rc::new(RefCell::new(Vec::new()));
    let machine = Machine::builder()
        .owner(Hero {
            name: "Ayla",
            max_hp: 30,
        })
        .clock(clock.clone())
        .state(
            Game::Idle,
            Idle {
                trace: Rc::clone(&trace),
            },
        )
        .state(
            Game::Combat,
            Combat {
                trace: Rc::clone(&trace),
            },
        )
        .state(Game::Pause, Pause)
        .state(Game::Cutscene, Cutscene)
        .build()
        .unwrap();
    (machine, trace)
}

const TICK: Duration = Duration::from_millis(16);

#[test]
fn idle_combat_round_trip() {
    let clock = ManualClock::new();
    let (mut machine, trace) = game(&clock);

    machine.run(Game::Idle).unwrap();
    assert_eq!(
        machine.change_state(Game::Combat),
        Ok(TransitionOutcome::Completed)
    );

    // Combat decides to leave once the enemy is gone.
    machine.set_blackboard_value("enemy_near", false).unwrap();
    machine.update(TICK);

    assert_eq!(machine.current_state(), Some(&Game::Idle));
    assert_eq!(machine.previous_state(), Some(&Game::Combat));
    assert_eq!(
        *trace.borrow(),
        vec![
            "idle:enter",
            "idle:exit",
            "combat:enter",
            "combat:exit",
            "idle:enter"
        ]
    );
}

#[test]
fn blackboard_drives_transitions() {
    let clock = ManualClock::new();
    let (mut machine, _) = game(&clock);
    machine.run(Game::Idle).unwrap();

    machine.update(TICK);
    assert!(machine.is_in_state(&Game::Idle));

    machine.set_blackboard_value("enemy_near", true).unwrap();
    machine.update(TICK);
    assert!(machine.is_in_state(&Game::Combat));

    machine.update(TICK);
    assert_eq!(machine.get_blackboard_value("hp", 0_i64), 29);
    assert_eq!(machine.owner().name, "Ayla");
}

#[test]
fn pause_over_combat_and_back() {
    let clock = ManualClock::new();
    let (mut machine, trace) = game(&clock);
    machine.run(Game::Idle).unwrap();
    machine.change_state(Game::Combat).unwrap();
    trace.borrow_mut().clear();

    machine.push_state(Game::Pause).unwrap();
    assert_eq!(machine.stack_depth(), 1);
    assert_eq!(machine.stack().peek().map(|frame| frame.key), Some(Game::Combat));

    clock.advance(Duration::from_secs(5));
    machine.pop_state().unwrap();

    assert_eq!(machine.current_state(), Some(&Game::Combat));
    assert_eq!(machine.stack_depth(), 0);
    assert_eq!(*trace.borrow(), vec!["combat:pause", "combat:resume"]);
    let combat = machine.metadata(&Game::Combat).unwrap();
    assert_eq!(combat.total_paused_time, Duration::from_secs(5));
    assert_eq!(combat.exit_count, 0);
}

#[test]
fn cutscene_cannot_be_interrupted() {
    let clock = ManualClock::new();
    let (mut machine, _) = game(&clock);
    machine.run(Game::Cutscene).unwrap();

    for target in [Game::Idle, Game::Combat, Game::Pause] {
        let result = machine.change_state(target);
        assert!(result.is_err(), "{target:?} should be rejected");
    }
    assert_eq!(
        machine.push_state(Game::Pause),
        Err(MachineError::PriorityViolation {
            current: "Cutscene".to_string(),
            current_priority: 20,
            target: "Pause".to_string(),
            target_priority: 10,
        })
    );
    assert!(machine.is_in_state(&Game::Cutscene));

    // Forced teardown ignores can_exit.
    assert_eq!(machine.clear_stack(), 1);
    assert!(!machine.is_running());
}

#[test]
fn events_arrive_in_order() {
    let clock = ManualClock::new();
    let (mut machine, _) = game(&clock);
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let id = machine.subscribe(move |event| {
        let line = match event {
            MachineEvent::StateChanged(record) => format!(
                "changed {:?} -> {:?}",
                record.from.map(|key| key.name().to_string()),
                record.to.name()
            ),
            MachineEvent::StateExited { state, .. } => format!("exited {}", state.name()),
            MachineEvent::StateEntered { state, .. } => format!("entered {}", state.name()),
            MachineEvent::StatePaused { state, .. } => format!("paused {}", state.name()),
            MachineEvent::StateResumed { state, .. } => format!("resumed {}", state.name()),
            MachineEvent::BlackboardValueChanged { key, value } => {
                format!("blackboard {key}={value}")
            }
        };
        sink.borrow_mut().push(line);
    });

    machine.run(Game::Idle).unwrap();
    machine.update(TICK);
    machine.push_state(Game::Pause).unwrap();
    machine.pop_state().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "changed None -> \"Idle\"",
            "entered Idle",
            "blackboard hp=30",
            "changed Some(\"Idle\") -> \"Pause\"",
            "paused Idle",
            "entered Pause",
            "changed Some(\"Pause\") -> \"Idle\"",
            "exited Pause",
            "resumed Idle",
        ]
    );

    assert!(machine.unsubscribe(id));
    machine.set_blackboard_value("hp", 1).unwrap();
    machine.update(TICK);
    assert_eq!(log.borrow().len(), 9);
}

#[test]
fn unchanged_blackboard_writes_are_silent() {
    let clock = ManualClock::new();
    let (mut machine, _) = game(&clock);
    machine.run(Game::Idle).unwrap();
    machine.update(TICK);

    let changes = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&changes);
    machine.subscribe(move |event| {
        if matches!(event, MachineEvent::BlackboardValueChanged { .. }) {
            *sink.borrow_mut() += 1;
        }
    });

    for _ in 0..100 {
        machine.set_blackboard_value("combo", 7).unwrap();
    }
    machine.set_blackboard_value("hp", 30).unwrap();
    machine.update(TICK);

    assert_eq!(*changes.borrow(), 1);
}

#[test]
fn type_mismatch_falls_back_to_default() {
    let clock = ManualClock::new();
    let (mut machine, _) = game(&clock);
    machine.set_blackboard_value("hp", "lots").unwrap();

    assert_eq!(machine.get_blackboard_value("hp", 12_i64), 12);
    assert!(machine.blackboard().try_get::<i64>("hp").is_err());
    assert_eq!(
        machine.blackboard().try_get::<String>("hp"),
        Ok(Some("lots".to_string()))
    );
}

#[test]
fn rules_validator_reports_every_violation() {
    let rules = RulesBuilder::new()
        .allow(Game::Idle, Game::Combat)
        .deny(Game::Idle, Game::Cutscene)
        .require_pred(
            |_, to: &Game| *to != Game::Cutscene,
            "cutscenes are scripted".to_string(),
        )
        .build();

    match rules.check(Some(&Game::Idle), &Game::Cutscene) {
        Validation::Failure(violations) => {
            assert_eq!(violations.len(), 3);
            assert!(violations.iter().any(|v| matches!(
                v,
                RuleViolation::GuardFailed { message } if message == "cutscenes are scripted"
            )));
        }
        Validation::Success(_) => panic!("expected violations"),
    }

    let mut machine = Machine::builder()
        .owner(Hero {
            name: "Ayla",
            max_hp: 1,
        })
        .validator(rules)
        .state(Game::Idle, Idle {
            trace: Rc::default(),
        })
        .state(Game::Combat, Combat {
            trace: Rc::default(),
        })
        .state(Game::Cutscene, Cutscene)
        .build()
        .unwrap();
    machine.run(Game::Idle).unwrap();

    assert!(matches!(
        machine.change_state(Game::Cutscene),
        Err(MachineError::TransitionRejected { .. })
    ));
    assert!(machine.change_state(Game::Combat).is_ok());
}

#[test]
fn profiler_reports_dwell_times() {
    let clock = ManualClock::new();
    let (mut machine, _) = game(&clock);
    machine.run(Game::Idle).unwrap();
    clock.advance(Duration::from_secs(2));
    machine.change_state(Game::Combat).unwrap();
    clock.advance(Duration::from_millis(500));
    machine.change_state(Game::Pause).unwrap();

    let profiler = machine.profiler().unwrap();
    assert_eq!(profiler.total_dwell(&Game::Idle), Duration::from_secs(2));
    assert_eq!(
        profiler.record(&Game::Combat).unwrap().max_dwell,
        Some(Duration::from_millis(500))
    );
    assert_eq!(profiler.total_dwell(&Game::Cutscene), Duration::ZERO);

    let report = machine.profiler_report();
    assert!(report.starts_with("State profile"));
    assert!(report.contains("2.000s"));

    let snapshot = profiler.snapshot();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["states"].as_array().map(Vec::len), Some(3));
}

#[test]
fn unknown_and_duplicate_keys_are_reported() {
    let clock = ManualClock::new();
    let (mut machine, _) = game(&clock);

    assert!(matches!(
        machine.register(Game::Pause, Pause),
        Err(MachineError::DuplicateRegistration { .. })
    ));

    let mut bare: Machine<Game, ()> = Machine::new(());
    assert!(matches!(
        bare.run(Game::Idle),
        Err(MachineError::UnknownState { .. })
    ));
    assert!(!bare.is_running());
}

#[test]
fn machine_logs_through_tracing() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let clock = ManualClock::new();
    let (mut machine, _) = game(&clock);
    machine.run(Game::Idle).unwrap();
    let _ = machine.change_state(Game::Cutscene);
    let _ = machine.change_state(Game::Idle);
    machine.update(TICK);
    machine.shutdown();

    assert!(!machine.is_running());
}
