//! Stagehand: a priority-gated state machine runtime
//!
//! Stagehand drives game and simulation logic through a set of singleton
//! state nodes. The host registers one node per key, starts the machine and
//! calls [`Machine::update`] once per tick. States share data through a
//! typed [`Blackboard`] whose changes are broadcast once per tick.
//!
//! # Core Concepts
//!
//! - **Keys**: any [`StateKey`], usually declared with [`state_enum!`]
//! - **Nodes**: behaviour via the [`StateNode`] hooks, each given a
//!   [`StateContext`]
//! - **Priority**: a lower-priority state can never preempt a higher one
//! - **Stack**: `push_state` pauses the current state, `pop_state` resumes it
//! - **Validators**: a pluggable [`TransitionValidator`] vetoes transitions
//! - **Profiler**: dwell-time statistics built from lifecycle events
//!
//! # Example
//!
//! ```rust
//! use stagehand::prelude::*;
//! use std::time::Duration;
//!
//! state_enum! {
//!     enum Light {
//!         Green,
//!         Red,
//!     }
//! }
//!
//! struct Green;
//!
//! impl StateNode<Light, ()> for Green {
//!     fn on_enter(&mut self, _ctx: &mut StateContext<'_, Light, ()>) {}
//!     fn on_exit(&mut self, _ctx: &mut StateContext<'_, Light, ()>) {}
//!     fn on_update(&mut self, ctx: &mut StateContext<'_, Light, ()>) {
//!         ctx.change_state(Light::Red);
//!     }
//! }
//!
//! struct Red;
//!
//! impl StateNode<Light, ()> for Red {
//!     fn on_enter(&mut self, ctx: &mut StateContext<'_, Light, ()>) {
//!         let _ = ctx.blackboard_mut().set("stopped", true);
//!     }
//!     fn on_exit(&mut self, _ctx: &mut StateContext<'_, Light, ()>) {}
//!     fn on_update(&mut self, _ctx: &mut StateContext<'_, Light, ()>) {}
//! }
//!
//! let mut machine = Machine::builder()
//!     .owner(())
//!     .state(Light::Green, Green)
//!     .state(Light::Red, Red)
//!     .build()
//!     .unwrap();
//!
//! machine.run(Light::Green).unwrap();
//! machine.update(Duration::from_millis(16));
//!
//! assert!(machine.is_in_state(&Light::Red));
//! assert!(machine.get_blackboard_value("stopped", false));
//! ```

pub mod blackboard;
pub mod builder;
pub mod core;
pub mod logging;
pub mod machine;
pub mod profiler;
pub mod validator;

// Re-export commonly used types
pub use blackboard::{Blackboard, BlackboardError, ValueKind};
pub use builder::{BuildError, MachineBuilder, MachineConfig};
pub use crate::core::{Clock, Guard, ManualClock, Priority, StateContext, StateKey, StateNode};
pub use machine::{Machine, MachineError, MachineEvent, TransitionOutcome};
pub use profiler::{ProfileReport, Profiler};
pub use validator::{DefaultValidator, RulesBuilder, TransitionRules, TransitionValidator};

/// Everything needed to declare states and drive a machine.
pub mod prelude {
    pub use crate::blackboard::Blackboard;
    pub use crate::builder::{MachineBuilder, MachineConfig};
    pub use crate::core::{Priority, StateContext, StateKey, StateNode, DEFAULT_PRIORITY};
    pub use crate::machine::{Machine, MachineError, MachineEvent, TransitionOutcome};
    pub use crate::state_enum;
    pub use crate::validator::{DefaultValidator, RulesBuilder, TransitionValidator};
}
