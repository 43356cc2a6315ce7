//! The state machine runtime.
//!
//! A [`Machine`] owns a [`StateRegistry`] of singleton state nodes, the
//! current state, a [`StateStack`] of paused states and a
//! [`Blackboard`](crate::blackboard::Blackboard). Transitions go through
//! three gates, in order:
//!
//! 1. the machine's [`TransitionValidator`](crate::validator::TransitionValidator)
//! 2. priority: a lower-priority state cannot preempt a higher one
//! 3. the current node's `can_exit`
//!
//! A rejected transition has no side effects and is reported as a
//! [`MachineError`].
//!
//! # Example
//!
//! ```rust
//! use stagehand::core::{Priority, StateContext, StateNode};
//! use stagehand::machine::Machine;
//! use stagehand::state_enum;
//! use std::time::Duration;
//!
//! state_enum! {
//!     enum Mode {
//!         Idle,
//!         Alert,
//!     }
//! }
//!
//! struct Idle;
//!
//! impl StateNode<Mode, ()> for Idle {
//!     fn on_enter(&mut self, _ctx: &mut StateContext<'_, Mode, ()>) {}
//!     fn on_exit(&mut self, _ctx: &mut StateContext<'_, Mode, ()>) {}
//!     fn on_update(&mut self, ctx: &mut StateContext<'_, Mode, ()>) {
//!         if ctx.blackboard().get("threat", false) {
//!             ctx.change_state(Mode::Alert);
//!         }
//!     }
//! }
//!
//! struct Alert;
//!
//! impl StateNode<Mode, ()> for Alert {
//!     fn on_enter(&mut self, _ctx: &mut StateContext<'_, Mode, ()>) {}
//!     fn on_exit(&mut self, _ctx: &mut StateContext<'_, Mode, ()>) {}
//!     fn on_update(&mut self, _ctx: &mut StateContext<'_, Mode, ()>) {}
//!     fn priority(&self) -> Priority {
//!         10
//!     }
//! }
//!
//! let mut machine = Machine::new(());
//! machine.register(Mode::Idle, Idle).unwrap();
//! machine.register(Mode::Alert, Alert).unwrap();
//! machine.run(Mode::Idle).unwrap();
//!
//! machine.set_blackboard_value("threat", true).unwrap();
//! machine.update(Duration::from_millis(16));
//!
//! assert_eq!(machine.current_state(), Some(&Mode::Alert));
//! ```

mod error;
mod events;
mod registry;
mod runtime;
mod stack;

pub use error::{MachineError, TransitionOutcome};
pub use events::{EventBus, MachineEvent, SubscriptionId};
pub use registry::{StateMetadata, StateRegistry};
pub use runtime::Machine;
pub use stack::{StateStack, StateStackFrame};
