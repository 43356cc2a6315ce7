//! Core vocabulary of the runtime.
//!
//! This module contains the building blocks shared by every other module:
//! - State keys via the `StateKey` trait
//! - State behaviour via the `StateNode` trait and its `StateContext`
//! - Guard predicates for transition rules
//! - Pooled transition records
//! - Clocks for timestamps

mod clock;
mod guard;
mod key;
mod node;
mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub(crate) use clock::elapsed_between;
pub use guard::Guard;
pub(crate) use key::display_name;
pub use key::StateKey;
pub use node::{Priority, StateContext, StateNode, StateRequest, DEFAULT_PRIORITY};
pub use record::{TransitionPool, TransitionRecord};
