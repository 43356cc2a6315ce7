//! Transition validation policies.
//!
//! The machine consults exactly one [`TransitionValidator`] before every
//! `change_state` and `push_state`. The validator can veto the transition
//! in [`can_transition`](TransitionValidator::can_transition); once a
//! transition has also passed the priority and `can_exit` checks, its
//! [`on_transition`](TransitionValidator::on_transition) hook runs for side
//! effects only.
//!
//! Two policies ship with the crate:
//!
//! - [`DefaultValidator`]: rejects self-transitions, accepts everything else
//! - [`TransitionRules`]: adjacency lists, deny lists and custom guards,
//!   built with [`RulesBuilder`]. A rejected transition reports ALL the
//!   rules it broke.
//!
//! # Example
//!
//! ```rust
//! use stagehand::state_enum;
//! use stagehand::validator::{RulesBuilder, TransitionValidator};
//!
//! state_enum! {
//!     enum Screen {
//!         Menu,
//!         Playing,
//!         Paused,
//!     }
//! }
//!
//! let rules = RulesBuilder::new()
//!     .allow(Screen::Menu, Screen::Playing)
//!     .allow(Screen::Playing, Screen::Paused)
//!     .allow(Screen::Paused, Screen::Playing)
//!     .build();
//!
//! assert!(rules.can_transition(Some(&Screen::Menu), &Screen::Playing));
//! assert!(!rules.can_transition(Some(&Screen::Menu), &Screen::Paused));
//! ```

pub mod builder;
pub mod rules;
pub mod violations;

pub use builder::RulesBuilder;
pub use rules::{TransitionObserver, TransitionRules};
pub use violations::RuleViolation;

use crate::core::StateKey;

/// Policy gating every transition.
pub trait TransitionValidator<K: StateKey> {
    /// Whether `from -> to` is legal. `from` is `None` when nothing is
    /// current.
    fn can_transition(&self, from: Option<&K>, to: &K) -> bool;

    /// Side-effect hook for an accepted transition. Cannot veto.
    fn on_transition(&mut self, _from: Option<&K>, _to: &K) {}
}

/// Rejects self-transitions and accepts everything else.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultValidator;

impl<K: StateKey> TransitionValidator<K> for DefaultValidator {
    fn can_transition(&self, from: Option<&K>, to: &K) -> bool {
        from != Some(to)
    }
}
