//! Reasons a rule set refuses a transition.

use thiserror::Error;

/// A single broken transition rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Self-transition on '{state}' is not permitted")]
    SelfTransition { state: String },

    #[error("No rule allows '{from}' -> '{to}'")]
    NotAllowed { from: String, to: String },

    #[error("Transition '{from}' -> '{to}' is explicitly denied")]
    Denied { from: String, to: String },

    #[error("Guard failed: {message}")]
    GuardFailed { message: String },
}
