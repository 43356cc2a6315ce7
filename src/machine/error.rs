//! Rejection reasons for machine operations.

use thiserror::Error;

/// Why a machine operation did not take effect.
///
/// None of these are fatal. A rejected operation leaves the machine exactly
/// as it was, and the same call can be retried once the blocking condition
/// changes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("State '{state}' is not registered")]
    UnknownState { state: String },

    #[error("Validator rejected transition from '{from}' to '{to}'")]
    TransitionRejected { from: String, to: String },

    #[error(
        "'{target}' (priority {target_priority}) cannot preempt '{current}' (priority {current_priority})"
    )]
    PriorityViolation {
        current: String,
        current_priority: i32,
        target: String,
        target_priority: i32,
    },

    #[error("State '{state}' refused to exit")]
    ExitRefused { state: String },

    #[error("Cannot pop: the state stack is empty")]
    EmptyStackPop,

    #[error("State '{state}' is already registered")]
    DuplicateRegistration { state: String },

    #[error("State '{state}' is paused on the stack and cannot become current")]
    StateSuspended { state: String },

    #[error("Machine has no current state. Call run() first")]
    NotRunning,

    #[error("Machine is already running in '{current}'")]
    AlreadyRunning { current: String },
}

/// Result of an accepted machine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The machine moved to the requested state
    Completed,

    /// The requested state was already current. Nothing happened.
    AlreadyCurrent,
}
