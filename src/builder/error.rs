//! Build errors for machine construction.

use thiserror::Error;

/// Errors that can occur when building a machine.
///
/// These are programming errors caught at construction time, unlike the
/// runtime rejections reported by [`MachineError`](crate::machine::MachineError).
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Owner not specified. Call .owner(handle) before .build()")]
    MissingOwner,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State registration failed: {0}")]
    Registration(#[from] crate::machine::MachineError),
}
