//! Builder API for machine construction.
//!
//! This module provides the fluent [`MachineBuilder`], the serde-backed
//! [`MachineConfig`] and the [`state_enum!`](crate::state_enum) macro for
//! declaring keys with minimal boilerplate.

pub mod config;
pub mod error;
pub mod machine;
pub mod macros;

pub use config::MachineConfig;
pub use error::BuildError;
pub use machine::MachineBuilder;
