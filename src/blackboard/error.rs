//! Blackboard error types.

use super::value::ValueKind;
use thiserror::Error;

/// Errors reported by blackboard reads and writes.
///
/// None is fatal: [`Blackboard::get`](super::Blackboard::get) answers a
/// mismatch with the caller's default, and a failed write leaves the
/// previous value in place.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BlackboardError {
    /// Stored value cannot be read as the requested type
    #[error("Blackboard key '{key}' holds a {found} value, which cannot be read as {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: ValueKind,
    },

    /// Value could not be converted into blackboard form
    #[error("Blackboard key '{key}' could not be serialized: {message}")]
    Serialization { key: String, message: String },

    /// NaN or an infinity, which JSON cannot represent
    #[error("Blackboard key '{key}' rejected non-finite number {value}")]
    NonFiniteNumber { key: String, value: f64 },
}
