//! Stored entries and their runtime type tags.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Runtime type recorded alongside every blackboard value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    Text,
    List,
    Map,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Integer,
            Value::String(_) => Self::Text,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Map,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// One keyed value on the blackboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlackboardEntry {
    /// Current value
    pub value: Value,
    /// Runtime type of `value`
    pub kind: ValueKind,
    /// Changed since the last drain
    pub dirty: bool,
}

impl BlackboardEntry {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            kind: ValueKind::of(&value),
            value,
            dirty: true,
        }
    }
}
