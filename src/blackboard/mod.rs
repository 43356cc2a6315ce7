//! Shared key/value store with change tracking.
//!
//! The blackboard is the one resource every state may read and write. It
//! stores values in JSON form so heterogeneous writers can share it, and it
//! tracks which keys changed since the last drain so the machine can batch
//! change notifications once per tick.
//!
//! Writes that do not change the stored value are dropped before they reach
//! the dirty set, so a state writing the same score every frame produces no
//! notifications at all.
//!
//! # Example
//!
//! ```rust
//! use stagehand::blackboard::Blackboard;
//!
//! let mut board = Blackboard::new();
//! assert!(board.set("score", 10).unwrap());
//! assert!(!board.set("score", 10).unwrap()); // unchanged, not dirty again
//!
//! assert_eq!(board.get("score", 0), 10);
//! assert_eq!(board.get("missing", -1), -1);
//!
//! let changes = board.drain_dirty();
//! assert_eq!(changes.len(), 1);
//! assert!(board.drain_dirty().is_empty());
//! ```

mod error;
mod finite;
mod value;

pub use error::BlackboardError;
pub use value::{BlackboardEntry, ValueKind};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{trace, warn};

/// Typed key/value store with dirty tracking.
#[derive(Clone, Debug, Default)]
pub struct Blackboard {
    entries: HashMap<String, BlackboardEntry>,
    dirty_order: Vec<String>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`.
    ///
    /// Returns `Ok(true)` when the stored value changed and the key is now
    /// dirty, `Ok(false)` when `value` equals what was already there.
    /// NaN and infinities anywhere inside `value` are rejected and the
    /// previous value is kept.
    pub fn set<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<bool, BlackboardError> {
        let key = key.into();
        if let Some(found) = finite::first_non_finite(&value) {
            return Err(BlackboardError::NonFiniteNumber { key, value: found });
        }
        let value = serde_json::to_value(value).map_err(|e| BlackboardError::Serialization {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.set_value(key, value)
    }

    /// Store an already-converted value. Same semantics as [`set`](Self::set).
    pub fn set_value(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<bool, BlackboardError> {
        let key = key.into();
        match self.entries.get_mut(&key) {
            Some(entry) if entry.value == value => {
                trace!(key = %key, "blackboard write unchanged");
                Ok(false)
            }
            Some(entry) => {
                entry.kind = ValueKind::of(&value);
                entry.value = value;
                if !entry.dirty {
                    entry.dirty = true;
                    self.dirty_order.push(key);
                }
                Ok(true)
            }
            None => {
                self.dirty_order.push(key.clone());
                self.entries.insert(key, BlackboardEntry::new(value));
                Ok(true)
            }
        }
    }

    /// Read `key` as `T`, falling back to `default` when the key is absent
    /// or holds an incompatible value. Mismatches are logged.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                warn!(error = %err, "blackboard read fell back to default");
                default
            }
        }
    }

    /// Read `key` as `T`, reporting a type mismatch instead of hiding it.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, BlackboardError> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        T::deserialize(&entry.value)
            .map(Some)
            .map_err(|_| BlackboardError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
                found: entry.kind,
            })
    }

    /// Raw stored value.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn entry(&self, key: &str) -> Option<&BlackboardEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove `key`, discarding any pending change notification for it.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let entry = self.entries.remove(key)?;
        if entry.dirty {
            self.dirty_order.retain(|k| k != key);
        }
        Some(entry.value)
    }

    /// Drop every entry and every pending notification.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty_order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of keys waiting for the next drain.
    pub fn dirty_count(&self) -> usize {
        self.dirty_order.len()
    }

    /// Take every change since the last drain, oldest first, and mark the
    /// entries clean. Each key appears at most once.
    pub fn drain_dirty(&mut self) -> Vec<(String, Value)> {
        let mut changes = Vec::with_capacity(self.dirty_order.len());
        for key in self.dirty_order.drain(..) {
            if let Some(entry) = self.entries.get_mut(&key) {
                if entry.dirty {
                    entry.dirty = false;
                    changes.push((key, entry.value.clone()));
                }
            }
        }
        changes
    }
}
