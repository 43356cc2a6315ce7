//! Transition records and their recycling pool.

use super::key::StateKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a single accepted transition.
///
/// `from` is `None` when the machine was started with
/// [`Machine::run`](crate::machine::Machine::run).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<K: StateKey> {
    /// The state being left
    pub from: Option<K>,
    /// The state being entered
    pub to: K,
    /// When the transition happened
    pub timestamp: DateTime<Utc>,
}

/// Free list of [`TransitionRecord`]s.
///
/// Records are borrowed for the duration of one `StateChanged` dispatch
/// and handed back afterwards, so steady-state transitions reuse storage
/// instead of building a fresh record each time.
#[derive(Debug)]
pub struct TransitionPool<K: StateKey> {
    free: Vec<TransitionRecord<K>>,
    capacity: usize,
}

impl<K: StateKey> TransitionPool<K> {
    /// Create a pool that keeps at most `capacity` idle records.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Take a record from the pool, filling it with the given values.
    pub fn acquire(
        &mut self,
        from: Option<K>,
        to: K,
        timestamp: DateTime<Utc>,
    ) -> TransitionRecord<K> {
        match self.free.pop() {
            Some(mut record) => {
                record.from = from;
                record.to = to;
                record.timestamp = timestamp;
                record
            }
            None => TransitionRecord {
                from,
                to,
                timestamp,
            },
        }
    }

    /// Give a record back. Dropped when the pool is already full.
    pub fn release(&mut self, record: TransitionRecord<K>) {
        if self.free.len() < self.capacity {
            self.free.push(record);
        }
    }

    /// Idle records ready for reuse.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
