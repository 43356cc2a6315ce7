//! Key to node mapping with per-state metadata.

use crate::core::{Priority, StateKey, StateNode};
use crate::machine::error::MachineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Cached facts and running counters for one registered state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateMetadata {
    /// Priority read from the node at registration
    pub priority: Priority,
    /// Whether the node handles pause and resume
    pub interruptible: bool,
    /// Times the state was entered
    pub enter_count: u64,
    /// Times the state was exited
    pub exit_count: u64,
    /// Wall-clock time between each enter and its exit, summed
    pub total_dwell_time: Duration,
    /// Tick deltas accumulated while the state was current
    pub active_time: Duration,
    /// Time spent paused under pushed states, summed
    pub total_paused_time: Duration,
    /// When the state was last entered
    pub last_enter_at: Option<DateTime<Utc>>,
}

impl StateMetadata {
    fn capture<K: StateKey, O>(node: &dyn StateNode<K, O>) -> Self {
        Self {
            priority: node.priority(),
            interruptible: node.supports_pause(),
            enter_count: 0,
            exit_count: 0,
            total_dwell_time: Duration::ZERO,
            active_time: Duration::ZERO,
            total_paused_time: Duration::ZERO,
            last_enter_at: None,
        }
    }
}

struct RegisteredState<K: StateKey, O> {
    node: Box<dyn StateNode<K, O>>,
    metadata: StateMetadata,
}

/// Registered states, one singleton node per key.
///
/// A key, once registered, keeps its node for the registry's lifetime.
pub struct StateRegistry<K: StateKey, O> {
    states: HashMap<K, RegisteredState<K, O>>,
}

impl<K: StateKey, O> StateRegistry<K, O> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Register `node` under `key`, capturing its priority now.
    ///
    /// Registering a known key leaves the existing node in place.
    pub fn register(
        &mut self,
        key: K,
        node: Box<dyn StateNode<K, O>>,
    ) -> Result<(), MachineError> {
        if self.states.contains_key(&key) {
            warn!(state = %key.name(), "state already registered, keeping the original");
            return Err(MachineError::DuplicateRegistration {
                state: key.name().to_string(),
            });
        }
        let metadata = StateMetadata::capture(node.as_ref());
        self.states.insert(key, RegisteredState { node, metadata });
        Ok(())
    }

    pub fn resolve(&self, key: &K) -> Result<&dyn StateNode<K, O>, MachineError> {
        self.states
            .get(key)
            .map(|state| state.node.as_ref())
            .ok_or_else(|| unknown(key))
    }

    pub fn resolve_mut(&mut self, key: &K) -> Result<&mut dyn StateNode<K, O>, MachineError> {
        match self.states.get_mut(key) {
            Some(state) => {
                let node: &mut dyn StateNode<K, O> = state.node.as_mut();
                Ok(node)
            }
            None => Err(unknown(key)),
        }
    }

    pub fn metadata(&self, key: &K) -> Option<&StateMetadata> {
        self.states.get(key).map(|state| &state.metadata)
    }

    pub(crate) fn metadata_mut(&mut self, key: &K) -> Option<&mut StateMetadata> {
        self.states.get_mut(key).map(|state| &mut state.metadata)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.states.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.states.keys()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<K: StateKey, O> Default for StateRegistry<K, O> {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown<K: StateKey>(key: &K) -> MachineError {
    MachineError::UnknownState {
        state: key.name().to_string(),
    }
}
