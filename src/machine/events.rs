//! Lifecycle and blackboard notifications.

use crate::core::{StateKey, TransitionRecord};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

/// Something observable that happened inside a machine.
#[derive(Clone, Debug, PartialEq)]
pub enum MachineEvent<K: StateKey> {
    /// The current state changed. Emitted before the matching exit/enter.
    StateChanged(TransitionRecord<K>),

    StateExited { state: K, at: DateTime<Utc> },

    StateEntered { state: K, at: DateTime<Utc> },

    /// A push interrupted `state`
    StatePaused { state: K, at: DateTime<Utc> },

    /// A pop brought `state` back after `paused_for`
    StateResumed {
        state: K,
        at: DateTime<Utc>,
        paused_for: Duration,
    },

    /// A blackboard key changed during the last tick
    BlackboardValueChanged { key: String, value: Value },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<K> = Box<dyn FnMut(&MachineEvent<K>)>;

/// Ordered list of event callbacks.
pub struct EventBus<K: StateKey> {
    subscribers: Vec<(SubscriptionId, Subscriber<K>)>,
    next_id: u64,
}

impl<K: StateKey> EventBus<K> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a callback. Callbacks run in subscription order.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&MachineEvent<K>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn dispatch(&mut self, event: &MachineEvent<K>) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<K: StateKey> Default for EventBus<K> {
    fn default() -> Self {
        Self::new()
    }
}
