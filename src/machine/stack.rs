//! Paused states waiting to be resumed.

use crate::core::StateKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A state interrupted by a push.
///
/// The node itself stays in the registry; the frame only remembers which
/// state to resume and since when it has been paused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateStackFrame<K: StateKey> {
    pub key: K,
    pub paused_at: DateTime<Utc>,
}

/// LIFO of paused states. Never holds the active state.
#[derive(Clone, Debug)]
pub struct StateStack<K: StateKey> {
    frames: Vec<StateStackFrame<K>>,
}

impl<K: StateKey> StateStack<K> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: StateStackFrame<K>) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<StateStackFrame<K>> {
        self.frames.pop()
    }

    pub fn peek(&self) -> Option<&StateStackFrame<K>> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.frames.iter().any(|frame| &frame.key == key)
    }

    /// Frames from bottom (oldest) to top.
    pub fn frames(&self) -> &[StateStackFrame<K>] {
        &self.frames
    }

    /// Remove every frame, returning them top first.
    pub fn drain_top_down(&mut self) -> Vec<StateStackFrame<K>> {
        let mut frames = std::mem::take(&mut self.frames);
        frames.reverse();
        frames
    }
}

impl<K: StateKey> Default for StateStack<K> {
    fn default() -> Self {
        Self::new()
    }
}
