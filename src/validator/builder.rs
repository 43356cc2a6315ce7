//! Builder API for creating transition rules.

use crate::core::{Guard, StateKey};
use crate::validator::rules::{TransitionObserver, TransitionRules};
use std::collections::{HashMap, HashSet};

/// Builder for [`TransitionRules`].
///
/// Self-transitions are denied unless [`allow_self_transitions`] is
/// called. The first call to [`allow`] switches the rules from "anything
/// goes" to an explicit adjacency list.
///
/// [`allow_self_transitions`]: RulesBuilder::allow_self_transitions
/// [`allow`]: RulesBuilder::allow
pub struct RulesBuilder<K: StateKey> {
    deny_self: bool,
    allowed: HashMap<K, HashSet<K>>,
    open_targets: HashSet<K>,
    denied: HashSet<(K, K)>,
    guards: Vec<(Guard<K>, String)>,
    observers: Vec<TransitionObserver<K>>,
}

impl<K: StateKey> RulesBuilder<K> {
    pub fn new() -> Self {
        Self {
            deny_self: true,
            allowed: HashMap::new(),
            open_targets: HashSet::new(),
            denied: HashSet::new(),
            guards: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Permit `from -> from`.
    pub fn allow_self_transitions(mut self) -> Self {
        self.deny_self = false;
        self
    }

    /// Add an edge to the adjacency list
    pub fn allow(mut self, from: K, to: K) -> Self {
        self.allowed.entry(from).or_default().insert(to);
        self
    }

    /// Make `to` reachable from every state, even under an adjacency list.
    pub fn allow_from_anywhere(mut self, to: K) -> Self {
        self.open_targets.insert(to);
        self
    }

    /// Forbid one edge outright
    pub fn deny(mut self, from: K, to: K) -> Self {
        self.denied.insert((from, to));
        self
    }

    /// Add a custom guard reported with `message` when it fails
    pub fn require(mut self, guard: Guard<K>, message: String) -> Self {
        self.guards.push((guard, message));
        self
    }

    /// Add a closure guard
    pub fn require_pred<F>(self, predicate: F, message: String) -> Self
    where
        F: Fn(Option<&K>, &K) -> bool + Send + Sync + 'static,
    {
        self.require(Guard::new(predicate), message)
    }

    /// Run `observer` after every accepted transition.
    pub fn on_transition<F>(mut self, observer: F) -> Self
    where
        F: FnMut(Option<&K>, &K) + 'static,
    {
        self.observers.push(Box::new(observer));
        self
    }

    /// Build the rules
    pub fn build(self) -> TransitionRules<K> {
        TransitionRules {
            deny_self: self.deny_self,
            restricted: !self.allowed.is_empty(),
            allowed: self.allowed,
            open_targets: self.open_targets,
            denied: self.denied,
            guards: self.guards,
            observers: self.observers,
        }
    }
}

impl<K: StateKey> Default for RulesBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}
