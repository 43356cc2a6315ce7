//! State implementations and the context handed to their hooks.

use super::key::StateKey;
use crate::blackboard::Blackboard;
use std::time::Duration;

/// Priority of a state. Higher values win.
pub type Priority = i32;

/// Priority reported by nodes that do not override [`StateNode::priority`].
pub const DEFAULT_PRIORITY: Priority = 0;

/// A transition requested from inside a lifecycle hook.
///
/// The machine is mutably borrowed while a hook runs, so hooks queue
/// requests instead of transitioning inline. Queued requests are applied
/// by [`Machine::update`](crate::machine::Machine::update) right after the
/// active state's `on_update`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateRequest<K: StateKey> {
    Change(K),
    Push(K),
    Pop,
}

/// Behaviour of a single state.
///
/// The runtime never looks inside a node; it only drives these hooks. A
/// node is registered once under its key and lives as long as the machine.
///
/// `on_enter`, `on_exit` and `on_update` are required. The remaining hooks
/// are optional capabilities with neutral defaults.
pub trait StateNode<K: StateKey, O> {
    /// Called when the state becomes current through `run`, `change_state`
    /// or `push_state`.
    fn on_enter(&mut self, ctx: &mut StateContext<'_, K, O>);

    /// Called when the state stops being current for good.
    fn on_exit(&mut self, ctx: &mut StateContext<'_, K, O>);

    /// Called once per machine tick while the state is current.
    fn on_update(&mut self, ctx: &mut StateContext<'_, K, O>);

    /// Called when another state is pushed on top of this one.
    ///
    /// Only invoked when [`supports_pause`](Self::supports_pause) is `true`.
    fn on_pause(&mut self, _ctx: &mut StateContext<'_, K, O>) {}

    /// Called when this state becomes current again after a pop.
    ///
    /// Only invoked when [`supports_pause`](Self::supports_pause) is `true`.
    fn on_resume(&mut self, _ctx: &mut StateContext<'_, K, O>) {}

    /// Whether this state handles `on_pause` / `on_resume`.
    fn supports_pause(&self) -> bool {
        false
    }

    /// Whether this state currently agrees to be replaced or popped.
    ///
    /// Returning `false` vetoes the transition regardless of the target's
    /// priority.
    fn can_exit(&self) -> bool {
        true
    }

    /// Priority captured once at registration.
    fn priority(&self) -> Priority {
        DEFAULT_PRIORITY
    }
}

/// Everything a hook may touch while it runs.
pub struct StateContext<'a, K: StateKey, O> {
    owner: &'a O,
    blackboard: &'a mut Blackboard,
    requests: &'a mut Vec<StateRequest<K>>,
    state: &'a K,
    delta: Duration,
}

impl<'a, K: StateKey, O> StateContext<'a, K, O> {
    pub(crate) fn new(
        owner: &'a O,
        blackboard: &'a mut Blackboard,
        requests: &'a mut Vec<StateRequest<K>>,
        state: &'a K,
        delta: Duration,
    ) -> Self {
        Self {
            owner,
            blackboard,
            requests,
            state,
            delta,
        }
    }

    /// The application handle the machine was built with.
    pub fn owner(&self) -> &O {
        self.owner
    }

    /// Key of the state whose hook is running.
    pub fn state(&self) -> &K {
        self.state
    }

    /// Tick delta. Zero outside of `on_update`.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn blackboard(&self) -> &Blackboard {
        self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        self.blackboard
    }

    /// Queue a validated change to `key`.
    pub fn change_state(&mut self, key: K) {
        self.requests.push(StateRequest::Change(key));
    }

    /// Queue a push of `key` on top of the current state.
    pub fn push_state(&mut self, key: K) {
        self.requests.push(StateRequest::Push(key));
    }

    /// Queue a pop back to the paused state underneath.
    pub fn pop_state(&mut self) {
        self.requests.push(StateRequest::Pop);
    }

    /// Requests queued by this hook so far, oldest first.
    pub fn pending_requests(&self) -> &[StateRequest<K>] {
        self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestKey {
        Idle,
        Combat,
    }

    impl StateKey for TestKey {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Combat => "Combat",
            }
        }
    }

    struct Minimal;

    impl StateNode<TestKey, ()> for Minimal {
        fn on_enter(&mut self, _ctx: &mut StateContext<'_, TestKey, ()>) {}
        fn on_exit(&mut self, _ctx: &mut StateContext<'_, TestKey, ()>) {}
        fn on_update(&mut self, _ctx: &mut StateContext<'_, TestKey, ()>) {}
    }

    #[test]
    fn optional_capabilities_have_neutral_defaults() {
        let node = Minimal;
        assert!(!node.supports_pause());
        assert!(node.can_exit());
        assert_eq!(node.priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn context_queues_requests_in_order() {
        let mut blackboard = Blackboard::new();
        let mut requests = Vec::new();
        let state = TestKey::Idle;
        let mut ctx = StateContext::new(
            &(),
            &mut blackboard,
            &mut requests,
            &state,
            Duration::from_millis(16),
        );

        ctx.push_state(TestKey::Combat);
        ctx.pop_state();
        ctx.change_state(TestKey::Combat);

        assert_eq!(ctx.state(), &TestKey::Idle);
        assert_eq!(ctx.delta(), Duration::from_millis(16));
        assert_eq!(
            ctx.pending_requests(),
            &[
                StateRequest::Push(TestKey::Combat),
                StateRequest::Pop,
                StateRequest::Change(TestKey::Combat),
            ]
        );
    }

    #[test]
    fn context_exposes_blackboard_writes() {
        let mut blackboard = Blackboard::new();
        let mut requests = Vec::new();
        let state = TestKey::Combat;
        {
            let mut ctx =
                StateContext::new(&(), &mut blackboard, &mut requests, &state, Duration::ZERO);
            ctx.blackboard_mut().set("combo", 3).unwrap();
            assert_eq!(ctx.blackboard().get("combo", 0), 3);
        }
        assert_eq!(blackboard.dirty_count(), 1);
    }
}
