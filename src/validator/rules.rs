//! Composite transition rules checked with `Validation`.

use crate::core::{display_name, Guard, StateKey};
use crate::validator::violations::RuleViolation;
use crate::validator::TransitionValidator;
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

/// Callback run after a transition has been accepted.
pub type TransitionObserver<K> = Box<dyn FnMut(Option<&K>, &K)>;

/// Rule set gating transitions.
/// Uses Validation to accumulate ALL violations of a rejected transition.
pub struct TransitionRules<K: StateKey> {
    pub(crate) deny_self: bool,
    pub(crate) restricted: bool,
    pub(crate) allowed: HashMap<K, HashSet<K>>,
    pub(crate) open_targets: HashSet<K>,
    pub(crate) denied: HashSet<(K, K)>,
    pub(crate) guards: Vec<(Guard<K>, String)>,
    pub(crate) observers: Vec<TransitionObserver<K>>,
}

impl<K: StateKey> TransitionRules<K> {
    /// Check every rule, accumulating ALL violations.
    /// Returns Validation::Success(()) if all checks pass.
    pub fn check(&self, from: Option<&K>, to: &K) -> Validation<(), NonEmptyVec<RuleViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<RuleViolation>>> = Vec::new();

        if self.deny_self && from == Some(to) {
            checks.push(Validation::fail(RuleViolation::SelfTransition {
                state: to.name().to_string(),
            }));
        }

        // The adjacency list only constrains transitions out of a state.
        if let (true, Some(source)) = (self.restricted, from) {
            let listed = self
                .allowed
                .get(source)
                .is_some_and(|targets| targets.contains(to));
            if !listed && !self.open_targets.contains(to) {
                checks.push(Validation::fail(RuleViolation::NotAllowed {
                    from: source.name().to_string(),
                    to: to.name().to_string(),
                }));
            }
        }

        if let Some(source) = from {
            if self.denied.contains(&(source.clone(), to.clone())) {
                checks.push(Validation::fail(RuleViolation::Denied {
                    from: source.name().to_string(),
                    to: to.name().to_string(),
                }));
            }
        }

        for (guard, message) in &self.guards {
            let check = if guard.check(from, to) {
                Validation::success(())
            } else {
                Validation::fail(RuleViolation::GuardFailed {
                    message: message.clone(),
                })
            };
            checks.push(check);
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Whether an explicit allow-list is in force.
    pub fn is_restricted(&self) -> bool {
        self.restricted
    }
}

impl<K: StateKey> TransitionValidator<K> for TransitionRules<K> {
    fn can_transition(&self, from: Option<&K>, to: &K) -> bool {
        match self.check(from, to) {
            Validation::Success(_) => true,
            Validation::Failure(violations) => {
                for violation in violations.iter() {
                    debug!(
                        from = %display_name(from),
                        to = %to.name(),
                        %violation,
                        "transition rule violated"
                    );
                }
                false
            }
        }
    }

    fn on_transition(&mut self, from: Option<&K>, to: &K) {
        for observer in &mut self.observers {
            observer(from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::builder::RulesBuilder;
    use serde::{Deserialize, Serialize};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestKey {
        Menu,
        Playing,
        Paused,
        GameOver,
    }

    impl StateKey for TestKey {
        fn name(&self) -> &str {
            match self {
                Self::Menu => "Menu",
                Self::Playing => "Playing",
                Self::Paused => "Paused",
                Self::GameOver => "GameOver",
            }
        }
    }

    #[test]
    fn unrestricted_rules_only_block_self_transitions() {
        let rules: TransitionRules<TestKey> = RulesBuilder::new().build();

        assert!(rules.can_transition(Some(&TestKey::Menu), &TestKey::GameOver));
        assert!(rules.can_transition(None, &TestKey::Menu));
        assert!(!rules.can_transition(Some(&TestKey::Menu), &TestKey::Menu));
        assert!(!rules.is_restricted());
    }

    #[test]
    fn self_transitions_can_be_permitted() {
        let rules: TransitionRules<TestKey> = RulesBuilder::new().allow_self_transitions().build();
        assert!(rules.can_transition(Some(&TestKey::Playing), &TestKey::Playing));
    }

    #[test]
    fn allow_list_restricts_outgoing_edges() {
        let rules = RulesBuilder::new()
            .allow(TestKey::Menu, TestKey::Playing)
            .allow(TestKey::Playing, TestKey::Paused)
            .allow(TestKey::Paused, TestKey::Playing)
            .build();

        assert!(rules.is_restricted());
        assert!(rules.can_transition(Some(&TestKey::Menu), &TestKey::Playing));
        assert!(rules.can_transition(Some(&TestKey::Paused), &TestKey::Playing));
        assert!(!rules.can_transition(Some(&TestKey::Menu), &TestKey::Paused));
        assert!(!rules.can_transition(Some(&TestKey::GameOver), &TestKey::Menu));
        // Starting a machine is never constrained by adjacency.
        assert!(rules.can_transition(None, &TestKey::Paused));
    }

    #[test]
    fn open_targets_are_reachable_from_anywhere() {
        let rules = RulesBuilder::new()
            .allow(TestKey::Menu, TestKey::Playing)
            .allow_from_anywhere(TestKey::GameOver)
            .build();

        assert!(rules.can_transition(Some(&TestKey::Paused), &TestKey::GameOver));
        assert!(rules.can_transition(Some(&TestKey::Menu), &TestKey::GameOver));
        assert!(!rules.can_transition(Some(&TestKey::Paused), &TestKey::Menu));
    }

    #[test]
    fn deny_overrides_open_policy() {
        let rules = RulesBuilder::new()
            .deny(TestKey::GameOver, TestKey::Paused)
            .build();

        assert!(!rules.can_transition(Some(&TestKey::GameOver), &TestKey::Paused));
        assert!(rules.can_transition(Some(&TestKey::Paused), &TestKey::GameOver));
    }

    #[test]
    fn check_accumulates_all_violations() {
        let rules = RulesBuilder::new()
            .allow(TestKey::Menu, TestKey::Playing)
            .deny(TestKey::Paused, TestKey::Paused)
            .require_pred(|_, _| false, "always fails".to_string())
            .build();

        match rules.check(Some(&TestKey::Paused), &TestKey::Paused) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 4);

                let has_self = errors
                    .iter()
                    .any(|e| matches!(e, RuleViolation::SelfTransition { .. }));
                let has_not_allowed = errors
                    .iter()
                    .any(|e| matches!(e, RuleViolation::NotAllowed { .. }));
                let has_denied = errors
                    .iter()
                    .any(|e| matches!(e, RuleViolation::Denied { .. }));
                let has_guard = errors
                    .iter()
                    .any(|e| matches!(e, RuleViolation::GuardFailed { .. }));

                assert!(has_self);
                assert!(has_not_allowed);
                assert!(has_denied);
                assert!(has_guard);
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn check_succeeds_when_all_rules_pass() {
        let rules = RulesBuilder::new()
            .allow(TestKey::Menu, TestKey::Playing)
            .require(
                Guard::target(|to: &TestKey| *to != TestKey::GameOver),
                "no game over".to_string(),
            )
            .build();

        assert!(rules
            .check(Some(&TestKey::Menu), &TestKey::Playing)
            .is_success());
    }

    #[test]
    fn observers_run_on_transition() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut rules = RulesBuilder::new()
            .on_transition(move |from: Option<&TestKey>, to: &TestKey| {
                sink.borrow_mut().push((from.copied(), *to));
            })
            .build();

        rules.on_transition(Some(&TestKey::Menu), &TestKey::Playing);
        rules.on_transition(None, &TestKey::Menu);

        assert_eq!(
            *seen.borrow(),
            vec![
                (Some(TestKey::Menu), TestKey::Playing),
                (None, TestKey::Menu)
            ]
        );
    }
}
