//! Builder for constructing machines.

use crate::builder::config::MachineConfig;
use crate::builder::error::BuildError;
use crate::core::{Clock, StateKey, StateNode, SystemClock};
use crate::machine::Machine;
use crate::validator::{DefaultValidator, TransitionValidator};

/// Fluent construction of a [`Machine`].
///
/// The owner is required. Everything else falls back to the defaults used
/// by [`Machine::new`].
pub struct MachineBuilder<K: StateKey, O> {
    owner: Option<O>,
    validator: Option<Box<dyn TransitionValidator<K>>>,
    clock: Option<Box<dyn Clock>>,
    config: MachineConfig,
    states: Vec<(K, Box<dyn StateNode<K, O>>)>,
}

impl<K: StateKey, O> MachineBuilder<K, O> {
    pub fn new() -> Self {
        Self {
            owner: None,
            validator: None,
            clock: None,
            config: MachineConfig::default(),
            states: Vec::new(),
        }
    }

    /// Set the owner handle passed to every hook (required).
    pub fn owner(mut self, owner: O) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn validator<V>(mut self, validator: V) -> Self
    where
        V: TransitionValidator<K> + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Use `clock` for timestamps and dwell time instead of the system clock.
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a state at build time. Registration order is preserved.
    pub fn state<N>(mut self, key: K, node: N) -> Self
    where
        N: StateNode<K, O> + 'static,
    {
        self.states.push((key, Box::new(node)));
        self
    }

    /// Build the machine.
    /// Fails on a missing owner, an invalid config or a duplicate key.
    pub fn build(self) -> Result<Machine<K, O>, BuildError> {
        let owner = self.owner.ok_or(BuildError::MissingOwner)?;
        self.config.validate().map_err(BuildError::InvalidConfig)?;

        let mut machine = Machine::with_parts(
            owner,
            self.validator
                .unwrap_or_else(|| Box::new(DefaultValidator)),
            self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            self.config,
        );
        for (key, node) in self.states {
            machine.register_boxed(key, node)?;
        }

        Ok(machine)
    }
}

impl<K: StateKey, O> Default for MachineBuilder<K, O> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ManualClock, Priority, StateContext};
    use crate::machine::MachineError;
    use crate::state_enum;
    use crate::validator::RulesBuilder;
    use std::time::Duration;

    state_enum! {
        enum TestKey {
            Menu,
            Playing,
        }
    }

    struct Screen(Priority);

    impl StateNode<TestKey, String> for Screen {
        fn on_enter(&mut self, _ctx: &mut StateContext<'_, TestKey, String>) {}
        fn on_exit(&mut self, _ctx: &mut StateContext<'_, TestKey, String>) {}
        fn on_update(&mut self, _ctx: &mut StateContext<'_, TestKey, String>) {}

        fn priority(&self) -> Priority {
            self.0
        }
    }

    #[test]
    fn builder_requires_owner() {
        let result = MachineBuilder::<TestKey, String>::new()
            .state(TestKey::Menu, Screen(0))
            .build();

        assert!(matches!(result, Err(BuildError::MissingOwner)));
    }

    #[test]
    fn builder_registers_states() {
        let machine = MachineBuilder::new()
            .owner("player one".to_string())
            .state(TestKey::Menu, Screen(0))
            .state(TestKey::Playing, Screen(3))
            .build()
            .unwrap();

        assert_eq!(machine.owner(), "player one");
        assert_eq!(machine.registry().len(), 2);
        assert_eq!(machine.metadata(&TestKey::Playing).unwrap().priority, 3);
        assert!(!machine.is_running());
    }

    #[test]
    fn builder_rejects_duplicate_states() {
        let result = MachineBuilder::new()
            .owner(String::new())
            .state(TestKey::Menu, Screen(0))
            .state(TestKey::Menu, Screen(1))
            .build();

        assert!(matches!(
            result,
            Err(BuildError::Registration(
                MachineError::DuplicateRegistration { .. }
            ))
        ));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = MachineBuilder::<TestKey, String>::new()
            .owner(String::new())
            .config(MachineConfig {
                max_chained_requests: 0,
                ..MachineConfig::default()
            })
            .build();

        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));
    }

    #[test]
    fn builder_wires_validator_and_clock() {
        let clock = ManualClock::new();
        let mut machine = MachineBuilder::new()
            .owner(String::new())
            .validator(RulesBuilder::new().deny(TestKey::Menu, TestKey::Playing).build())
            .clock(clock.clone())
            .state(TestKey::Menu, Screen(0))
            .state(TestKey::Playing, Screen(0))
            .build()
            .unwrap();

        machine.run(TestKey::Menu).unwrap();
        clock.advance(Duration::from_secs(1));

        assert!(matches!(
            machine.change_state(TestKey::Playing),
            Err(MachineError::TransitionRejected { .. })
        ));
        assert_eq!(machine.time_in_current_state(), Some(Duration::from_secs(1)));
    }
}
