//! The machine: current state, transitions, ticking and dispatch.

use crate::blackboard::{Blackboard, BlackboardError};
use crate::builder::{MachineBuilder, MachineConfig};
use crate::core::{
    display_name, elapsed_between, Clock, StateContext, StateKey, StateNode, StateRequest,
    SystemClock, TransitionPool, DEFAULT_PRIORITY,
};
use crate::machine::error::{MachineError, TransitionOutcome};
use crate::machine::events::{EventBus, MachineEvent, SubscriptionId};
use crate::machine::registry::{StateMetadata, StateRegistry};
use crate::machine::stack::{StateStack, StateStackFrame};
use crate::profiler::Profiler;
use crate::validator::{DefaultValidator, TransitionValidator};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace, warn};
use uuid::Uuid;

type MachineResult = Result<TransitionOutcome, MachineError>;

#[derive(Clone, Copy, Debug)]
enum Hook {
    Enter,
    Exit,
    Update,
    Pause,
    Resume,
}

/// A hook-issued request and the state whose hook issued it.
#[derive(Clone, Debug)]
struct QueuedRequest<K: StateKey> {
    origin: K,
    request: StateRequest<K>,
}

/// Priority-gated, stack-capable state machine.
///
/// `K` names the states and `O` is an opaque owner handle passed through
/// to every hook. The machine is driven by calling [`update`](Self::update)
/// once per host tick; everything else is a plain synchronous call that
/// either completes or is rejected before returning.
pub struct Machine<K: StateKey, O> {
    id: Uuid,
    owner: O,
    registry: StateRegistry<K, O>,
    validator: Box<dyn TransitionValidator<K>>,
    stack: StateStack<K>,
    blackboard: Blackboard,
    current: Option<K>,
    previous: Option<K>,
    requests: Vec<QueuedRequest<K>>,
    events: EventBus<K>,
    profiler: Option<Profiler<K>>,
    pool: TransitionPool<K>,
    clock: Box<dyn Clock>,
    config: MachineConfig,
}

impl<K: StateKey, O> Machine<K, O> {
    /// Machine with the default validator, system clock and configuration.
    pub fn new(owner: O) -> Self {
        Self::with_parts(
            owner,
            Box::new(DefaultValidator),
            Box::new(SystemClock),
            MachineConfig::default(),
        )
    }

    pub fn builder() -> MachineBuilder<K, O> {
        MachineBuilder::new()
    }

    pub(crate) fn with_parts(
        owner: O,
        validator: Box<dyn TransitionValidator<K>>,
        clock: Box<dyn Clock>,
        config: MachineConfig,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(machine = %id, ?config, "machine created");
        Self {
            id,
            owner,
            registry: StateRegistry::new(),
            validator,
            stack: StateStack::new(),
            blackboard: Blackboard::new(),
            current: None,
            previous: None,
            requests: Vec::new(),
            events: EventBus::new(),
            profiler: config.profiling.then(Profiler::new),
            pool: TransitionPool::new(config.record_pool_capacity),
            clock,
            config,
        }
    }

    /// Identifier attached to this machine's log events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Replace the transition validator.
    pub fn set_validator<V>(&mut self, validator: V)
    where
        V: TransitionValidator<K> + 'static,
    {
        self.validator = Box::new(validator);
    }

    /// Register `node` under `key`. A key can only be registered once.
    pub fn register<N>(&mut self, key: K, node: N) -> Result<(), MachineError>
    where
        N: StateNode<K, O> + 'static,
    {
        self.register_boxed(key, Box::new(node))
    }

    pub(crate) fn register_boxed(
        &mut self,
        key: K,
        node: Box<dyn StateNode<K, O>>,
    ) -> Result<(), MachineError> {
        let name = key.name().to_string();
        self.registry.register(key, node)?;
        debug!(machine = %self.id, state = %name, "state registered");
        Ok(())
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&MachineEvent<K>) + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Start the machine in `key`.
    ///
    /// Only legal while nothing is current. Bypasses the validator, the
    /// priority rule and the stack.
    pub fn run(&mut self, key: K) -> MachineResult {
        if let Some(current) = &self.current {
            if *current == key {
                return Ok(TransitionOutcome::AlreadyCurrent);
            }
            return Err(self.reject(MachineError::AlreadyRunning {
                current: current.name().to_string(),
            }));
        }
        self.ensure_registered(&key)?;

        let now = self.clock.now();
        self.current = Some(key.clone());
        self.enter_state(&key, now);
        debug!(machine = %self.id, state = %key.name(), "machine started");

        self.emit_changed(None, key.clone(), now);
        self.emit(&MachineEvent::StateEntered { state: key, at: now });
        Ok(TransitionOutcome::Completed)
    }

    /// Replace the current state with `key`.
    ///
    /// Checked in order: validator, priority (`key` may not have a lower
    /// priority than the current state), and the current state's
    /// `can_exit`. Any failure leaves the machine untouched.
    pub fn change_state(&mut self, key: K) -> MachineResult {
        self.change_to(key, true)
    }

    fn change_to(&mut self, key: K, enforce_priority: bool) -> MachineResult {
        let Some(current) = self.current.clone() else {
            return Err(self.reject(MachineError::NotRunning));
        };
        self.ensure_registered(&key)?;
        if current == key {
            return Ok(TransitionOutcome::AlreadyCurrent);
        }
        self.check_preemption(&current, &key, enforce_priority)?;

        let now = self.clock.now();
        self.exit_state(&current, now);
        self.previous = Some(current.clone());
        self.current = Some(key.clone());
        self.enter_state(&key, now);
        self.validator.on_transition(Some(&current), &key);
        debug!(
            machine = %self.id,
            from = %current.name(),
            to = %key.name(),
            "state changed"
        );

        self.emit_changed(Some(current.clone()), key.clone(), now);
        self.emit(&MachineEvent::StateExited {
            state: current,
            at: now,
        });
        self.emit(&MachineEvent::StateEntered { state: key, at: now });
        Ok(TransitionOutcome::Completed)
    }

    /// Pause the current state and make `key` current on top of it.
    ///
    /// Goes through the same checks as [`change_state`](Self::change_state).
    /// With nothing current this behaves like [`run`](Self::run).
    pub fn push_state(&mut self, key: K) -> MachineResult {
        self.push_to(key, true)
    }

    fn push_to(&mut self, key: K, enforce_priority: bool) -> MachineResult {
        let Some(current) = self.current.clone() else {
            return self.run(key);
        };
        self.ensure_registered(&key)?;
        if current == key {
            return Ok(TransitionOutcome::AlreadyCurrent);
        }
        self.check_preemption(&current, &key, enforce_priority)?;

        let now = self.clock.now();
        if self.is_interruptible(&current) {
            self.invoke(&current, Hook::Pause, Duration::ZERO);
        }
        self.stack.push(StateStackFrame {
            key: current.clone(),
            paused_at: now,
        });
        self.previous = Some(current.clone());
        self.current = Some(key.clone());
        self.enter_state(&key, now);
        self.validator.on_transition(Some(&current), &key);
        debug!(
            machine = %self.id,
            paused = %current.name(),
            pushed = %key.name(),
            depth = self.stack.depth(),
            "state pushed"
        );

        self.emit_changed(Some(current.clone()), key.clone(), now);
        self.emit(&MachineEvent::StatePaused {
            state: current,
            at: now,
        });
        self.emit(&MachineEvent::StateEntered { state: key, at: now });
        Ok(TransitionOutcome::Completed)
    }

    /// Exit the current state and resume the most recently paused one.
    ///
    /// Honours the current state's `can_exit`; the validator and priority
    /// rule do not apply to resuming.
    pub fn pop_state(&mut self) -> MachineResult {
        if self.stack.is_empty() {
            return Err(self.reject(MachineError::EmptyStackPop));
        }
        let Some(current) = self.current.clone() else {
            return Err(self.reject(MachineError::NotRunning));
        };
        if !self.node_can_exit(&current) {
            return Err(self.reject(MachineError::ExitRefused {
                state: current.name().to_string(),
            }));
        }
        let Some(frame) = self.stack.pop() else {
            return Err(self.reject(MachineError::EmptyStackPop));
        };

        let now = self.clock.now();
        self.exit_state(&current, now);
        let paused_for = elapsed_between(frame.paused_at, now);
        if let Some(metadata) = self.registry.metadata_mut(&frame.key) {
            metadata.total_paused_time += paused_for;
        }
        self.previous = Some(current.clone());
        self.current = Some(frame.key.clone());
        if self.is_interruptible(&frame.key) {
            self.invoke(&frame.key, Hook::Resume, Duration::ZERO);
        }
        self.validator.on_transition(Some(&current), &frame.key);
        debug!(
            machine = %self.id,
            popped = %current.name(),
            resumed = %frame.key.name(),
            ?paused_for,
            "state popped"
        );

        self.emit_changed(Some(current.clone()), frame.key.clone(), now);
        self.emit(&MachineEvent::StateExited {
            state: current,
            at: now,
        });
        self.emit(&MachineEvent::StateResumed {
            state: frame.key,
            at: now,
            paused_for,
        });
        Ok(TransitionOutcome::Completed)
    }

    /// Exit the current state and every paused state, top to bottom,
    /// without resuming any of them. The machine is left with nothing
    /// current. Returns the number of states exited.
    pub fn clear_stack(&mut self) -> usize {
        let now = self.clock.now();
        let mut exited = 0;

        if let Some(current) = self.current.take() {
            self.exit_state(&current, now);
            self.previous = Some(current.clone());
            self.emit(&MachineEvent::StateExited {
                state: current,
                at: now,
            });
            exited += 1;
        }
        for frame in self.stack.drain_top_down() {
            self.exit_state(&frame.key, now);
            self.emit(&MachineEvent::StateExited {
                state: frame.key,
                at: now,
            });
            exited += 1;
        }
        // Requests issued by exiting states have nothing left to act on.
        self.requests.clear();

        if exited > 0 {
            debug!(machine = %self.id, exited, "state stack cleared");
        }
        exited
    }

    /// Tear down: exit everything still alive. Also run on drop.
    pub fn shutdown(&mut self) {
        let exited = self.clear_stack();
        trace!(machine = %self.id, exited, "machine shut down");
    }

    /// Advance one tick.
    ///
    /// Runs the current state's `on_update`, applies transitions requested
    /// by hooks, then drains the blackboard and notifies subscribers of
    /// every key that changed.
    pub fn update(&mut self, delta: Duration) {
        if let Some(current) = self.current.clone() {
            trace!(machine = %self.id, state = %current.name(), ?delta, "tick");
            self.invoke(&current, Hook::Update, delta);
            if let Some(metadata) = self.registry.metadata_mut(&current) {
                metadata.active_time += delta;
            }
        }

        self.apply_requests();

        for (key, value) in self.blackboard.drain_dirty() {
            self.emit(&MachineEvent::BlackboardValueChanged { key, value });
        }
    }

    pub fn set_blackboard_value<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<bool, BlackboardError> {
        self.blackboard.set(key, value)
    }

    pub fn get_blackboard_value<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.blackboard.get(key, default)
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn current_state(&self) -> Option<&K> {
        self.current.as_ref()
    }

    pub fn previous_state(&self) -> Option<&K> {
        self.previous.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_in_state(&self, key: &K) -> bool {
        self.current.as_ref() == Some(key)
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn stack(&self) -> &StateStack<K> {
        &self.stack
    }

    pub fn registry(&self) -> &StateRegistry<K, O> {
        &self.registry
    }

    pub fn metadata(&self, key: &K) -> Option<&StateMetadata> {
        self.registry.metadata(key)
    }

    /// Wall-clock time since the current state was last entered.
    pub fn time_in_current_state(&self) -> Option<Duration> {
        let current = self.current.as_ref()?;
        let entered = self.registry.metadata(current)?.last_enter_at?;
        Some(elapsed_between(entered, self.clock.now()))
    }

    /// Transition requests queued by hooks and not yet applied, oldest first.
    pub fn pending_requests(&self) -> impl Iterator<Item = &StateRequest<K>> {
        self.requests.iter().map(|queued| &queued.request)
    }

    pub fn profiler(&self) -> Option<&Profiler<K>> {
        self.profiler.as_ref()
    }

    pub fn profiler_report(&self) -> String {
        match &self.profiler {
            Some(profiler) => profiler.report(),
            None => "State profile\n  (profiling disabled)\n".to_string(),
        }
    }

    fn ensure_registered(&self, key: &K) -> Result<(), MachineError> {
        if self.registry.contains(key) {
            Ok(())
        } else {
            Err(self.reject(MachineError::UnknownState {
                state: key.name().to_string(),
            }))
        }
    }

    fn check_preemption(
        &self,
        current: &K,
        target: &K,
        enforce_priority: bool,
    ) -> Result<(), MachineError> {
        if self.stack.contains(target) {
            return Err(self.reject(MachineError::StateSuspended {
                state: target.name().to_string(),
            }));
        }
        if !self.validator.can_transition(Some(current), target) {
            return Err(self.reject(MachineError::TransitionRejected {
                from: current.name().to_string(),
                to: target.name().to_string(),
            }));
        }

        let current_priority = self.priority_of(current);
        let target_priority = self.priority_of(target);
        if enforce_priority && target_priority < current_priority {
            return Err(self.reject(MachineError::PriorityViolation {
                current: current.name().to_string(),
                current_priority,
                target: target.name().to_string(),
                target_priority,
            }));
        }

        if !self.node_can_exit(current) {
            return Err(self.reject(MachineError::ExitRefused {
                state: current.name().to_string(),
            }));
        }
        Ok(())
    }

    fn priority_of(&self, key: &K) -> i32 {
        self.registry
            .metadata(key)
            .map_or(DEFAULT_PRIORITY, |metadata| metadata.priority)
    }

    fn is_interruptible(&self, key: &K) -> bool {
        self.registry
            .metadata(key)
            .is_some_and(|metadata| metadata.interruptible)
    }

    fn node_can_exit(&self, key: &K) -> bool {
        self.registry.resolve(key).map_or(true, |node| node.can_exit())
    }

    fn reject(&self, error: MachineError) -> MachineError {
        match &error {
            MachineError::UnknownState { .. } | MachineError::AlreadyRunning { .. } => {
                warn!(machine = %self.id, current = %display_name(self.current.as_ref()), %error, "operation rejected");
            }
            _ => {
                debug!(machine = %self.id, current = %display_name(self.current.as_ref()), %error, "operation rejected");
            }
        }
        error
    }

    fn enter_state(&mut self, key: &K, now: DateTime<Utc>) {
        if let Some(metadata) = self.registry.metadata_mut(key) {
            metadata.enter_count += 1;
            metadata.last_enter_at = Some(now);
        }
        self.invoke(key, Hook::Enter, Duration::ZERO);
    }

    fn exit_state(&mut self, key: &K, now: DateTime<Utc>) {
        self.invoke(key, Hook::Exit, Duration::ZERO);
        if let Some(metadata) = self.registry.metadata_mut(key) {
            metadata.exit_count += 1;
            if let Some(entered) = metadata.last_enter_at {
                metadata.total_dwell_time += elapsed_between(entered, now);
            }
        }
    }

    fn invoke(&mut self, key: &K, hook: Hook, delta: Duration) {
        let mut issued = Vec::new();
        {
            let Self {
                registry,
                owner,
                blackboard,
                ..
            } = self;
            let Ok(node) = registry.resolve_mut(key) else {
                return;
            };
            let mut ctx = StateContext::new(owner, blackboard, &mut issued, key, delta);
            match hook {
                Hook::Enter => node.on_enter(&mut ctx),
                Hook::Exit => node.on_exit(&mut ctx),
                Hook::Update => node.on_update(&mut ctx),
                Hook::Pause => node.on_pause(&mut ctx),
                Hook::Resume => node.on_resume(&mut ctx),
            }
        }
        self.requests
            .extend(issued.into_iter().map(|request| QueuedRequest {
                origin: key.clone(),
                request,
            }));
    }

    fn apply_requests(&mut self) {
        let mut budget = self.config.max_chained_requests;
        while !self.requests.is_empty() {
            let mut batch = std::mem::take(&mut self.requests).into_iter();
            while let Some(queued) = batch.next() {
                if budget == 0 {
                    let dropped = 1 + batch.len() + self.requests.len();
                    warn!(
                        machine = %self.id,
                        dropped,
                        limit = self.config.max_chained_requests,
                        "too many chained state requests in one tick"
                    );
                    self.requests.clear();
                    return;
                }
                budget -= 1;

                // Requests from the current state's own hooks skip the
                // priority floor.
                let yielding = self.current.as_ref() == Some(&queued.origin);
                let result = match queued.request {
                    StateRequest::Change(key) => self.change_to(key, !yielding),
                    StateRequest::Push(key) => self.push_to(key, !yielding),
                    StateRequest::Pop => self.pop_state(),
                };
                if let Err(error) = result {
                    debug!(machine = %self.id, %error, "state request not applied");
                }
            }
        }
    }

    fn emit(&mut self, event: &MachineEvent<K>) {
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.observe(event);
        }
        self.events.dispatch(event);
    }

    fn emit_changed(&mut self, from: Option<K>, to: K, at: DateTime<Utc>) {
        let record = self.pool.acquire(from, to, at);
        let event = MachineEvent::StateChanged(record);
        self.emit(&event);
        if let MachineEvent::StateChanged(record) = event {
            self.pool.release(record);
        }
    }
}

impl<K: StateKey, O> Drop for Machine<K, O> {
    fn drop(&mut self) {
        if self.current.is_some() || !self.stack.is_empty() {
            self.shutdown();
        }
    }
}
