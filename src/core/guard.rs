//! Guard predicates over prospective transitions.
//!
//! Guards are pure boolean functions of a `(from, to)` pair. They are the
//! building block of custom [`TransitionRules`](crate::validator::TransitionRules).

use super::key::StateKey;
use std::marker::PhantomData;

/// Pure predicate deciding whether `from -> to` may happen.
///
/// `from` is `None` when the machine has no current state.
///
/// # Example
///
/// ```rust
/// use stagehand::core::{Guard, StateKey};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Mode {
///     Menu,
///     Playing,
///     GameOver,
/// }
///
/// impl StateKey for Mode {
///     fn name(&self) -> &str {
///         match self {
///             Self::Menu => "Menu",
///             Self::Playing => "Playing",
///             Self::GameOver => "GameOver",
///         }
///     }
/// }
///
/// // Game over can only be reached from gameplay.
/// let guard = Guard::new(|from: Option<&Mode>, to: &Mode| {
///     *to != Mode::GameOver || from == Some(&Mode::Playing)
/// });
///
/// assert!(guard.check(Some(&Mode::Playing), &Mode::GameOver));
/// assert!(!guard.check(Some(&Mode::Menu), &Mode::GameOver));
/// ```
pub struct Guard<K: StateKey> {
    predicate: Box<dyn Fn(Option<&K>, &K) -> bool + Send + Sync>,
    _phantom: PhantomData<K>,
}

impl<K: StateKey> Guard<K> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(Option<&K>, &K) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// Guard that only looks at the target state.
    pub fn target<F>(predicate: F) -> Self
    where
        F: Fn(&K) -> bool + Send + Sync + 'static,
    {
        Self::new(move |_, to| predicate(to))
    }

    /// Evaluate the predicate.
    pub fn check(&self, from: Option<&K>, to: &K) -> bool {
        (self.predicate)(from, to)
    }
}

impl<K: StateKey> std::fmt::Debug for Guard<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
