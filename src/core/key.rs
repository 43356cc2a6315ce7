//! State identifiers.
//!
//! Every registered state is addressed by a key. Keys are small, cheap
//! values (usually a fieldless enum generated with [`state_enum!`]) that
//! the machine uses for registry lookups, stack frames, events and
//! profiling.
//!
//! [`state_enum!`]: crate::state_enum

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of a registered state.
///
/// Equality is identity: two keys name the same state exactly when they
/// compare equal. Keys are hashed into the registry and copied freely, so
/// they should be as light as a type tag.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: keys index the registry and the profiler
/// - `Debug`: keys show up in diagnostics
/// - `Serialize` + `Deserialize`: transition records and metadata snapshots
///   can be exported
///
/// # Example
///
/// ```rust
/// use stagehand::core::StateKey;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Screen {
///     Menu,
///     Gameplay,
///     Pause,
/// }
///
/// impl StateKey for Screen {
///     fn name(&self) -> &str {
///         match self {
///             Self::Menu => "Menu",
///             Self::Gameplay => "Gameplay",
///             Self::Pause => "Pause",
///         }
///     }
/// }
///
/// assert_eq!(Screen::Pause.name(), "Pause");
/// ```
pub trait StateKey:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Human-readable name used in logs, errors and profiler reports.
    fn name(&self) -> &str;
}

/// Name of an optional key, `"<none>"` when absent.
pub(crate) fn display_name<K: StateKey>(key: Option<&K>) -> String {
    key.map(|k| k.name().to_string())
        .unwrap_or_else(|| "<none>".to_string())
}
