//! Tunables for a machine.

use serde::{Deserialize, Serialize};

/// Machine configuration.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use stagehand::builder::MachineConfig;
///
/// let config: MachineConfig = serde_json::from_str(r#"{ "profiling": false }"#).unwrap();
/// assert!(!config.profiling);
/// assert_eq!(config.record_pool_capacity, 8);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Idle transition records kept for reuse
    pub record_pool_capacity: usize,

    /// Upper bound on hook-issued requests applied in one tick
    pub max_chained_requests: usize,

    /// Feed lifecycle events to the built-in profiler
    pub profiling: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            record_pool_capacity: 8,
            max_chained_requests: 16,
            profiling: true,
        }
    }
}

impl MachineConfig {
    /// Check the configuration for values the machine cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chained_requests == 0 {
            return Err("max_chained_requests must be at least 1".to_string());
        }
        Ok(())
    }
}
