//! Dwell-time statistics built from lifecycle events.
//!
//! The profiler never talks to a machine directly. It only consumes
//! [`MachineEvent`]s, so it can be fed by the machine's built-in hook
//! (see [`MachineConfig::profiling`](crate::builder::MachineConfig)) or by
//! any event subscription.

use crate::core::{elapsed_between, StateKey};
use crate::machine::MachineEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Dwell statistics for one state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DwellRecord {
    pub enter_count: u64,
    pub exit_count: u64,
    pub total_dwell: Duration,
    pub min_dwell: Option<Duration>,
    pub max_dwell: Option<Duration>,
    /// Set while the state is entered and not yet exited
    pub last_enter_at: Option<DateTime<Utc>>,
}

impl DwellRecord {
    /// Mean dwell over completed visits. `None` before the first exit.
    pub fn average_dwell(&self) -> Option<Duration> {
        let visits = u32::try_from(self.exit_count).ok()?;
        self.total_dwell.checked_div(visits)
    }

    fn record_exit(&mut self, at: DateTime<Utc>) {
        self.exit_count += 1;
        let Some(entered) = self.last_enter_at.take() else {
            return;
        };
        let dwell = elapsed_between(entered, at);
        self.total_dwell += dwell;
        self.min_dwell = Some(self.min_dwell.map_or(dwell, |min| min.min(dwell)));
        self.max_dwell = Some(self.max_dwell.map_or(dwell, |max| max.max(dwell)));
    }
}

/// Per-state dwell accounting.
#[derive(Clone, Debug)]
pub struct Profiler<K: StateKey> {
    records: HashMap<K, DwellRecord>,
}

impl<K: StateKey> Profiler<K> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Fold one event into the statistics. Events other than enter/exit
    /// are ignored.
    pub fn observe(&mut self, event: &MachineEvent<K>) {
        match event {
            MachineEvent::StateEntered { state, at } => {
                let record = self.records.entry(state.clone()).or_default();
                record.enter_count += 1;
                record.last_enter_at = Some(*at);
            }
            MachineEvent::StateExited { state, at } => {
                self.records
                    .entry(state.clone())
                    .or_default()
                    .record_exit(*at);
            }
            _ => {}
        }
    }

    pub fn record(&self, key: &K) -> Option<&DwellRecord> {
        self.records.get(key)
    }

    /// Total dwell for `key`, zero for states never seen.
    pub fn total_dwell(&self, key: &K) -> Duration {
        self.records
            .get(key)
            .map_or(Duration::ZERO, |record| record.total_dwell)
    }

    pub fn records(&self) -> impl Iterator<Item = (&K, &DwellRecord)> {
        self.records.iter()
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Serializable summary, sorted by state name.
    pub fn snapshot(&self) -> ProfileReport {
        let mut states: Vec<ProfileEntry> = self
            .records
            .iter()
            .map(|(key, record)| ProfileEntry {
                state: key.name().to_string(),
                enter_count: record.enter_count,
                exit_count: record.exit_count,
                total_dwell: record.total_dwell,
                average_dwell: record.average_dwell(),
                min_dwell: record.min_dwell,
                max_dwell: record.max_dwell,
            })
            .collect();
        states.sort_by(|a, b| a.state.cmp(&b.state));
        ProfileReport { states }
    }

    /// Human-readable report.
    pub fn report(&self) -> String {
        self.snapshot().to_string()
    }
}

impl<K: StateKey> Default for Profiler<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of a [`ProfileReport`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub state: String,
    pub enter_count: u64,
    pub exit_count: u64,
    pub total_dwell: Duration,
    pub average_dwell: Option<Duration>,
    pub min_dwell: Option<Duration>,
    pub max_dwell: Option<Duration>,
}

/// Snapshot of a profiler.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    pub states: Vec<ProfileEntry>,
}

fn seconds(duration: Option<Duration>) -> String {
    duration.map_or_else(|| "-".to_string(), |d| format!("{:.3}s", d.as_secs_f64()))
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State profile")?;
        if self.states.is_empty() {
            return writeln!(f, "  (no states observed)");
        }
        for entry in &self.states {
            writeln!(
                f,
                "  {:<20} entered {:>4}x  total {:>9}  avg {:>9}  min {:>9}  max {:>9}",
                entry.state,
                entry.enter_count,
                seconds(Some(entry.total_dwell)),
                seconds(entry.average_dwell),
                seconds(entry.min_dwell),
                seconds(entry.max_dwell),
            )?;
        }
        Ok(())
    }
}
