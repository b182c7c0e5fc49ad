//! Serialized ledger snapshots.
//!
//! A snapshot is a JSON object mapping `YYYY-MM-DD` to an array of task
//! records:
//!
//! ```json
//! {"2025-05-06": [{"id": "task-…", "name": "Review",
//!   "entries": [{"kind": "start", "timestamp": "2025-05-06T09:00:00.000"}],
//!   "manualAdded": 0, "manualRemoved": 0, "notes": ""}]}
//! ```
//!
//! # Legacy Shapes
//!
//! Decoding upgrades records written by earlier versions:
//! - `timeEntries` / `type` / `time` are read as `entries` / `kind` / `timestamp`
//! - `manualTimeAdded` / `manualTimeRemoved` are read as `manualAdded` / `manualRemoved`
//! - a numeric `manualTime` is folded into `manualAdded`
//! - `title` becomes `name` when `name` is absent
//! - missing `notes`, `entries` or `id` get defaults
//!
//! Timestamps are parsed into instants and each log is sorted before the
//! ledger is handed back.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entry::TimeEntry;
use crate::ledger::{Day, Ledger};
use crate::task::Task;
use crate::types::{DateKey, TaskId};

/// Snapshot encoding and decoding errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The document was not valid JSON or had the wrong shape.
    #[error("invalid snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    /// A top-level key was not a `YYYY-MM-DD` date.
    #[error("invalid date key in snapshot: {key}")]
    DateKey { key: String },

    /// A task record could not be upgraded into a task.
    #[error("invalid task record {index} on {date}: {message}")]
    Record {
        date: DateKey,
        index: usize,
        message: String,
    },
}

/// A task record as it may appear on disk, in any historical shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "timeEntries")]
    entries: Option<Vec<TimeEntry>>,
    #[serde(default, alias = "manualTimeAdded")]
    manual_added: Option<f64>,
    #[serde(default, alias = "manualTimeRemoved")]
    manual_removed: Option<f64>,
    #[serde(default)]
    manual_time: Option<f64>,
    #[serde(default)]
    notes: Option<String>,
}

/// Converts a stored millisecond amount, treating negatives and NaN as zero.
#[allow(clippy::cast_possible_truncation)]
fn millis(value: Option<f64>) -> i64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map_or(0, |v| v.round() as i64)
}

impl TaskRecord {
    fn upgrade(self, date: DateKey, index: usize) -> Result<Task, SnapshotError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .or(self.title.filter(|t| !t.trim().is_empty()))
            .map(|n| n.trim().to_string())
            .ok_or_else(|| SnapshotError::Record {
                date,
                index,
                message: "missing task name".to_string(),
            })?;

        let id = self
            .id
            .and_then(|id| TaskId::new(id).ok())
            .unwrap_or_else(TaskId::generate);

        let legacy_manual = millis(self.manual_time);
        if legacy_manual > 0 {
            warn!(%date, %id, legacy_manual, "folded legacy manualTime into manualAdded");
        }

        let mut task = Task::new(id, name);
        task.entries = self.entries.unwrap_or_default();
        task.sort_entries();
        task.manual_added = millis(self.manual_added).saturating_add(legacy_manual);
        task.manual_removed = millis(self.manual_removed);
        task.notes = self.notes.unwrap_or_default();
        Ok(task)
    }
}

/// Decodes a snapshot document into a ledger, upgrading legacy records.
pub fn decode(json: &str) -> Result<Ledger, SnapshotError> {
    let raw: BTreeMap<String, Option<Vec<TaskRecord>>> = serde_json::from_str(json)?;
    let mut ledger = Ledger::new();

    for (key, records) in raw {
        let date: DateKey = key
            .parse()
            .map_err(|_| SnapshotError::DateKey { key: key.clone() })?;
        let tasks = records
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.upgrade(date, index))
            .collect::<Result<Vec<_>, _>>()?;
        let mut seen = HashSet::new();
        if !tasks.iter().all(|task| seen.insert(task.name.to_lowercase())) {
            debug!(%date, "loaded day has duplicate task names");
        }
        ledger.insert_day(Day { date, tasks });
    }

    Ok(ledger)
}

/// Encodes a ledger as a snapshot document.
pub fn encode(ledger: &Ledger) -> Result<String, SnapshotError> {
    let days: BTreeMap<DateKey, &[Task]> = ledger
        .days()
        .map(|day| (day.date, day.tasks.as_slice()))
        .collect();
    Ok(serde_json::to_string(&days)?)
}
