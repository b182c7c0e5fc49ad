//! Ledger operation errors.

use thiserror::Error;

use crate::types::DateKey;

/// A rejected ledger operation.
///
/// Every variant is recoverable by the caller. Operations validate before
/// mutating, so a returned error always means the ledger is unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Task name was blank after trimming.
    #[error("task name cannot be empty")]
    EmptyName,

    /// Another task on the same day already has this name (case-insensitive).
    #[error("a task named {name:?} already exists on this day")]
    DuplicateName { name: String },

    /// The task's last entry is already a start.
    #[error("task is already running")]
    AlreadyRunning,

    /// The task has no open start entry to stop.
    #[error("task is not currently running")]
    NotRunning,

    /// An entry or task position outside the current bounds.
    #[error("index {index} is out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A time value from the boundary could not be understood.
    #[error("invalid timestamp: {input}")]
    InvalidTimestamp { input: String },

    /// No tasks have ever been recorded for this day.
    #[error("no tasks recorded for {date}")]
    DayNotFound { date: DateKey },
}
