//! Core domain logic for the time ledger.
//!
//! This crate contains the fundamental types and logic for:
//! - Duration accounting: deriving tracked and total time from start/stop logs
//! - Start/stop state transitions and running-task arbitration
//! - Day grouping: per-day task lists, name rules and daily totals
//! - Snapshots: encoding the ledger and upgrading older stored shapes

pub mod clock;
pub mod entry;
mod error;
pub mod ledger;
pub mod snapshot;
pub mod task;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entry::{EntryKind, TimeEntry, UnknownEntryKind, parse_timestamp};
pub use error::LedgerError;
pub use ledger::{Arbitration, Day, Ledger, RunningTask, StartOutcome, TaskRef};
pub use snapshot::SnapshotError;
pub use task::{ManualKind, Tally, Task};
pub use types::{DateKey, TaskId, ValidationError};
