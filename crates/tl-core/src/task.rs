//! Tasks and duration accounting.
//!
//! A task's elapsed time is derived, never stored: it is a fold over the
//! start/stop log plus two manual accumulators.
//!
//! # Pairing Rules
//!
//! The log is read left to right after sorting by timestamp:
//!
//! 1. A `Start` opens an interval. A second `Start` before any `Stop` moves the
//!    open interval's beginning forward; it never creates a second run.
//! 2. A `Stop` closes the open interval and credits `stop - start`. A `Stop`
//!    with nothing open is ignored.
//! 3. If the log ends on a `Start`, the task is running and the open interval
//!    is credited up to the caller's `as_of` instant.
//!
//! The fold never rejects a log, so edited or out-of-order entries still
//! produce a number.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::entry::{EntryKind, TimeEntry};
use crate::error::LedgerError;
use crate::types::TaskId;

/// Which manual accumulator an adjustment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManualKind {
    Added,
    Removed,
}

/// Result of folding a task's entry log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    /// Milliseconds credited by closed start/stop pairs.
    pub closed_ms: i64,
    /// Beginning of the open interval, when the log ends on a start.
    pub open_since: Option<NaiveDateTime>,
}

impl Tally {
    /// Folds an entry log according to the pairing rules.
    pub fn of(entries: &[TimeEntry]) -> Self {
        let mut closed_ms: i64 = 0;
        let mut open: Option<NaiveDateTime> = None;

        for entry in entries {
            match entry.kind {
                EntryKind::Start => open = Some(entry.timestamp),
                EntryKind::Stop => {
                    if let Some(start) = open.take() {
                        let span = (entry.timestamp - start).num_milliseconds().max(0);
                        closed_ms = closed_ms.saturating_add(span);
                    }
                }
            }
        }

        let running = entries.last().is_some_and(|e| e.kind == EntryKind::Start);
        Self {
            closed_ms,
            open_since: if running { open } else { None },
        }
    }

    pub const fn is_running(&self) -> bool {
        self.open_since.is_some()
    }

    /// Total tracked milliseconds, crediting an open interval up to `as_of`.
    pub fn tracked_ms(&self, as_of: NaiveDateTime) -> i64 {
        let open_ms = self
            .open_since
            .map_or(0, |start| (as_of - start).num_milliseconds().max(0));
        self.closed_ms.saturating_add(open_ms)
    }
}

/// A unit of work tracked on a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Start/stop log, kept sorted by timestamp after every mutation.
    pub entries: Vec<TimeEntry>,
    /// Milliseconds added outside tracked intervals.
    pub manual_added: i64,
    /// Milliseconds removed outside tracked intervals.
    pub manual_removed: i64,
    pub notes: String,
}

impl Task {
    /// Creates an empty task. The name is stored as given; callers validate it.
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            entries: Vec::new(),
            manual_added: 0,
            manual_removed: 0,
            notes: String::new(),
        }
    }

    pub fn tally(&self) -> Tally {
        Tally::of(&self.entries)
    }

    /// True iff the chronologically last entry is a start.
    pub fn is_running(&self) -> bool {
        self.entries
            .last()
            .is_some_and(|e| e.kind == EntryKind::Start)
    }

    /// Milliseconds derived from the entry log alone.
    ///
    /// Deterministic for a fixed `as_of`, never negative, and non-decreasing in
    /// `as_of` while the task is running.
    pub fn tracked_duration(&self, as_of: NaiveDateTime) -> i64 {
        self.tally().tracked_ms(as_of)
    }

    /// Tracked time plus manual adjustments, clamped at zero.
    pub fn total_duration(&self, as_of: NaiveDateTime) -> i64 {
        self.clamped_total(self.tracked_duration(as_of))
    }

    /// Total duration counting only closed intervals.
    ///
    /// Used for exported summaries, where a running interval is left out.
    pub fn completed_duration(&self) -> i64 {
        self.clamped_total(self.tally().closed_ms)
    }

    fn clamped_total(&self, tracked_ms: i64) -> i64 {
        tracked_ms
            .saturating_add(self.manual_added)
            .saturating_sub(self.manual_removed)
            .max(0)
    }

    /// Appends a stop at `at` and re-sorts the log.
    pub fn stop_tracking(&mut self, at: NaiveDateTime) -> Result<(), LedgerError> {
        let Some(last) = self.entries.last() else {
            return Err(LedgerError::NotRunning);
        };
        if last.kind == EntryKind::Stop {
            return Err(LedgerError::NotRunning);
        }
        // Edited logs can end on a start yet hold more stops than starts.
        let starts = self
            .entries
            .iter()
            .filter(|e| e.kind == EntryKind::Start)
            .count();
        if starts <= self.entries.len() - starts {
            return Err(LedgerError::NotRunning);
        }

        self.push_entry(TimeEntry::stop(at));
        debug!(task = %self.id, %at, "stopped tracking");
        Ok(())
    }

    /// Rewrites one entry in place, then re-sorts.
    ///
    /// The resulting log is not checked for alternation.
    pub fn edit_entry(
        &mut self,
        index: usize,
        kind: EntryKind,
        timestamp: NaiveDateTime,
    ) -> Result<(), LedgerError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfRange { index, len })?;
        entry.kind = kind;
        entry.timestamp = timestamp;
        self.sort_entries();
        debug!(task = %self.id, index, %kind, %timestamp, "edited entry");
        Ok(())
    }

    /// Removes one entry and returns it.
    pub fn delete_entry(&mut self, index: usize) -> Result<TimeEntry, LedgerError> {
        if index >= self.entries.len() {
            return Err(LedgerError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        debug!(task = %self.id, index, remaining = self.entries.len(), "deleted entry");
        Ok(removed)
    }

    /// Adds `duration_ms` to the chosen accumulator. Non-positive amounts are ignored.
    pub fn add_manual_time(&mut self, kind: ManualKind, duration_ms: i64) {
        if duration_ms <= 0 {
            return;
        }
        let bucket = self.manual_bucket(kind);
        *bucket = bucket.saturating_add(duration_ms);
        debug!(task = %self.id, ?kind, duration_ms, "added manual time");
    }

    /// Clears the whole accumulator.
    pub fn reset_manual(&mut self, kind: ManualKind) {
        *self.manual_bucket(kind) = 0;
        debug!(task = %self.id, ?kind, "reset manual time");
    }

    pub const fn manual(&self, kind: ManualKind) -> i64 {
        match kind {
            ManualKind::Added => self.manual_added,
            ManualKind::Removed => self.manual_removed,
        }
    }

    const fn manual_bucket(&mut self, kind: ManualKind) -> &mut i64 {
        match kind {
            ManualKind::Added => &mut self.manual_added,
            ManualKind::Removed => &mut self.manual_removed,
        }
    }

    pub(crate) fn push_entry(&mut self, entry: TimeEntry) {
        self.entries.push(entry);
        self.sort_entries();
    }

    /// Stable sort, so equal timestamps keep their insertion order.
    pub(crate) fn sort_entries(&mut self) {
        self.entries.sort_by_key(|e| e.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    const MINUTE: i64 = 60_000;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn task_with(entries: Vec<TimeEntry>) -> Task {
        let mut task = Task::new(TaskId::new("task-1").unwrap(), "Review");
        task.entries = entries;
        task
    }

    fn morning_block() -> Task {
        task_with(vec![TimeEntry::start(at(9, 0)), TimeEntry::stop(at(10, 30))])
    }

    #[test]
    fn closed_interval_counts_ninety_minutes() {
        let task = morning_block();
        assert_eq!(task.total_duration(at(12, 0)), 90 * MINUTE);
        assert_eq!(task.total_duration(at(12, 0)), 5_400_000);
        assert!(!task.is_running());
    }

    #[test]
    fn manual_addition_extends_total() {
        let mut task = morning_block();
        task.add_manual_time(ManualKind::Added, 15 * MINUTE);
        assert_eq!(task.total_duration(at(12, 0)), 105 * MINUTE);
    }

    #[test]
    fn manual_removal_clamps_total_at_zero() {
        let mut task = morning_block();
        task.add_manual_time(ManualKind::Removed, 200 * MINUTE);
        assert_eq!(task.total_duration(at(12, 0)), 0);
        assert_eq!(task.tracked_duration(at(12, 0)), 90 * MINUTE);
    }

    #[test]
    fn huge_manual_addition_saturates_total() {
        let mut task = morning_block();
        task.add_manual_time(ManualKind::Added, i64::MAX);
        assert_eq!(task.total_duration(at(12, 0)), i64::MAX);
        assert_eq!(task.tracked_duration(at(12, 0)), 90 * MINUTE);
    }

    #[test]
    fn open_start_counts_up_to_as_of() {
        let task = task_with(vec![TimeEntry::start(at(9, 0))]);
        assert!(task.is_running());
        assert_eq!(task.tracked_duration(at(9, 45)), 45 * MINUTE);
    }

    #[test]
    fn running_duration_is_monotonic_in_as_of() {
        let task = task_with(vec![
            TimeEntry::start(at(8, 0)),
            TimeEntry::stop(at(8, 30)),
            TimeEntry::start(at(9, 0)),
        ]);
        let mut previous = 0;
        for minute in 0..120 {
            let as_of = at(8, 0) + chrono::Duration::minutes(minute);
            let tracked = task.tracked_duration(as_of);
            assert!(tracked >= previous, "decreased at minute {minute}");
            previous = tracked;
        }
    }

    #[test]
    fn as_of_before_open_start_contributes_nothing() {
        let task = task_with(vec![TimeEntry::start(at(9, 0))]);
        assert_eq!(task.tracked_duration(at(8, 0)), 0);
    }

    #[test]
    fn unmatched_stop_is_ignored() {
        let task = task_with(vec![
            TimeEntry::stop(at(8, 0)),
            TimeEntry::start(at(9, 0)),
            TimeEntry::stop(at(9, 30)),
        ]);
        assert_eq!(task.tracked_duration(at(12, 0)), 30 * MINUTE);
    }

    #[test]
    fn consecutive_starts_keep_latest_as_open_start() {
        let task = task_with(vec![
            TimeEntry::start(at(9, 0)),
            TimeEntry::start(at(10, 0)),
            TimeEntry::stop(at(11, 0)),
        ]);
        assert_eq!(task.tracked_duration(at(12, 0)), 60 * MINUTE);
        assert!(!task.is_running());
    }

    #[test]
    fn trailing_stop_after_closed_pair_is_not_running() {
        let task = task_with(vec![
            TimeEntry::start(at(9, 0)),
            TimeEntry::stop(at(9, 30)),
            TimeEntry::stop(at(10, 0)),
        ]);
        assert!(!task.tally().is_running());
        assert_eq!(task.tracked_duration(at(23, 0)), 30 * MINUTE);
    }

    #[test]
    fn completed_duration_ignores_open_interval() {
        let task = task_with(vec![
            TimeEntry::start(at(9, 0)),
            TimeEntry::stop(at(9, 20)),
            TimeEntry::start(at(10, 0)),
        ]);
        assert_eq!(task.completed_duration(), 20 * MINUTE);
        assert_eq!(task.total_duration(at(10, 10)), 30 * MINUTE);
    }

    #[test]
    fn stop_tracking_appends_stop() {
        let mut task = task_with(vec![TimeEntry::start(at(9, 0))]);
        task.stop_tracking(at(9, 50)).unwrap();
        assert_eq!(task.entries.last(), Some(&TimeEntry::stop(at(9, 50))));
        assert!(!task.is_running());
    }

    #[test]
    fn stop_tracking_rejects_idle_task() {
        let mut empty = task_with(vec![]);
        assert_eq!(empty.stop_tracking(at(9, 0)), Err(LedgerError::NotRunning));

        let mut stopped = morning_block();
        assert_eq!(stopped.stop_tracking(at(11, 0)), Err(LedgerError::NotRunning));
        assert_eq!(stopped, morning_block());
    }

    #[test]
    fn stop_tracking_rejects_skewed_counts() {
        // Ends on a start but holds more stops than starts.
        let mut task = task_with(vec![
            TimeEntry::stop(at(8, 0)),
            TimeEntry::stop(at(8, 30)),
            TimeEntry::start(at(9, 0)),
        ]);
        let before = task.clone();
        assert_eq!(task.stop_tracking(at(10, 0)), Err(LedgerError::NotRunning));
        assert_eq!(task, before);
    }

    #[test]
    fn stop_before_last_start_is_resorted() {
        let mut task = task_with(vec![TimeEntry::start(at(9, 0))]);
        task.stop_tracking(at(8, 0)).unwrap();
        assert_eq!(task.entries[0], TimeEntry::stop(at(8, 0)));
        // The log now ends on the start again.
        assert!(task.is_running());
    }

    #[test]
    fn edit_entry_resorts_the_log() {
        let mut task = morning_block();
        task.edit_entry(1, EntryKind::Stop, at(8, 0)).unwrap();
        assert_eq!(
            task.entries,
            vec![TimeEntry::stop(at(8, 0)), TimeEntry::start(at(9, 0))]
        );
        assert!(task.is_running());
        assert_eq!(task.tracked_duration(at(9, 15)), 15 * MINUTE);
    }

    #[test]
    fn edit_entry_can_change_kind() {
        let mut task = morning_block();
        task.edit_entry(1, EntryKind::Start, at(10, 30)).unwrap();
        assert!(task.is_running());
    }

    #[test]
    fn edit_entry_out_of_range() {
        let mut task = morning_block();
        assert_eq!(
            task.edit_entry(2, EntryKind::Stop, at(11, 0)),
            Err(LedgerError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(task, morning_block());
    }

    #[test]
    fn delete_entry_removes_and_can_empty_log() {
        let mut task = morning_block();
        assert_eq!(task.delete_entry(1).unwrap(), TimeEntry::stop(at(10, 30)));
        assert!(task.is_running());
        task.delete_entry(0).unwrap();
        assert!(task.entries.is_empty());
        assert_eq!(
            task.delete_entry(0),
            Err(LedgerError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn non_positive_manual_amounts_are_ignored() {
        let mut task = morning_block();
        task.add_manual_time(ManualKind::Added, 0);
        task.add_manual_time(ManualKind::Removed, -5 * MINUTE);
        assert_eq!(task.manual_added, 0);
        assert_eq!(task.manual_removed, 0);
    }

    #[test]
    fn reset_manual_is_idempotent() {
        let mut task = morning_block();
        task.add_manual_time(ManualKind::Added, 10 * MINUTE);
        task.add_manual_time(ManualKind::Added, 5 * MINUTE);
        task.add_manual_time(ManualKind::Removed, 3 * MINUTE);

        task.reset_manual(ManualKind::Added);
        let once = task.clone();
        task.reset_manual(ManualKind::Added);

        assert_eq!(task, once);
        assert_eq!(task.manual(ManualKind::Added), 0);
        assert_eq!(task.manual(ManualKind::Removed), 3 * MINUTE);
    }

    #[test]
    fn durations_never_negative() {
        let shapes = vec![
            vec![],
            vec![TimeEntry::stop(at(9, 0))],
            vec![TimeEntry::start(at(23, 0))],
            vec![TimeEntry::stop(at(9, 0)), TimeEntry::stop(at(10, 0))],
            vec![TimeEntry::start(at(9, 0)), TimeEntry::start(at(12, 0))],
        ];
        for entries in shapes {
            let mut task = task_with(entries);
            task.add_manual_time(ManualKind::Removed, 60 * MINUTE);
            for hour in [0, 9, 12, 23] {
                assert!(task.tracked_duration(at(hour, 0)) >= 0);
                assert!(task.total_duration(at(hour, 0)) >= 0);
            }
        }
    }
}
