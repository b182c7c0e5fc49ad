//! The process-wide ledger of days and tasks.
//!
//! The ledger is a plain value owned by whoever orchestrates calls. It holds
//! no clock and no storage handle; callers persist it after each mutation.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::clock::Clock;
use crate::entry::TimeEntry;
use crate::error::LedgerError;
use crate::task::Task;
use crate::types::{DateKey, TaskId};

/// All tasks recorded for one calendar day, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub date: DateKey,
    pub tasks: Vec<Task>,
}

impl Day {
    pub const fn new(date: DateKey) -> Self {
        Self {
            date,
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, index: usize) -> Result<&Task, LedgerError> {
        self.tasks.get(index).ok_or(LedgerError::IndexOutOfRange {
            index,
            len: self.tasks.len(),
        })
    }

    pub fn task_mut(&mut self, index: usize) -> Result<&mut Task, LedgerError> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfRange { index, len })
    }

    /// Position of the task whose name matches case-insensitively.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.tasks
            .iter()
            .position(|task| task.name.to_lowercase() == wanted)
    }

    /// Validates a name for a task on this day.
    ///
    /// `exclude` skips one position, so a task may keep its own name.
    fn check_name(&self, name: &str, exclude: Option<usize>) -> Result<String, LedgerError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        let clash = self
            .position_by_name(trimmed)
            .is_some_and(|pos| Some(pos) != exclude);
        if clash {
            return Err(LedgerError::DuplicateName {
                name: trimmed.to_string(),
            });
        }
        Ok(trimmed.to_string())
    }

    /// Appends a new, empty task and returns its position.
    pub fn create_task(&mut self, name: &str) -> Result<usize, LedgerError> {
        let name = self.check_name(name, None)?;
        let task = Task::new(TaskId::generate(), name);
        debug!(date = %self.date, task = %task.id, name = %task.name, "created task");
        self.tasks.push(task);
        Ok(self.tasks.len() - 1)
    }

    /// Removes and returns the task at `index`.
    pub fn delete_task(&mut self, index: usize) -> Result<Task, LedgerError> {
        self.task(index)?;
        let task = self.tasks.remove(index);
        debug!(date = %self.date, task = %task.id, "deleted task");
        Ok(task)
    }

    /// Renames a task. Renaming to its current name is a no-op.
    pub fn rename_task(&mut self, index: usize, name: &str) -> Result<(), LedgerError> {
        self.task(index)?;
        let name = self.check_name(name, Some(index))?;
        let task = self.task_mut(index)?;
        debug!(task = %task.id, from = %task.name, to = %name, "renamed task");
        task.name = name;
        Ok(())
    }

    /// Sum of per-task totals; each task is clamped before summing.
    pub fn total_duration(&self, as_of: NaiveDateTime) -> i64 {
        self.tasks
            .iter()
            .map(|task| task.total_duration(as_of))
            .fold(0, i64::saturating_add)
    }
}

/// Stable address of a task within a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskRef {
    pub date: DateKey,
    pub index: usize,
}

impl TaskRef {
    pub const fn new(date: DateKey, index: usize) -> Self {
        Self { date, index }
    }
}

/// A task whose last entry is a start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningTask {
    pub task: TaskRef,
    pub id: TaskId,
    pub since: NaiveDateTime,
}

/// How to treat other running tasks when starting one.
///
/// The caller must decide; the ledger never picks on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arbitration {
    /// Leave other running tasks alone; several tasks may run at once.
    RunConcurrently,
    /// Stop every other running task at the current instant first.
    StopOthers,
}

/// Outcome of a successful start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartOutcome {
    /// Tasks that received a stop entry during arbitration.
    pub stopped: Vec<RunningTask>,
    /// Other tasks left running alongside the started one.
    pub still_running: Vec<RunningTask>,
}

/// Every day with tasks, keyed by date.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ledger {
    days: BTreeMap<DateKey, Day>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days in chronological order.
    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.days.values()
    }

    pub fn day(&self, date: DateKey) -> Option<&Day> {
        self.days.get(&date)
    }

    /// Inserts a fully-formed day, replacing any existing one.
    pub fn insert_day(&mut self, day: Day) {
        self.days.insert(day.date, day);
    }

    fn existing_day_mut(&mut self, date: DateKey) -> Result<&mut Day, LedgerError> {
        self.days
            .get_mut(&date)
            .ok_or(LedgerError::DayNotFound { date })
    }

    pub fn task(&self, target: TaskRef) -> Result<&Task, LedgerError> {
        self.days
            .get(&target.date)
            .ok_or(LedgerError::DayNotFound { date: target.date })?
            .task(target.index)
    }

    pub fn task_mut(&mut self, target: TaskRef) -> Result<&mut Task, LedgerError> {
        self.existing_day_mut(target.date)?.task_mut(target.index)
    }

    /// Locates a task by ID anywhere in the ledger.
    pub fn find_task(&self, id: &TaskId) -> Option<TaskRef> {
        self.days.values().find_map(|day| {
            day.tasks
                .iter()
                .position(|task| &task.id == id)
                .map(|index| TaskRef::new(day.date, index))
        })
    }

    /// Creates a task on `date`, creating the day if needed.
    pub fn create_task(&mut self, date: DateKey, name: &str) -> Result<TaskRef, LedgerError> {
        let index = match self.days.get_mut(&date) {
            Some(day) => day.create_task(name)?,
            None => {
                let mut day = Day::new(date);
                let index = day.create_task(name)?;
                self.days.insert(date, day);
                index
            }
        };
        Ok(TaskRef::new(date, index))
    }

    /// Removes a task. The day stays, even if empty; see [`Self::remove_day_if_empty`].
    pub fn delete_task(&mut self, target: TaskRef) -> Result<Task, LedgerError> {
        self.existing_day_mut(target.date)?.delete_task(target.index)
    }

    /// Drops the day when it holds no tasks. Returns whether it was removed.
    pub fn remove_day_if_empty(&mut self, date: DateKey) -> bool {
        let empty = self.days.get(&date).is_some_and(|day| day.tasks.is_empty());
        if empty {
            self.days.remove(&date);
            debug!(%date, "removed empty day");
        }
        empty
    }

    pub fn rename_task(&mut self, target: TaskRef, name: &str) -> Result<(), LedgerError> {
        self.existing_day_mut(target.date)?
            .rename_task(target.index, name)
    }

    pub fn set_notes(&mut self, target: TaskRef, notes: impl Into<String>) -> Result<(), LedgerError> {
        self.task_mut(target)?.notes = notes.into();
        Ok(())
    }

    /// Every running task, in date order then task order.
    pub fn running_tasks(&self) -> Vec<RunningTask> {
        self.days
            .values()
            .flat_map(|day| {
                day.tasks.iter().enumerate().filter_map(move |(index, task)| {
                    task.tally().open_since.map(|since| RunningTask {
                        task: TaskRef::new(day.date, index),
                        id: task.id.clone(),
                        since,
                    })
                })
            })
            .collect()
    }

    /// Running tasks other than `target`.
    ///
    /// Callers use this to decide which [`Arbitration`] to request.
    pub fn other_running_tasks(&self, target: TaskRef) -> Vec<RunningTask> {
        self.running_tasks()
            .into_iter()
            .filter(|running| running.task != target)
            .collect()
    }

    /// Starts tracking `target` at `at`.
    ///
    /// With [`Arbitration::StopOthers`], every other running task first gets a
    /// stop entry at `clock.now()`, not at `at`.
    pub fn start_tracking(
        &mut self,
        target: TaskRef,
        at: NaiveDateTime,
        arbitration: Arbitration,
        clock: &dyn Clock,
    ) -> Result<StartOutcome, LedgerError> {
        if self.task(target)?.is_running() {
            return Err(LedgerError::AlreadyRunning);
        }

        let others = self.other_running_tasks(target);
        let mut outcome = StartOutcome::default();

        match arbitration {
            Arbitration::StopOthers if !others.is_empty() => {
                let now = clock.now();
                for running in others {
                    let task = self.task_mut(running.task)?;
                    // The scan above found it running; push without re-checking counts.
                    task.push_entry(TimeEntry::stop(now));
                    debug!(task = %running.id, %now, "stopped by arbitration");
                    outcome.stopped.push(running);
                }
            }
            _ => outcome.still_running = others,
        }

        let task = self.task_mut(target)?;
        task.push_entry(TimeEntry::start(at));
        debug!(
            task = %task.id,
            %at,
            stopped = outcome.stopped.len(),
            concurrent = outcome.still_running.len(),
            "started tracking"
        );
        Ok(outcome)
    }

    pub fn stop_tracking(&mut self, target: TaskRef, at: NaiveDateTime) -> Result<(), LedgerError> {
        self.task_mut(target)?.stop_tracking(at)
    }

    /// Total for one day; zero for days without tasks.
    pub fn day_total(&self, date: DateKey, as_of: NaiveDateTime) -> i64 {
        self.days
            .get(&date)
            .map_or(0, |day| day.total_duration(as_of))
    }
}
