//! Per-task history: manual adjustments and the numbered entry log.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use tl_core::{Clock, EntryKind, ManualKind, Task};
use tl_db::Database;

use super::report::format_duration;
use super::util::{DayArg, resolve_task};

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    #[command(flatten)]
    pub day: DayArg,
}

/// One entry as a sentence. Entries on another day carry their date.
pub fn describe_entry(day: NaiveDate, kind: EntryKind, timestamp: NaiveDateTime) -> String {
    let verb = match kind {
        EntryKind::Start => "Started",
        EntryKind::Stop => "Stopped",
    };
    let mut text = format!("{verb} at {}", timestamp.format("%H:%M"));
    if timestamp.date() != day {
        write!(text, " on {}", timestamp.date()).unwrap();
    }
    text
}

pub fn format_history(day: NaiveDate, task: &Task) -> String {
    let mut output = String::new();
    writeln!(output, "{}", task.name).unwrap();
    if !task.notes.is_empty() {
        writeln!(output, "Notes: {}", task.notes).unwrap();
    }
    writeln!(output).unwrap();

    let added = task.manual(ManualKind::Added);
    let removed = task.manual(ManualKind::Removed);
    if added > 0 || removed > 0 {
        writeln!(output, "Manual adjustments:").unwrap();
        if added > 0 {
            writeln!(output, "  + Added: {}", format_duration(added)).unwrap();
        }
        if removed > 0 {
            writeln!(output, "  - Removed: {}", format_duration(removed)).unwrap();
        }
        writeln!(output).unwrap();
    }

    if task.entries.is_empty() {
        if added == 0 && removed == 0 {
            writeln!(output, "No tracking entries yet.").unwrap();
        }
        return output;
    }

    writeln!(output, "Tracking entries:").unwrap();
    for (index, entry) in task.entries.iter().enumerate() {
        writeln!(
            output,
            "  [{}] {}",
            index + 1,
            describe_entry(day, entry.kind, entry.timestamp)
        )
        .unwrap();
    }
    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, clock: &dyn Clock, args: &HistoryArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;
    write!(writer, "{}", format_history(date.date(), ledger.task(target)?))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tl_core::{TaskId, TimeEntry};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[test]
    fn lists_adjustments_then_numbered_entries() {
        let mut task = Task::new(TaskId::new("task-1").unwrap(), "Deploy");
        task.notes = "release 1.4".to_string();
        task.entries = vec![
            TimeEntry::start(day().and_hms_opt(23, 30, 0).unwrap()),
            TimeEntry::stop(day().succ_opt().unwrap().and_hms_opt(0, 45, 0).unwrap()),
        ];
        task.add_manual_time(ManualKind::Removed, 10 * 60_000);

        assert_eq!(
            format_history(day(), &task),
            "Deploy\n\
             Notes: release 1.4\n\
             \n\
             Manual adjustments:\n  - Removed: 10:00\n\
             \n\
             Tracking entries:\n  [1] Started at 23:30\n  [2] Stopped at 00:45 on 2025-05-07\n"
        );
    }

    #[test]
    fn untouched_task_says_so() {
        let task = Task::new(TaskId::new("task-1").unwrap(), "Inbox");
        assert_eq!(format_history(day(), &task), "Inbox\n\nNo tracking entries yet.\n");

        let mut manual_only = Task::new(TaskId::new("task-2").unwrap(), "Call");
        manual_only.add_manual_time(ManualKind::Added, 90_000);
        assert_eq!(
            format_history(day(), &manual_only),
            "Call\n\nManual adjustments:\n  + Added: 1:30\n\n"
        );
    }
}
