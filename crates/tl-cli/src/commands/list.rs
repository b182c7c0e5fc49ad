//! Day view: each task's running total plus the day total.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::Args;
use tl_core::{Clock, DateKey, Ledger};
use tl_db::Database;

use super::report::format_duration;
use super::util::DayArg;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub day: DayArg,
}

/// Renders one day as of `as_of`. Pure read; used by `list` and `watch`.
pub fn format_day(ledger: &Ledger, date: DateKey, as_of: NaiveDateTime) -> String {
    let mut output = String::new();
    writeln!(output, "{}", date.date().format("%B %-d, %Y")).unwrap();
    writeln!(output).unwrap();

    let tasks = ledger.day(date).map(|day| day.tasks.as_slice()).unwrap_or_default();
    if tasks.is_empty() {
        writeln!(output, "No tasks for this day. Add a task to get started.").unwrap();
        return output;
    }

    for (index, task) in tasks.iter().enumerate() {
        // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
        let name = if task.name.chars().count() > 24 {
            format!("{}...", task.name.chars().take(21).collect::<String>())
        } else {
            task.name.clone()
        };
        let marker = if task.is_running() { "  * running" } else { "" };
        writeln!(
            output,
            "{:>2}  {:<24}  {:>8}{}",
            index + 1,
            name,
            format_duration(task.total_duration(as_of)),
            marker
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "Day total: {}",
        format_duration(ledger.day_total(date, as_of))
    )
    .unwrap();
    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, clock: &dyn Clock, args: &ListArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let ledger = db.load_ledger()?;
    write!(writer, "{}", format_day(&ledger, date, clock.now()))?;
    Ok(())
}
