//! Status command for showing what the store holds and what is running.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tl_core::Clock;
use tl_db::Database;

use super::report::format_duration;

pub fn run<W: Write>(writer: &mut W, db: &Database, db_path: &Path, clock: &dyn Clock) -> Result<()> {
    let ledger = db.load_ledger()?;

    writeln!(writer, "Time ledger status")?;
    writeln!(writer, "Database: {}", db_path.display())?;
    match db.ledger_saved_at()? {
        Some(saved_at) => writeln!(writer, "Last saved: {saved_at}")?,
        None => writeln!(writer, "Last saved: never")?,
    }

    let days = ledger.days().count();
    let tasks: usize = ledger.days().map(|day| day.tasks.len()).sum();
    writeln!(writer, "Days: {days}")?;
    writeln!(writer, "Tasks: {tasks}")?;

    let today = clock.now();
    writeln!(
        writer,
        "Today: {}",
        format_duration(ledger.day_total(today.date().into(), today))
    )?;

    let running = ledger.running_tasks();
    if running.is_empty() {
        writeln!(writer, "Running: none")?;
        return Ok(());
    }
    writeln!(writer, "Running:")?;
    for entry in running {
        let task = ledger.task(entry.task)?;
        writeln!(writer, "- {} ({})", task.name, entry.task.date)?;
    }
    Ok(())
}
