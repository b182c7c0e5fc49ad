//! Task management: add, delete, rename and notes.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Args;
use tl_core::Clock;
use tl_db::Database;

use super::util::{DayArg, confirm, resolve_task};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Name of the new task.
    pub name: String,

    #[command(flatten)]
    pub day: DayArg,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    #[command(flatten)]
    pub day: DayArg,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    /// New name.
    pub name: String,

    #[command(flatten)]
    pub day: DayArg,
}

#[derive(Debug, Args)]
pub struct NotesArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    /// Replacement notes. Omit to print the current notes.
    pub notes: Option<String>,

    #[command(flatten)]
    pub day: DayArg,
}

pub fn add<W: Write>(writer: &mut W, db: &mut Database, clock: &dyn Clock, args: &AddArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = ledger.create_task(date, &args.name)?;
    db.save_ledger(&ledger)?;

    let task = ledger.task(target)?;
    writeln!(writer, "Added task {} ({date}).", task.name)?;
    Ok(())
}

/// Deletes a task after confirmation. A day left without tasks is dropped.
pub fn delete<R: BufRead, W: Write>(
    input: &mut R,
    writer: &mut W,
    db: &mut Database,
    clock: &dyn Clock,
    args: &DeleteArgs,
) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;

    let name = ledger.task(target)?.name.clone();
    if !args.yes && !confirm(input, writer, &format!("Delete task {name}?"))? {
        writeln!(writer, "Cancelled.")?;
        return Ok(());
    }

    ledger.delete_task(target)?;
    ledger.remove_day_if_empty(date);
    db.save_ledger(&ledger)?;
    writeln!(writer, "Deleted task {name} ({date}).")?;
    Ok(())
}

pub fn rename<W: Write>(writer: &mut W, db: &mut Database, clock: &dyn Clock, args: &RenameArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;

    let old = ledger.task(target)?.name.clone();
    ledger.rename_task(target, &args.name)?;
    db.save_ledger(&ledger)?;
    writeln!(writer, "Renamed {old} to {}.", ledger.task(target)?.name)?;
    Ok(())
}

pub fn notes<W: Write>(writer: &mut W, db: &mut Database, clock: &dyn Clock, args: &NotesArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;

    match &args.notes {
        Some(notes) => {
            ledger.set_notes(target, notes.as_str())?;
            db.save_ledger(&ledger)?;
            writeln!(writer, "Updated notes for {}.", ledger.task(target)?.name)?;
        }
        None => {
            let task = ledger.task(target)?;
            if task.notes.is_empty() {
                writeln!(writer, "No notes for {}.", task.name)?;
            } else {
                writeln!(writer, "{}", task.notes)?;
            }
        }
    }
    Ok(())
}
