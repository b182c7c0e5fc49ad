//! Editing and deleting individual start/stop entries.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::{Args, ValueEnum};
use tl_core::{Clock, EntryKind};
use tl_db::Database;

use super::history::describe_entry;
use super::util::{DayArg, confirm, entry_index, parse_time_input, resolve_task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Start,
    Stop,
}

impl From<KindArg> for EntryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Start => Self::Start,
            KindArg::Stop => Self::Stop,
        }
    }
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    /// Entry number as shown by `tl history`.
    pub number: usize,

    #[command(flatten)]
    pub day: DayArg,

    /// New entry type. Defaults to the current one.
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// New time: HH:MM on the selected day, or a full timestamp.
    #[arg(long)]
    pub at: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    /// Entry number as shown by `tl history`.
    pub number: usize,

    #[command(flatten)]
    pub day: DayArg,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Rewrites one entry. The log is re-sorted, so its number may change.
pub fn edit<W: Write>(writer: &mut W, db: &mut Database, clock: &dyn Clock, args: &EditArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;
    let index = entry_index(args.number)?;

    let timestamp = parse_time_input(date.date(), &args.at, clock)?;
    let task = ledger.task_mut(target)?;
    let kind = match args.kind {
        Some(kind) => kind.into(),
        None => task
            .entries
            .get(index)
            .map_or(EntryKind::Start, |entry| entry.kind),
    };
    task.edit_entry(index, kind, timestamp)?;
    db.save_ledger(&ledger)?;

    writeln!(
        writer,
        "Updated entry: {}",
        describe_entry(date.date(), kind, timestamp)
    )?;
    Ok(())
}

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
    let index = entry_index(args.number)?;

    let task = ledger.task_mut(target)?;
    if !args.yes {
        if let Some(entry) = task.entries.get(index) {
            let question = format!(
                "Delete entry [{}] {}?",
                args.number,
                describe_entry(date.date(), entry.kind, entry.timestamp)
            );
            if !confirm(input, writer, &question)? {
                writeln!(writer, "Cancelled.")?;
                return Ok(());
            }
        }
    }

    let removed = task.delete_entry(index)?;
    db.save_ledger(&ledger)?;
    writeln!(
        writer,
        "Deleted entry: {}",
        describe_entry(date.date(), removed.kind, removed.timestamp)
    )?;
    Ok(())
}
