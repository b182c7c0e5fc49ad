//! Manual time adjustments.

use std::io::Write;

use anyhow::Result;
use clap::{Args, ValueEnum};
use tl_core::{Clock, ManualKind};
use tl_db::Database;

use super::report::format_duration;
use super::util::{DayArg, manual_amount_ms, resolve_task};

#[derive(Debug, Args)]
pub struct AmountArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    #[command(flatten)]
    pub day: DayArg,

    /// Whole hours. Read leniently: "1h" counts as 1.
    #[arg(long, allow_hyphen_values = true)]
    pub hours: Option<String>,

    /// Whole minutes. Read leniently: "" counts as 0.
    #[arg(long, allow_hyphen_values = true)]
    pub minutes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Bucket {
    Added,
    Removed,
}

impl From<Bucket> for ManualKind {
    fn from(bucket: Bucket) -> Self {
        match bucket {
            Bucket::Added => Self::Added,
            Bucket::Removed => Self::Removed,
        }
    }
}

#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    /// Which accumulator to clear.
    #[arg(value_enum)]
    pub bucket: Bucket,

    #[command(flatten)]
    pub day: DayArg,
}

/// Adds time to one of the task's manual accumulators.
pub fn adjust<W: Write>(
    writer: &mut W,
    db: &mut Database,
    clock: &dyn Clock,
    kind: ManualKind,
    args: &AmountArgs,
) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;

    let amount = manual_amount_ms(args.hours.as_deref(), args.minutes.as_deref());
    if amount <= 0 {
        writeln!(writer, "Nothing to {}.", verb(kind))?;
        return Ok(());
    }

    ledger.task_mut(target)?.add_manual_time(kind, amount);
    db.save_ledger(&ledger)?;

    let task = ledger.task(target)?;
    writeln!(
        writer,
        "{} {} {} {}. Total: {}.",
        past_tense(kind),
        format_duration(amount),
        preposition(kind),
        task.name,
        format_duration(task.total_duration(clock.now()))
    )?;
    Ok(())
}

pub fn reset<W: Write>(writer: &mut W, db: &mut Database, clock: &dyn Clock, args: &ResetArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;

    let kind = ManualKind::from(args.bucket);
    ledger.task_mut(target)?.reset_manual(kind);
    db.save_ledger(&ledger)?;

    let bucket = match kind {
        ManualKind::Added => "added",
        ManualKind::Removed => "removed",
    };
    writeln!(
        writer,
        "Cleared manually {bucket} time for {}.",
        ledger.task(target)?.name
    )?;
    Ok(())
}

const fn verb(kind: ManualKind) -> &'static str {
    match kind {
        ManualKind::Added => "add",
        ManualKind::Removed => "remove",
    }
}

const fn preposition(kind: ManualKind) -> &'static str {
    match kind {
        ManualKind::Added => "to",
        ManualKind::Removed => "from",
    }
}

const fn past_tense(kind: ManualKind) -> &'static str {
    match kind {
        ManualKind::Added => "Added",
        ManualKind::Removed => "Removed",
    }
}
