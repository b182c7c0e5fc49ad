//! Start/stop commands and the running-task listing.

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::Args;
use tl_core::{Arbitration, Clock, Ledger, LedgerError, RunningTask};
use tl_db::Database;

use super::report::format_duration;
use super::util::{DayArg, confirm, resolve_task, time_or_default};
use crate::config::RunningPolicy;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    #[command(flatten)]
    pub day: DayArg,

    /// Start time: HH:MM, a full timestamp, "now" or "N minutes ago".
    #[arg(long)]
    pub at: Option<String>,

    /// Stop every other running task first.
    #[arg(long, conflicts_with = "concurrent")]
    pub stop_others: bool,

    /// Keep other running tasks running.
    #[arg(long)]
    pub concurrent: bool,
}

#[derive(Debug, Args)]
pub struct StopArgs {
    /// Task name or 1-based position on the day.
    pub task: String,

    #[command(flatten)]
    pub day: DayArg,

    /// Stop time: HH:MM, a full timestamp, "now" or "N minutes ago".
    #[arg(long)]
    pub at: Option<String>,
}

fn describe(ledger: &Ledger, running: &RunningTask) -> String {
    let name = ledger
        .task(running.task)
        .map_or_else(|_| running.id.to_string(), |task| task.name.clone());
    format!("{name} ({})", running.task.date)
}

fn short_time(at: NaiveDateTime) -> String {
    at.format("%H:%M").to_string()
}

/// Picks the arbitration for a start, asking only when other tasks run and
/// neither flag nor config settles it.
fn decide<R: BufRead, W: Write>(
    input: &mut R,
    writer: &mut W,
    args: &StartArgs,
    policy: RunningPolicy,
    others: &[RunningTask],
) -> Result<Arbitration> {
    if others.is_empty() || args.concurrent {
        return Ok(Arbitration::RunConcurrently);
    }
    if args.stop_others {
        return Ok(Arbitration::StopOthers);
    }
    match policy {
        RunningPolicy::Stop => Ok(Arbitration::StopOthers),
        RunningPolicy::Concurrent => Ok(Arbitration::RunConcurrently),
        RunningPolicy::Ask => {
            let stop = confirm(
                input,
                writer,
                "Another task is currently being tracked. Stop the previous task(s) and start tracking this one?",
            )?;
            Ok(if stop {
                Arbitration::StopOthers
            } else {
                Arbitration::RunConcurrently
            })
        }
    }
}

pub fn start<R: BufRead, W: Write>(
    input: &mut R,
    writer: &mut W,
    db: &mut Database,
    clock: &dyn Clock,
    policy: RunningPolicy,
    args: &StartArgs,
) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;
    let at = time_or_default(date.date(), args.at.as_deref(), clock)?;

    // Reject before prompting about others.
    if ledger.task(target)?.is_running() {
        return Err(LedgerError::AlreadyRunning.into());
    }
    let others = ledger.other_running_tasks(target);
    let arbitration = decide(input, writer, args, policy, &others)?;

    let outcome = ledger.start_tracking(target, at, arbitration, clock)?;
    db.save_ledger(&ledger)?;

    let name = &ledger.task(target)?.name;
    writeln!(writer, "Started tracking {name} at {}.", short_time(at))?;
    for stopped in &outcome.stopped {
        writeln!(writer, "Stopped {}.", describe(&ledger, stopped))?;
    }
    for running in &outcome.still_running {
        writeln!(writer, "Still running: {}.", describe(&ledger, running))?;
    }
    Ok(())
}

pub fn stop<W: Write>(writer: &mut W, db: &mut Database, clock: &dyn Clock, args: &StopArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let mut ledger = db.load_ledger()?;
    let target = resolve_task(&ledger, date, &args.task)?;
    let at = time_or_default(date.date(), args.at.as_deref(), clock)?;

    ledger.stop_tracking(target, at)?;
    db.save_ledger(&ledger)?;

    let task = ledger.task(target)?;
    writeln!(
        writer,
        "Stopped {} at {}. Total: {}.",
        task.name,
        short_time(at),
        format_duration(task.total_duration(at))
    )?;
    Ok(())
}

/// Lists every running task across all days.
pub fn running<W: Write>(writer: &mut W, db: &Database, clock: &dyn Clock) -> Result<()> {
    let ledger = db.load_ledger()?;
    let running = ledger.running_tasks();
    if running.is_empty() {
        writeln!(writer, "No tasks are running.")?;
        return Ok(());
    }

    let now = clock.now();
    for entry in &running {
        let task = ledger.task(entry.task)?;
        writeln!(
            writer,
            "{}  {}  since {}  ({})",
            entry.task.date,
            task.name,
            entry.since.format("%Y-%m-%d %H:%M"),
            format_duration(task.total_duration(now))
        )?;
    }
    Ok(())
}
