//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::entry::{DeleteArgs as EntryDeleteArgs, EditArgs};
use crate::commands::export::ExportArgs;
use crate::commands::history::HistoryArgs;
use crate::commands::import::ImportArgs;
use crate::commands::list::ListArgs;
use crate::commands::manual::{AmountArgs, ResetArgs};
use crate::commands::month::MonthArgs;
use crate::commands::report::ReportArgs;
use crate::commands::task::{AddArgs, DeleteArgs, NotesArgs, RenameArgs};
use crate::commands::track::{StartArgs, StopArgs};
use crate::commands::watch::WatchArgs;

/// Per-day task time tracker.
///
/// Tasks live on calendar days. Each task keeps a log of start/stop entries
/// plus manual adjustments; totals are derived from the log on demand.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a day's tasks with running totals.
    List(ListArgs),

    /// Add a task to a day.
    Add(AddArgs),

    /// Delete a task.
    Delete(DeleteArgs),

    /// Rename a task.
    Rename(RenameArgs),

    /// Show or replace a task's notes.
    Notes(NotesArgs),

    /// Start tracking a task.
    Start(StartArgs),

    /// Stop tracking a task.
    Stop(StopArgs),

    /// List every running task across all days.
    Running,

    /// Adjust a task's manual time.
    #[command(subcommand)]
    Manual(ManualAction),

    /// Show a task's manual adjustments and entry log.
    History(HistoryArgs),

    /// Edit or delete a single start/stop entry.
    #[command(subcommand)]
    Entry(EntryAction),

    /// Print the plain-text summary for a day.
    Report(ReportArgs),

    /// Show per-day totals for a month.
    Month(MonthArgs),

    /// Redraw a day's view live until Ctrl-C.
    Watch(WatchArgs),

    /// Write the ledger as a snapshot document to stdout.
    Export(ExportArgs),

    /// Replace the ledger with a snapshot document.
    Import(ImportArgs),

    /// Show store location, counts and running tasks.
    Status,
}

/// Manual time operations.
#[derive(Debug, Subcommand)]
pub enum ManualAction {
    /// Add time to a task.
    Add(AmountArgs),

    /// Remove time from a task.
    Remove(AmountArgs),

    /// Clear a task's added or removed total.
    Reset(ResetArgs),
}

/// Entry log operations.
#[derive(Debug, Subcommand)]
pub enum EntryAction {
    /// Change an entry's type and time.
    Edit(EditArgs),

    /// Delete an entry.
    Delete(EntryDeleteArgs),
}
