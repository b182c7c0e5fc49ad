//! Implementation of the `tl export` command.
//!
//! Writes the stored ledger as a snapshot document that `tl import` (or the
//! browser extension's storage) can read back.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tl_core::snapshot;
use tl_db::Database;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Indent the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, args: &ExportArgs) -> Result<()> {
    let ledger = db.load_ledger()?;
    let json = snapshot::encode(&ledger)?;
    if args.pretty {
        let value: serde_json::Value =
            serde_json::from_str(&json).context("failed to re-read encoded snapshot")?;
        serde_json::to_writer_pretty(&mut *writer, &value).context("failed to write snapshot")?;
        writeln!(writer)?;
    } else {
        writeln!(writer, "{json}")?;
    }
    Ok(())
}
