//! Month overview: per-day totals for days that have tasks.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::Args;
use tl_core::{Clock, Ledger};
use tl_db::Database;

use super::report::format_duration;

#[derive(Debug, Args)]
pub struct MonthArgs {
    /// Month to show (YYYY-MM). Defaults to the current month.
    #[arg(short, long)]
    pub month: Option<String>,
}

/// First day of the month named by `input`.
fn parse_month(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
        .with_context(|| format!("invalid month: {input} (expected YYYY-MM)"))
}

pub fn format_month(ledger: &Ledger, first: NaiveDate, as_of: NaiveDateTime) -> String {
    let mut output = String::new();
    writeln!(output, "{}", first.format("%B %Y")).unwrap();
    writeln!(output).unwrap();

    let days: Vec<_> = ledger
        .days()
        .filter(|day| {
            let date = day.date.date();
            date.year() == first.year() && date.month() == first.month() && !day.tasks.is_empty()
        })
        .collect();

    if days.is_empty() {
        writeln!(output, "No tasks this month.").unwrap();
        return output;
    }

    let mut month_total = 0_i64;
    for day in days {
        let total = day.total_duration(as_of);
        month_total = month_total.saturating_add(total);
        let tasks = day.tasks.len();
        writeln!(
            output,
            "{}  {:>2} {:<5}  {:>8}",
            day.date.date().format("%a %d"),
            tasks,
            if tasks == 1 { "task" } else { "tasks" },
            format_duration(total)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Month total: {}", format_duration(month_total)).unwrap();
    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, clock: &dyn Clock, args: &MonthArgs) -> Result<()> {
    let now = clock.now();
    let first = match &args.month {
        Some(raw) => parse_month(raw)?,
        None => now.date().with_day(1).unwrap_or_else(|| now.date()),
    };
    let ledger = db.load_ledger()?;
    write!(writer, "{}", format_month(&ledger, first, now))?;
    Ok(())
}
