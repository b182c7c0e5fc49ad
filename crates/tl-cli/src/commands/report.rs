//! Daily summary report.
//!
//! Produces the plain-text summary that used to be copied to the clipboard:
//!
//! ```text
//! Tuesday 06 May 2025:
//! - Review (01:45)
//! - Lunch (00:30)
//! ```
//!
//! Only closed intervals count here; a task still running contributes its
//! finished intervals and manual adjustments.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;
use tl_core::{Clock, Day};
use tl_db::Database;

use super::util::DayArg;

// ========== Duration Formatting ==========

/// Formats milliseconds as `H:MM:SS`, or `M:SS` under an hour.
///
/// Non-positive values render as `0:00`.
pub fn format_duration(ms: i64) -> String {
    if ms <= 0 {
        return "0:00".to_string();
    }
    let total_seconds = ms / 1000;
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = total_seconds / 3600;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Formats milliseconds as zero-padded `HH:MM`, dropping seconds.
pub fn format_hhmm(ms: i64) -> String {
    let total_minutes = ms.max(0) / 60_000;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

// ========== Report ==========

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub day: DayArg,
}

/// Renders the summary for one day.
pub fn format_report(day: &Day) -> String {
    let mut output = String::new();
    writeln!(output, "{}:", day.date.date().format("%A %d %B %Y")).unwrap();
    for task in &day.tasks {
        writeln!(
            output,
            "- {} ({})",
            task.name,
            format_hhmm(task.completed_duration())
        )
        .unwrap();
    }
    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, clock: &dyn Clock, args: &ReportArgs) -> Result<()> {
    let date = args.day.resolve(clock)?;
    let ledger = db.load_ledger()?;
    let Some(day) = ledger.day(date).filter(|day| !day.tasks.is_empty()) else {
        bail!("no tasks to report for {date}");
    };
    write!(writer, "{}", format_report(day))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use tl_core::{Arbitration, DateKey, FixedClock, Ledger, ManualKind};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[test]
    fn format_duration_matches_live_display() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(-5), "0:00");
        assert_eq!(format_duration(59_999), "0:59");
        assert_eq!(format_duration(45 * 60_000), "45:00");
        assert_eq!(format_duration(5_400_000), "1:30:00");
        assert_eq!(format_duration(36_000_000 + 61_000), "10:01:01");
    }

    #[test]
    fn format_hhmm_pads_and_truncates() {
        assert_eq!(format_hhmm(0), "00:00");
        assert_eq!(format_hhmm(59_999), "00:00");
        assert_eq!(format_hhmm(6_300_000), "01:45");
        assert_eq!(format_hhmm(100 * 3_600_000), "100:00");
    }

    #[test]
    fn report_lists_each_task() {
        let clock = FixedClock(day().and_hms_opt(13, 0, 0).unwrap());
        let date = DateKey::new(day());
        let mut ledger = Ledger::new();
        let review = ledger.create_task(date, "Review").unwrap();
        let lunch = ledger.create_task(date, "Lunch").unwrap();
        let running = ledger.create_task(date, "Inbox").unwrap();

        ledger
            .start_tracking(
                review,
                day().and_hms_opt(9, 0, 0).unwrap(),
                Arbitration::RunConcurrently,
                &clock,
            )
            .unwrap();
        ledger
            .stop_tracking(review, day().and_hms_opt(10, 30, 0).unwrap())
            .unwrap();
        ledger
            .task_mut(review)
            .unwrap()
            .add_manual_time(ManualKind::Added, 15 * 60_000);
        ledger
            .task_mut(lunch)
            .unwrap()
            .add_manual_time(ManualKind::Added, 30 * 60_000);
        ledger
            .start_tracking(
                running,
                day().and_hms_opt(12, 0, 0).unwrap(),
                Arbitration::RunConcurrently,
                &clock,
            )
            .unwrap();

        assert_snapshot!(format_report(ledger.day(date).unwrap()));
    }

    #[test]
    fn report_rejects_empty_day() {
        let db = Database::open_in_memory().unwrap();
        let clock = FixedClock(day().and_hms_opt(13, 0, 0).unwrap());
        let args = ReportArgs {
            day: DayArg {
                date: Some("2025-05-06".to_string()),
            },
        };
        let mut output = Vec::new();
        let err = run(&mut output, &db, &clock, &args).unwrap_err();
        assert_eq!(err.to_string(), "no tasks to report for 2025-05-06");
    }
}
