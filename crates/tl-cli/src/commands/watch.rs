//! Live day view, redrawn on a fixed period until cancelled.
//!
//! Each frame reloads the ledger, so starts and stops made from another
//! terminal show up on the next tick. Watching never writes.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tl_core::{Clock, DateKey};
use tl_db::Database;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use super::list::format_day;
use super::util::DayArg;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub day: DayArg,

    /// Refresh period in milliseconds. Defaults to `refresh_interval_ms`.
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

/// Redraws the day every `period` until `shutdown` resolves.
///
/// Returns the number of frames drawn.
pub async fn run<W, F>(
    writer: &mut W,
    db: &Database,
    clock: &dyn Clock,
    date: DateKey,
    period: Duration,
    clear_screen: bool,
    shutdown: F,
) -> Result<usize>
where
    W: Write,
    F: Future<Output = ()>,
{
    let mut ticker = interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut frames = 0;
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                let ledger = db.load_ledger()?;
                if clear_screen {
                    write!(writer, "{CLEAR_SCREEN}")?;
                }
                write!(writer, "{}", format_day(&ledger, date, clock.now()))?;
                writeln!(writer, "(Ctrl-C to exit)")?;
                writer.flush()?;
                frames += 1;
            }
        }
    }

    debug!(frames, "watch stopped");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use tl_core::{Arbitration, FixedClock, Ledger};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn redraws_until_shutdown_without_writing() {
        let clock = FixedClock(day().and_hms_opt(10, 0, 0).unwrap());
        let date = DateKey::new(day());
        let mut db = Database::open_in_memory().unwrap();
        let mut ledger = Ledger::new();
        let task = ledger.create_task(date, "Review").unwrap();
        ledger
            .start_tracking(
                task,
                day().and_hms_opt(9, 0, 0).unwrap(),
                Arbitration::RunConcurrently,
                &clock,
            )
            .unwrap();
        db.save_ledger(&ledger).unwrap();
        let saved_at = db.ledger_saved_at().unwrap();

        let mut output = Vec::new();
        let frames = run(
            &mut output,
            &db,
            &clock,
            date,
            Duration::from_millis(1000),
            false,
            tokio::time::sleep(Duration::from_millis(3500)),
        )
        .await
        .unwrap();

        assert_eq!(frames, 4);
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("May 6, 2025").count(), 4);
        assert!(output.contains("1:00:00  * running"));
        assert!(!output.contains(CLEAR_SCREEN));
        assert_eq!(db.load_ledger().unwrap(), ledger);
        assert_eq!(db.ledger_saved_at().unwrap(), saved_at);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_shutdown_draws_nothing() {
        let clock = FixedClock(day().and_hms_opt(10, 0, 0).unwrap());
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let frames = run(
            &mut output,
            &db,
            &clock,
            DateKey::new(day()),
            Duration::from_millis(1000),
            true,
            std::future::ready(()),
        )
        .await
        .unwrap();

        assert_eq!(frames, 0);
        assert!(output.is_empty());
    }
}
