//! Shared utilities for CLI commands.

use std::io::{BufRead, Write};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use clap::Args;
use regex::Regex;
use tl_core::{Clock, DateKey, Ledger, LedgerError, TaskRef, parse_timestamp};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour)s?\s+ago$").unwrap());

/// Conservative bound for relative times (one week in minutes).
const MAX_RELATIVE_MINUTES: i64 = 7 * 24 * 60;

/// Day selection shared by most commands.
#[derive(Debug, Clone, Default, Args)]
pub struct DayArg {
    /// Day to operate on (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<String>,
}

impl DayArg {
    pub fn resolve(&self, clock: &dyn Clock) -> Result<DateKey> {
        match &self.date {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(DateKey::new(clock.now().date())),
        }
    }
}

/// Parses a time typed at the prompt into an instant on `day`.
///
/// Supports:
/// - `HH:MM` on the selected day: "09:30"
/// - A full local timestamp: "2025-05-06T09:30"
/// - `now`, or relative: "15 minutes ago", "2 hours ago"
pub fn parse_time_input(
    day: NaiveDate,
    input: &str,
    clock: &dyn Clock,
) -> Result<NaiveDateTime, LedgerError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("now") {
        return Ok(clock.now());
    }
    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
        return Ok(day.and_time(time));
    }
    if let Some(caps) = RELATIVE_TIME_RE.captures(trimmed) {
        let n: i64 = caps[1].parse().unwrap_or(i64::MAX);
        let minutes = if &caps[2] == "hour" {
            n.saturating_mul(60)
        } else {
            n
        };
        if minutes <= MAX_RELATIVE_MINUTES {
            return Ok(clock.now() - Duration::minutes(minutes));
        }
    }
    parse_timestamp(trimmed).map_err(|_| LedgerError::InvalidTimestamp {
        input: input.to_string(),
    })
}

/// The instant used when no time was given: the current wall-clock minute,
/// placed on the selected day.
pub fn default_time(day: NaiveDate, clock: &dyn Clock) -> NaiveDateTime {
    let now = clock.now().time();
    let minute = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now);
    day.and_time(minute)
}

/// Resolves an optional `--at` value against the selected day.
pub fn time_or_default(
    day: NaiveDate,
    input: Option<&str>,
    clock: &dyn Clock,
) -> Result<NaiveDateTime, LedgerError> {
    input.map_or_else(
        || Ok(default_time(day, clock)),
        |raw| parse_time_input(day, raw, clock),
    )
}

/// Reads a leading integer the way lenient form fields do: "1h" is 1, "" is 0.
pub fn parse_lenient_int(input: &str) -> i64 {
    let trimmed = input.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map_or(0, |n| sign * n)
}

/// Milliseconds for an hours/minutes pair of raw inputs.
pub fn manual_amount_ms(hours: Option<&str>, minutes: Option<&str>) -> i64 {
    let hours = hours.map_or(0, parse_lenient_int);
    let minutes = minutes.map_or(0, parse_lenient_int);
    hours
        .saturating_mul(3_600_000)
        .saturating_add(minutes.saturating_mul(60_000))
}

/// Finds a task on `date` by name (case-insensitive) or 1-based position.
pub fn resolve_task(ledger: &Ledger, date: DateKey, selector: &str) -> Result<TaskRef> {
    let day = ledger
        .day(date)
        .with_context(|| format!("no tasks recorded for {date}"))?;

    if let Some(index) = day.position_by_name(selector) {
        return Ok(TaskRef::new(date, index));
    }

    let position = selector.trim().trim_start_matches('#').parse::<usize>().ok();
    match position {
        Some(n) if (1..=day.tasks.len()).contains(&n) => Ok(TaskRef::new(date, n - 1)),
        _ => bail!("task not found on {date}: {selector}"),
    }
}

/// Converts a 1-based entry number from the history view into an index.
pub fn entry_index(number: usize) -> Result<usize> {
    if number == 0 {
        bail!("entry numbers start at 1");
    }
    Ok(number - 1)
}

/// Asks a yes/no question; anything but `y`/`yes` is a no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, writer: &mut W, question: &str) -> Result<bool> {
    write!(writer, "{question} [y/N] ")?;
    writer.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
