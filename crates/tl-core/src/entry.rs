//! Start/stop entries that make up a task's time log.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Whether an entry opens or closes a tracked interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Start,
    Stop,
}

impl EntryKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = UnknownEntryKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            _ => Err(UnknownEntryKind(s.to_string())),
        }
    }
}

/// Error type for unknown entry kind strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntryKind(String);

impl fmt::Display for UnknownEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entry kind: {} (expected start or stop)", self.0)
    }
}

impl std::error::Error for UnknownEntryKind {}

/// One start or stop record in local wall-clock time.
///
/// Older snapshots used `type` and `time` for these fields; both are
/// accepted on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    #[serde(alias = "type")]
    pub kind: EntryKind,
    #[serde(alias = "time", with = "timestamp")]
    pub timestamp: NaiveDateTime,
}

impl TimeEntry {
    pub const fn start(timestamp: NaiveDateTime) -> Self {
        Self {
            kind: EntryKind::Start,
            timestamp,
        }
    }

    pub const fn stop(timestamp: NaiveDateTime) -> Self {
        Self {
            kind: EntryKind::Stop,
            timestamp,
        }
    }
}

/// Formats accepted for naive (offset-free) timestamps, tried in order.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a persisted or user-supplied timestamp into local wall-clock time.
///
/// RFC 3339 values carrying an offset (including `Z`) are converted to the
/// local zone; naive values are taken as already local.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, LedgerError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| LedgerError::InvalidTimestamp {
            input: input.to_string(),
        })
}

/// Serde adapter writing `YYYY-MM-DDTHH:MM:SS.sss` and reading anything
/// [`parse_timestamp`] accepts.
pub(crate) mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn entry_kind_parses_case_insensitively() {
        assert_eq!("Start".parse::<EntryKind>().unwrap(), EntryKind::Start);
        assert_eq!(" stop ".parse::<EntryKind>().unwrap(), EntryKind::Stop);
        let err = "pause".parse::<EntryKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown entry kind: pause (expected start or stop)"
        );
    }

    #[test]
    fn entry_serializes_with_millisecond_timestamp() {
        let json = serde_json::to_string(&TimeEntry::start(at(9, 0))).unwrap();
        assert_eq!(json, r#"{"kind":"start","timestamp":"2025-05-06T09:00:00.000"}"#);
    }

    #[test]
    fn entry_accepts_legacy_field_names() {
        let entry: TimeEntry =
            serde_json::from_str(r#"{"type":"stop","time":"2025-05-06T10:30:00"}"#).unwrap();
        assert_eq!(entry, TimeEntry::stop(at(10, 30)));
    }

    #[test]
    fn parse_timestamp_accepts_naive_forms() {
        assert_eq!(parse_timestamp("2025-05-06T09:00").unwrap(), at(9, 0));
        assert_eq!(parse_timestamp("2025-05-06 09:00:00").unwrap(), at(9, 0));
        assert_eq!(parse_timestamp("2025-05-06T09:00:00.000").unwrap(), at(9, 0));
    }

    #[test]
    fn parse_timestamp_converts_offsets_to_local() {
        let expected = DateTime::parse_from_rfc3339("2025-05-06T13:00:00.000Z")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parse_timestamp("2025-05-06T13:00:00.000Z").unwrap(), expected);
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert_eq!(
            parse_timestamp("yesterday-ish"),
            Err(LedgerError::InvalidTimestamp {
                input: "yesterday-ish".to_string()
            })
        );
    }
}
