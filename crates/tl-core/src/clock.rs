//! Wall-clock source for operations that act "now".

use chrono::{Local, NaiveDateTime};

/// Provides the current local wall-clock time.
///
/// The ledger only consults a clock where an operation is defined in terms of
/// the current instant rather than a caller-supplied one.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant. Useful for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
