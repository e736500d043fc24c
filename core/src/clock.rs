//! Ledger clock — owns "now" for month stamps and purchase timestamps.
//!
//! RULE: Nothing in the ledger may call the system time directly.
//! All time flows through a LedgerClock so tests can pin the month.

use crate::error::{LedgerError, LedgerResult};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A calendar month in `YYYY-MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year:  i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> LedgerResult<Self> {
        if !(1..=9999).contains(&year) {
            return Err(LedgerError::validation("month", format!("year {year} out of range")));
        }
        if !(1..=12).contains(&month) {
            return Err(LedgerError::validation("month", format!("month {month} out of range")));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self)  -> i32 { self.year }
    pub fn month(&self) -> u32 { self.month }

    fn of<D: Datelike>(date: &D) -> Self {
        Self { year: date.year(), month: date.month() }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = LedgerError;

    fn from_str(s: &str) -> LedgerResult<Self> {
        let invalid = || LedgerError::validation("month", format!("expected YYYY-MM, got {s:?}"));
        // Exactly four digits, a dash, two digits.
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (y, m) = (&s[..4], &s[5..]);
        if !y.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Month::new(year, month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Source of the current time for every ledger operation.
pub trait LedgerClock {
    fn now(&self) -> NaiveDateTime;

    fn current_month(&self) -> Month {
        Month::of(&self.now())
    }

    fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl LedgerClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to one instant. Used in tests and replays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    pub at: NaiveDateTime,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at }
    }

    /// Midday on the first of the given month.
    pub fn at_month(month: Month) -> Self {
        let at = NaiveDate::from_ymd_opt(month.year(), month.month(), 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap_or_default();
        Self { at }
    }
}

impl LedgerClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.at
    }
}
