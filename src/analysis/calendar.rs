//! Calendar keys for bucketing daily records.
//!
//! A record lands in exactly one `(year, month, week)` bucket, derived from
//! its own date and nothing else. The year and month are plain calendar
//! values; the week number depends on a [`WeekNumbering`] convention that is
//! fixed for the lifetime of an aggregator, since switching conventions moves
//! bucket boundaries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Week numbering
// ---------------------------------------------------------------------------

/// Week-of-year conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekNumbering {
    /// ISO 8601: weeks start on Monday and week 1 is the week holding the
    /// year's first Thursday. Numbers run 1..=53, so early January can carry
    /// week 52/53 and late December can carry week 1.
    #[default]
    Iso8601,
    /// US locale: weeks start on Sunday and week 1 is the week holding
    /// January 1. A late-December date whose week already contains the next
    /// January 1 is week 1.
    SundayFirst,
}

impl WeekNumbering {
    /// Week-of-year number of `date` under this convention.
    pub fn week_of(self, date: NaiveDate) -> u32 {
        match self {
            WeekNumbering::Iso8601 => date.iso_week().week(),
            WeekNumbering::SundayFirst => sunday_first_week(date),
        }
    }
}

fn sunday_first_week(date: NaiveDate) -> u32 {
    let weekday = date.weekday().num_days_from_sunday();

    // Saturday of this week falls in next January
    if date.month() == 12 && date.day() + (6 - weekday) > 31 {
        return 1;
    }

    let ordinal0 = date.ordinal0();
    let jan1_weekday = (weekday + 7 - ordinal0 % 7) % 7;
    (ordinal0 + jan1_weekday) / 7 + 1
}

impl fmt::Display for WeekNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekNumbering::Iso8601 => write!(f, "iso8601"),
            WeekNumbering::SundayFirst => write!(f, "sunday_first"),
        }
    }
}

impl FromStr for WeekNumbering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iso" | "iso8601" | "monday" => Ok(WeekNumbering::Iso8601),
            "sunday" | "sunday_first" | "us" => Ok(WeekNumbering::SundayFirst),
            other => Err(format!(
                "unknown week numbering '{}' (expected 'iso8601' or 'sunday_first')",
                other
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar key
// ---------------------------------------------------------------------------

/// Bucket coordinates of one date. `month` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarKey {
    pub year: i32,
    pub month: u32,
    pub week: u32,
}

impl CalendarKey {
    pub fn of(date: NaiveDate, numbering: WeekNumbering) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
            week: numbering.week_of(date),
        }
    }
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Interprets a record's date string as a calendar date.
///
/// Accepts `2024-01-11`, `11 Jan 2024`, RFC 3339 date-times and naive
/// `2024-01-11T00:00:00` date-times. Date-times keep the date as written;
/// no timezone conversion is applied. Returns `None` for anything else.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d %b %Y"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
