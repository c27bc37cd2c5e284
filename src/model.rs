//! DailyRecord, WeekBucket, MonthBucket, YearBucket, DateParseError
//! core data structures and error handling
//!
//! Core data types for the flow table service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no aggregation logic and no I/O, only types and a few
//! accessors over them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Input record
// ---------------------------------------------------------------------------

/// One day of flows, as materialized by the upstream data source.
///
/// Deserializes from the raw series shape, e.g.
/// `{"Date": "2024-01-11", "IBIT": 111.7, "GBTC": -95.1, "Total": 655.3, "rank": 12}`.
/// Every key other than `Date`, `Total` and `rank` is an instrument flow.
/// Instrument identifiers are opaque; nothing here validates them against a
/// display configuration.
///
/// `total` is taken as given. It is never recomputed from `per_instrument`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(rename = "Date")]
    pub date: String, // e.g. "2024-01-11", "11 Jan 2024", RFC 3339
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "rank", default)]
    pub daily_rank: u32,
    #[serde(flatten)]
    pub per_instrument: BTreeMap<String, f64>,
}

impl DailyRecord {
    pub fn new(date: impl Into<String>, total: f64) -> Self {
        Self {
            date: date.into(),
            total,
            daily_rank: 0,
            per_instrument: BTreeMap::new(),
        }
    }

    pub fn with_rank(mut self, daily_rank: u32) -> Self {
        self.daily_rank = daily_rank;
        self
    }

    pub fn with_flow(mut self, ticker: impl Into<String>, flow: f64) -> Self {
        self.per_instrument.insert(ticker.into(), flow);
        self
    }

    /// Flow for one instrument, or `None` when the instrument is absent or
    /// had no activity (zero) that day.
    pub fn flow(&self, ticker: &str) -> Option<f64> {
        self.per_instrument
            .get(ticker)
            .copied()
            .filter(|flow| *flow != 0.0)
    }
}

// ---------------------------------------------------------------------------
// Aggregation tree
// ---------------------------------------------------------------------------

/// Days sharing one week-of-year number inside a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekBucket {
    pub week_index: u32,
    /// Newest first when the input is chronological.
    pub days: Vec<DailyRecord>,
    pub total_period: f64,
}

/// One calendar month. `month_index` is 0-based (January = 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub month_index: u32,
    pub year_index: i32,
    pub weeks: Vec<WeekBucket>,
    pub total_period: f64,
    /// 1-based position among all months by descending total.
    pub rank: usize,
}

/// One calendar year. Years are not ranked; `rank` is always 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearBucket {
    pub year_index: i32,
    pub months: Vec<MonthBucket>,
    pub total_period: f64,
    pub rank: usize,
}

impl WeekBucket {
    pub(crate) fn new(week_index: u32) -> Self {
        Self {
            week_index,
            days: Vec::new(),
            total_period: 0.0,
        }
    }
}

impl MonthBucket {
    pub(crate) fn new(year_index: i32, month_index: u32) -> Self {
        Self {
            month_index,
            year_index,
            weeks: Vec::new(),
            total_period: 0.0,
            rank: 0,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = &DailyRecord> {
        self.weeks.iter().flat_map(|week| week.days.iter())
    }

    pub fn day_count(&self) -> usize {
        self.weeks.iter().map(|week| week.days.len()).sum()
    }
}

impl YearBucket {
    pub(crate) fn new(year_index: i32) -> Self {
        Self {
            year_index,
            months: Vec::new(),
            total_period: 0.0,
            rank: 0,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = &DailyRecord> {
        self.months.iter().flat_map(|month| month.days())
    }

    pub fn day_count(&self) -> usize {
        self.months.iter().map(MonthBucket::day_count).sum()
    }
}

/// Every month in the tree, in display order (years outer, months inner).
pub fn all_months(years: &[YearBucket]) -> impl Iterator<Item = &MonthBucket> {
    years.iter().flat_map(|year| year.months.iter())
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A record's date could not be interpreted as a calendar date.
///
/// `position` is the zero-based index of the record in the input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {position}: cannot interpret '{input}' as a calendar date")]
pub struct DateParseError {
    pub input: String,
    pub position: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
