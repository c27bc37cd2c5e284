//! Aggregation of the daily flow series.
//!
//! This module turns the flat, date-ordered series into the ranked
//! year → month → week → day tree consumed by the report layer.
//!
//! Submodules:
//! - `calendar`  — date parsing and the week-numbering convention.
//! - `groupings` — the `Aggregator` fold that builds the tree.
//! - `ranking`   — the second pass that ranks months by total.

pub mod calendar;
pub mod groupings;
pub mod ranking;

pub use calendar::{CalendarKey, WeekNumbering};
pub use groupings::Aggregator;
