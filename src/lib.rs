//! Hierarchical aggregation of daily instrument flows.
//!
//! A flat series of [`model::DailyRecord`]s is grouped into a ranked
//! year → month → week → day tree by [`analysis::Aggregator`]. Everything
//! else in the crate serves that tree: loading the series, the instrument
//! display registry, formatting and table/CSV/JSON output.

pub mod analysis;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod instruments;
pub mod logging;
pub mod model;
pub mod report;

pub use analysis::{Aggregator, WeekNumbering};
pub use error::{Error, Result};
pub use model::{DailyRecord, DateParseError, MonthBucket, WeekBucket, YearBucket};
