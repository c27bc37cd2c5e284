//! Loading of the materialized daily flow series.
//!
//! The series is fetched and written to disk elsewhere; this module only
//! reads it back into `DailyRecord`s.
//!
//! Submodules:
//! - `series` — JSON and CSV readers for the raw series.

pub mod series;

pub use series::{load_series, read_series, SeriesFormat};
