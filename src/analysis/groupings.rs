//! Year → month → week → day grouping of a daily flow series.
//!
//! [`Aggregator::build`] folds a flat sequence of [`DailyRecord`]s into a
//! nested tree, carrying a running total at every level, then ranks every
//! month across all years by total.
//!
//! # Ordering
//! Each list in the tree (years, months in a year, weeks in a month, days in
//! a week) is ordered by *reverse first sight*: an element seen for the first
//! time goes in front of everything seen before it. Chronological input
//! therefore comes out newest-first at every level. Lookups go through hash
//! maps keyed by calendar coordinates; only the observable order is tied to
//! first sight.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::analysis::calendar::{parse_calendar_date, CalendarKey, WeekNumbering};
use crate::analysis::ranking::assign_month_ranks;
use crate::model::{DailyRecord, DateParseError, MonthBucket, WeekBucket, YearBucket};

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Stateless tree builder. Holds only the week-numbering convention, so the
/// same aggregator and input always produce the same tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregator {
    week_numbering: WeekNumbering,
}

impl Aggregator {
    pub fn new(week_numbering: WeekNumbering) -> Self {
        Self { week_numbering }
    }

    pub fn week_numbering(&self) -> WeekNumbering {
        self.week_numbering
    }

    /// Builds the ranked year/month/week/day tree from `records`.
    ///
    /// Every date is parsed before any bucket is created, so a bad date
    /// aborts the whole call and no partial tree is ever returned.
    ///
    /// Precondition: every record carries its precomputed `total`. Totals
    /// are summed as given, never recomputed from per-instrument flows.
    /// Duplicate days are not merged; each one is folded in and counted.
    pub fn build<I>(&self, records: I) -> Result<Vec<YearBucket>, DateParseError>
    where
        I: IntoIterator<Item = DailyRecord>,
    {
        let dated = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| match parse_calendar_date(&record.date) {
                Some(date) => Ok((date, record)),
                None => {
                    warn!(position, date = %record.date, "rejecting flow series: unparseable date");
                    Err(DateParseError {
                        input: record.date,
                        position,
                    })
                }
            })
            .collect::<Result<Vec<(NaiveDate, DailyRecord)>, _>>()?;

        let record_count = dated.len();
        let mut tree = TreeBuilder::default();
        for (date, record) in dated {
            tree.insert(CalendarKey::of(date, self.week_numbering), record);
        }

        let mut years = tree.finish();
        assign_month_ranks(&mut years);

        info!(
            records = record_count,
            years = years.len(),
            months = years.iter().map(|y| y.months.len()).sum::<usize>(),
            week_numbering = %self.week_numbering,
            "flow tree built"
        );
        Ok(years)
    }
}

// ---------------------------------------------------------------------------
// Fold state
// ---------------------------------------------------------------------------

// Buckets are appended in first-sight order and reversed once at the end,
// which is the same observable order as inserting each new one at the front.

#[derive(Default)]
struct TreeBuilder {
    years: Vec<YearBucket>,
    year_slots: HashMap<i32, usize>,
    month_slots: HashMap<(i32, u32), usize>,
    week_slots: HashMap<(i32, u32, u32), usize>,
}

impl TreeBuilder {
    fn insert(&mut self, key: CalendarKey, record: DailyRecord) {
        let years = &mut self.years;
        let year_slot = *self.year_slots.entry(key.year).or_insert_with(|| {
            debug!(year = key.year, "new year bucket");
            years.push(YearBucket::new(key.year));
            years.len() - 1
        });
        let year = &mut self.years[year_slot];

        let months = &mut year.months;
        let month_slot = *self
            .month_slots
            .entry((key.year, key.month))
            .or_insert_with(|| {
                months.push(MonthBucket::new(key.year, key.month));
                months.len() - 1
            });
        let month = &mut year.months[month_slot];

        let weeks = &mut month.weeks;
        let week_slot = *self
            .week_slots
            .entry((key.year, key.month, key.week))
            .or_insert_with(|| {
                weeks.push(WeekBucket::new(key.week));
                weeks.len() - 1
            });
        let week = &mut month.weeks[week_slot];

        let total = record.total;
        week.days.push(record);
        week.total_period += total;
        month.total_period += total;
        year.total_period += total;
    }

    fn finish(self) -> Vec<YearBucket> {
        let mut years = self.years;
        years.reverse();
        for year in &mut years {
            year.months.reverse();
            for month in &mut year.months {
                month.weeks.reverse();
                for week in &mut month.weeks {
                    week.days.reverse();
                }
            }
        }
        years
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
