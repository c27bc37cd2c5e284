//! Flow table rendering support.
//!
//! A [`Report`] walks a built tree and produces the rows a table view or
//! an export needs: one row per year, month, completed week and day, with
//! instrument cells in registry column order. Number formatting is left to
//! the caller (see [`crate::format`]); rows carry raw values.

use std::io::Write;

use chrono::{Datelike, Weekday};
use serde::Serialize;

use crate::analysis::calendar::parse_calendar_date;
use crate::error::Error;
use crate::format::{format_flows, format_thousands, month_label, FlowSign};
use crate::instruments::{ConfigLookupError, InstrumentRegistry};
use crate::model::{DailyRecord, WeekBucket, YearBucket};

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One row of the flow table, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableRow {
    Year {
        year: i32,
        total: f64,
    },
    Month {
        label: String,
        year: i32,
        month_index: u32,
        total: f64,
        rank: usize,
    },
    /// Subtotal row, only emitted for weeks whose newest day is a Friday.
    Week {
        week_index: u32,
        total: f64,
    },
    Day {
        date: String,
        /// One cell per report column; `None` for no flow.
        flows: Vec<Option<f64>>,
        total: f64,
        sign: FlowSign,
        rank: u32,
    },
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A built tree plus the resolved instrument column order.
#[derive(Debug)]
pub struct Report<'a> {
    years: &'a [YearBucket],
    columns: Vec<String>,
}

impl<'a> Report<'a> {
    /// Resolves `tickers` to registry column order. Every ticker must have a
    /// display configuration.
    pub fn new<S: AsRef<str>>(
        years: &'a [YearBucket],
        registry: &InstrumentRegistry,
        tickers: &[S],
    ) -> Result<Self, ConfigLookupError> {
        Ok(Self {
            years,
            columns: registry.sorted_tickers(tickers)?,
        })
    }

    /// Report over every instrument that has a non-zero flow somewhere in
    /// the tree.
    pub fn for_observed_instruments(
        years: &'a [YearBucket],
        registry: &InstrumentRegistry,
    ) -> Result<Self, ConfigLookupError> {
        let tickers = observed_tickers(years);
        Self::new(years, registry, tickers.as_slice())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> Vec<TableRow> {
        let mut rows = Vec::new();
        for year in self.years {
            rows.push(TableRow::Year {
                year: year.year_index,
                total: year.total_period,
            });
            for month in &year.months {
                rows.push(TableRow::Month {
                    label: month_label(month.month_index, year.year_index),
                    year: year.year_index,
                    month_index: month.month_index,
                    total: month.total_period,
                    rank: month.rank,
                });
                for week in &month.weeks {
                    if closes_on_friday(week) {
                        rows.push(TableRow::Week {
                            week_index: week.week_index,
                            total: week.total_period,
                        });
                    }
                    rows.extend(week.days.iter().map(|day| self.day_row(day)));
                }
            }
        }
        rows
    }

    fn day_row(&self, day: &DailyRecord) -> TableRow {
        TableRow::Day {
            date: day.date.clone(),
            flows: self.columns.iter().map(|t| day.flow(t)).collect(),
            total: day.total,
            sign: FlowSign::of(day.total),
            rank: day.daily_rank,
        }
    }

    /// Writes one CSV line per day, newest first in tree order:
    /// `Date,<columns...>,Total,Rank`. Absent flows are empty cells.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        let mut header = vec!["Date".to_string()];
        header.extend(self.columns.iter().cloned());
        header.push("Total".to_string());
        header.push("Rank".to_string());
        csv.write_record(&header)?;

        for day in self.years.iter().flat_map(YearBucket::days) {
            let mut record = vec![day.date.clone()];
            record.extend(
                self.columns
                    .iter()
                    .map(|t| day.flow(t).map(|f| f.to_string()).unwrap_or_default()),
            );
            record.push(day.total.to_string());
            record.push(day.daily_rank.to_string());
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }

    /// Plain-text table: date column, one column per instrument, net total
    /// and rank. Month rows carry the month rank, day rows the daily rank.
    pub fn render_text(&self) -> String {
        let mut out = format!("{:<12}", "Date");
        for ticker in &self.columns {
            out.push_str(&format!("{:>8}", ticker));
        }
        out.push_str(&format!("{:>10}{:>6}\n", "Flows", "Rank"));

        let blank_cells = " ".repeat(8 * self.columns.len());
        for row in self.rows() {
            let line = match row {
                TableRow::Year { year, total } => {
                    format!("\n{:<12}{}{:>10}", year, blank_cells, format_thousands(total))
                }
                TableRow::Month { label, total, rank, .. } => format!(
                    "{:<12}{}{:>10}{:>6}",
                    label,
                    blank_cells,
                    format_thousands(total),
                    rank
                ),
                TableRow::Week { week_index, total } => format!(
                    "{:<12}{}{:>10}",
                    format!("Week {}", week_index),
                    blank_cells,
                    format_thousands(total)
                ),
                TableRow::Day { date, flows, total, rank, .. } => {
                    let label = parse_calendar_date(&date)
                        .map(|d| d.format("%a %d %b").to_string())
                        .unwrap_or(date);
                    let cells: String = flows
                        .iter()
                        .map(|flow| match flow {
                            Some(f) => format!("{:>8}", format_flows(*f, true)),
                            None => format!("{:>8}", "."),
                        })
                        .collect();
                    format!("{:<12}{}{:>10}{:>6}", label, cells, format_thousands(total), rank)
                }
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Serialises the whole tree as pretty JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self.years)?)
    }
}

/// Sorted, de-duplicated tickers with a non-zero flow anywhere in `years`.
pub fn observed_tickers(years: &[YearBucket]) -> Vec<String> {
    let mut tickers: Vec<String> = years
        .iter()
        .flat_map(YearBucket::days)
        .flat_map(|day| {
            day.per_instrument
                .iter()
                .filter(|(_, flow)| **flow != 0.0)
                .map(|(ticker, _)| ticker.clone())
        })
        .collect();
    tickers.sort();
    tickers.dedup();
    tickers
}

fn closes_on_friday(week: &WeekBucket) -> bool {
    week.days
        .first()
        .and_then(|day| parse_calendar_date(&day.date))
        .is_some_and(|date| date.weekday() == Weekday::Fri)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
