//! Property-based tests for aggregation invariants
//!
//! Uses Proptest to verify that `Aggregator::build` keeps its invariants
//! under arbitrary series:
//!
//! - Every running total equals a direct recomputation from its days
//! - Every record lands in exactly one bucket, chosen by its own date
//! - Month ranks are a permutation of 1..=M
//! - Bucket keys are unique within their parent
//! - Building twice gives the same tree

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use flowtable::analysis::CalendarKey;
use flowtable::model::all_months;
use flowtable::{Aggregator, DailyRecord, WeekNumbering, YearBucket};
use proptest::prelude::*;

/// Dates between 2022-01-01 and roughly the end of 2025.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..1460).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap() + chrono::Duration::days(offset)
    })
}

/// Integer-valued flows so sums are exact regardless of order.
fn arb_total() -> impl Strategy<Value = f64> {
    (-5_000i32..5_000i32).prop_map(f64::from)
}

fn arb_numbering() -> impl Strategy<Value = WeekNumbering> {
    prop_oneof![Just(WeekNumbering::Iso8601), Just(WeekNumbering::SundayFirst)]
}

/// A series of records; `rank` doubles as a unique tag for each input row.
fn arb_series() -> impl Strategy<Value = Vec<DailyRecord>> {
    prop::collection::vec((arb_date(), arb_total()), 0..120).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(tag, (date, total))| {
                DailyRecord::new(date.format("%Y-%m-%d").to_string(), total)
                    .with_rank(tag as u32)
            })
            .collect()
    })
}

fn date_of(record: &DailyRecord) -> NaiveDate {
    NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").unwrap()
}

fn build(records: &[DailyRecord], numbering: WeekNumbering) -> Vec<YearBucket> {
    Aggregator::new(numbering).build(records.to_vec()).unwrap()
}

proptest! {
    #[test]
    fn prop_totals_match_direct_recomputation(
        records in arb_series(),
        numbering in arb_numbering(),
    ) {
        let years = build(&records, numbering);

        for year in &years {
            let direct: f64 = records
                .iter()
                .filter(|r| date_of(r).year() == year.year_index)
                .map(|r| r.total)
                .sum();
            prop_assert_eq!(year.total_period, direct);
            prop_assert_eq!(year.total_period, year.months.iter().map(|m| m.total_period).sum::<f64>());

            for month in &year.months {
                prop_assert_eq!(month.total_period, month.days().map(|d| d.total).sum::<f64>());
                for week in &month.weeks {
                    prop_assert_eq!(week.total_period, week.days.iter().map(|d| d.total).sum::<f64>());
                }
            }
        }
    }

    #[test]
    fn prop_every_record_lands_in_exactly_its_own_bucket(
        records in arb_series(),
        numbering in arb_numbering(),
    ) {
        let years = build(&records, numbering);

        let mut seen = Vec::new();
        for year in &years {
            for month in &year.months {
                prop_assert_eq!(month.year_index, year.year_index);
                for week in &month.weeks {
                    for day in &week.days {
                        let key = CalendarKey::of(date_of(day), numbering);
                        prop_assert_eq!(key.year, year.year_index);
                        prop_assert_eq!(key.month, month.month_index);
                        prop_assert_eq!(key.week, week.week_index);
                        seen.push(day.daily_rank);
                    }
                }
            }
        }

        seen.sort_unstable();
        let expected: Vec<u32> = (0..records.len() as u32).collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn prop_month_ranks_form_a_permutation(
        records in arb_series(),
        numbering in arb_numbering(),
    ) {
        let years = build(&records, numbering);

        let mut ranks: Vec<usize> = all_months(&years).map(|m| m.rank).collect();
        ranks.sort_unstable();
        let expected: Vec<usize> = (1..=ranks.len()).collect();
        prop_assert_eq!(ranks, expected);
        prop_assert!(years.iter().all(|y| y.rank == 0));
    }

    #[test]
    fn prop_ranks_follow_descending_totals_with_stable_ties(
        records in arb_series(),
    ) {
        let years = build(&records, WeekNumbering::Iso8601);

        // Tree order position of every month.
        let months: Vec<_> = all_months(&years).collect();
        let mut by_rank = months.clone();
        by_rank.sort_by_key(|m| m.rank);

        for pair in by_rank.windows(2) {
            prop_assert!(pair[0].total_period >= pair[1].total_period);
            if pair[0].total_period == pair[1].total_period {
                let first = months.iter().position(|m| std::ptr::eq(*m, pair[0])).unwrap();
                let second = months.iter().position(|m| std::ptr::eq(*m, pair[1])).unwrap();
                prop_assert!(first < second, "tied months must keep tree order");
            }
        }
    }

    #[test]
    fn prop_bucket_keys_are_unique_within_parent(
        records in arb_series(),
        numbering in arb_numbering(),
    ) {
        let years = build(&records, numbering);

        let year_keys: HashSet<i32> = years.iter().map(|y| y.year_index).collect();
        prop_assert_eq!(year_keys.len(), years.len());
        for year in &years {
            let month_keys: HashSet<u32> = year.months.iter().map(|m| m.month_index).collect();
            prop_assert_eq!(month_keys.len(), year.months.len());
            for month in &year.months {
                let week_keys: HashSet<u32> = month.weeks.iter().map(|w| w.week_index).collect();
                prop_assert_eq!(week_keys.len(), month.weeks.len());
            }
        }

        let distinct_months: HashSet<(i32, u32)> = records
            .iter()
            .map(|r| { let d = date_of(r); (d.year(), d.month0()) })
            .collect();
        prop_assert_eq!(all_months(&years).count(), distinct_months.len());
    }

    #[test]
    fn prop_chronological_input_is_newest_first(
        records in arb_series(),
    ) {
        let mut sorted = records;
        sorted.sort_by_key(date_of);
        let years = build(&sorted, WeekNumbering::Iso8601);

        let days: Vec<NaiveDate> = years.iter().flat_map(|y| y.days()).map(date_of).collect();
        prop_assert!(days.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn prop_build_is_deterministic(
        records in arb_series(),
        numbering in arb_numbering(),
    ) {
        prop_assert_eq!(build(&records, numbering), build(&records, numbering));
    }
}

#[test]
fn test_day_counts_per_month_match_input() {
    let records: Vec<DailyRecord> = (1..=31)
        .map(|d| DailyRecord::new(format!("2024-03-{:02}", d), d as f64))
        .collect();
    let years = build(&records, WeekNumbering::Iso8601);

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for month in all_months(&years) {
        *counts.entry(month.month_index).or_default() += month.day_count();
    }
    assert_eq!(counts.get(&2), Some(&31));
    assert_eq!(years[0].total_period, (1..=31).sum::<i32>() as f64);
}
