//! Month ranking across the whole tree.
//!
//! Ranks only make sense once every record has been folded in, so this runs
//! as a second pass over the finished tree rather than being maintained
//! during the fold.

use crate::model::YearBucket;

/// Assigns `rank` to every month in `years`: 1 for the largest
/// `total_period`, counting up across all years.
///
/// Months are flattened in tree order (years outer, months inner) and
/// stably sorted, so equal totals keep their tree order and still get
/// distinct ranks. Year ranks are left at 0.
pub fn assign_month_ranks(years: &mut [YearBucket]) {
    let mut order: Vec<(usize, usize, f64)> = years
        .iter()
        .enumerate()
        .flat_map(|(y, year)| {
            year.months
                .iter()
                .enumerate()
                .map(move |(m, month)| (y, m, month.total_period))
        })
        .collect();

    // Vec::sort_by is stable; total_cmp keeps the order total even for NaN.
    order.sort_by(|a, b| b.2.total_cmp(&a.2));

    for (position, (y, m, _)) in order.into_iter().enumerate() {
        years[y].months[m].rank = position + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonthBucket;

    fn year(year_index: i32, totals: &[(u32, f64)]) -> YearBucket {
        let mut bucket = YearBucket::new(year_index);
        for &(month_index, total) in totals {
            let mut month = MonthBucket::new(year_index, month_index);
            month.total_period = total;
            bucket.total_period += total;
            bucket.months.push(month);
        }
        bucket
    }

    fn ranks(years: &[YearBucket]) -> Vec<(i32, u32, usize)> {
        years
            .iter()
            .flat_map(|y| y.months.iter().map(|m| (m.year_index, m.month_index, m.rank)))
            .collect()
    }

    #[test]
    fn test_ranks_span_all_years() {
        let mut years = vec![
            year(2024, &[(1, 200.0), (0, 50.0)]),
            year(2023, &[(11, 300.0)]),
        ];
        assign_month_ranks(&mut years);

        assert_eq!(
            ranks(&years),
            vec![(2024, 1, 2), (2024, 0, 3), (2023, 11, 1)]
        );
        assert!(years.iter().all(|y| y.rank == 0));
    }

    #[test]
    fn test_ties_keep_tree_order_and_distinct_ranks() {
        let mut years = vec![
            year(2024, &[(2, 10.0), (1, 10.0)]),
            year(2023, &[(11, 10.0)]),
        ];
        assign_month_ranks(&mut years);

        assert_eq!(
            ranks(&years),
            vec![(2024, 2, 1), (2024, 1, 2), (2023, 11, 3)]
        );
    }

    #[test]
    fn test_negative_totals_rank_last() {
        let mut years = vec![year(2024, &[(3, -500.0), (2, 0.0), (1, 12.5)])];
        assign_month_ranks(&mut years);

        assert_eq!(
            ranks(&years),
            vec![(2024, 3, 3), (2024, 2, 2), (2024, 1, 1)]
        );
    }

    #[test]
    fn test_nan_total_does_not_break_the_permutation() {
        let mut years = vec![year(2024, &[(0, 10.0), (1, f64::NAN), (2, -5.0), (3, 10.0)])];
        assign_month_ranks(&mut years);

        let mut got: Vec<usize> = years[0].months.iter().map(|m| m.rank).collect();
        got.sort_unstable();
        assert_eq!(got, vec![1, 2, 3, 4]);
        let months = &years[0].months;
        assert!(months[0].rank < months[3].rank);
        assert!(months[3].rank < months[2].rank);
    }

    #[test]
    fn test_no_months_is_a_no_op() {
        let mut years: Vec<YearBucket> = Vec::new();
        assign_month_ranks(&mut years);
        assert!(years.is_empty());
    }
}
