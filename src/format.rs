//! Number and label formatting for flow tables.
//!
//! The aggregation tree only ever carries raw `f64` totals. Everything here
//! is applied at render time by the report layer.

use chrono::Month;
use serde::Serialize;

/// Rounds to an integer and groups thousands with commas: `1234.5` → `"1,235"`.
pub fn format_thousands(value: f64) -> String {
    group_digits(value, 0)
}

/// Compact flow label. Magnitudes above 1000 are shown in thousands with a
/// `K` suffix, either rounded to an integer (`round = true`) or with at most
/// one decimal. Smaller values fall back to [`format_thousands`].
///
/// ```
/// use flowtable::format::format_flows;
/// assert_eq!(format_flows(1234.56, false), "1.2K");
/// assert_eq!(format_flows(-2500.0, true), "-2K");
/// assert_eq!(format_flows(655.3, false), "655");
/// ```
pub fn format_flows(flow: f64, round: bool) -> String {
    if flow.abs() > 1000.0 {
        let thousands = flow / 1000.0;
        if round {
            return format!("{}K", format_thousands(thousands));
        }
        let one_decimal = group_digits(thousands, 1);
        let trimmed = one_decimal.strip_suffix(".0").unwrap_or(&one_decimal);
        return format!("{}K", trimmed);
    }
    format_thousands(flow)
}

/// Rounds `n` to `x` decimal places, halves toward positive infinity
/// (`-1.25` → `-1.2`, `1.25` → `1.3`).
pub fn round_to_decimals(n: f64, x: u32) -> f64 {
    let factor = 10f64.powi(x as i32);
    (n * factor + 0.5).floor() / factor
}

fn group_digits(value: f64, decimals: usize) -> String {
    // `{:.N}` rounds half to even, so round first
    let rounded = round_to_decimals(value, decimals as u32);
    let rendered = format!("{:.*}", decimals, rounded.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(rendered.len() + int_part.len() / 3 + 1);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Full English month name for a 0-based month index.
pub fn month_name(month0: u32) -> Option<&'static str> {
    month0
        .checked_add(1)
        .and_then(|m| u8::try_from(m).ok())
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
}

/// Short month label used on month rows, e.g. `"Jan 24"`.
pub fn month_label(month0: u32, year: i32) -> String {
    let name = month_name(month0).unwrap_or("???");
    format!("{} {:02}", &name[..3], year.rem_euclid(100))
}

/// Direction of a day's total, used for color coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowSign {
    Inflow,
    Outflow,
    Flat,
}

impl FlowSign {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            FlowSign::Inflow
        } else if value < 0.0 {
            FlowSign::Outflow
        } else {
            FlowSign::Flat
        }
    }
}
