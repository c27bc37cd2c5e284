//! Raw daily series readers.
//!
//! JSON input is an array of row objects (`{"Date": ..., "<TICKER>": ...,
//! "Total": ..., "rank": ...}`). CSV input has a header row with `Date`,
//! `Total`, an optional `Rank` column and one column per instrument, which is
//! also the shape written by `Report::write_csv`.
//!
//! Dates are carried through as text. They are parsed, and rejected, by
//! `Aggregator::build`.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::DailyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesFormat {
    Json,
    Csv,
}

impl SeriesFormat {
    /// `.csv` files are CSV; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => SeriesFormat::Csv,
            _ => SeriesFormat::Json,
        }
    }
}

/// Reads a series file, picking the format from its extension.
pub fn load_series(path: &Path) -> Result<Vec<DailyRecord>> {
    let file = std::fs::File::open(path)?;
    let records = read_series(file, SeriesFormat::from_path(path))?;
    debug!(path = %path.display(), records = records.len(), "series loaded");
    Ok(records)
}

pub fn read_series<R: Read>(reader: R, format: SeriesFormat) -> Result<Vec<DailyRecord>> {
    match format {
        SeriesFormat::Json => Ok(serde_json::from_reader(reader)?),
        SeriesFormat::Csv => read_csv(reader),
    }
}

fn read_csv<R: Read>(reader: R) -> Result<Vec<DailyRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let date_col = find("Date").ok_or(Error::MissingColumn("Date"))?;
    let total_col = find("Total").ok_or(Error::MissingColumn("Total"))?;
    let rank_col = find("Rank");

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        let cell = |col: usize| row.get(col).unwrap_or("");

        let total = parse_flow(cell(total_col))
            .map_err(|value| invalid(line, &headers[total_col], value))?
            .ok_or(Error::MissingTotal { line })?;

        let daily_rank = match rank_col.map(cell) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| invalid(line, "Rank", raw))?,
        };

        let mut record = DailyRecord::new(cell(date_col), total).with_rank(daily_rank);
        for (col, ticker) in headers.iter().enumerate() {
            if col == date_col || col == total_col || Some(col) == rank_col {
                continue;
            }
            let flow = parse_flow(cell(col)).map_err(|value| invalid(line, ticker, value))?;
            if let Some(flow) = flow {
                record = record.with_flow(ticker, flow);
            }
        }
        records.push(record);
    }
    Ok(records)
}

fn invalid(line: u64, column: &str, value: &str) -> Error {
    Error::InvalidNumber {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}

/// Parses one flow cell. Empty cells and `-` are no flow; `(12.5)` is an
/// accounting-style negative; thousands separators are ignored.
fn parse_flow(raw: &str) -> std::result::Result<Option<f64>, &str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(None);
    }

    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let value: f64 = body.replace(',', "").parse().map_err(|_| raw)?;
    if !value.is_finite() {
        return Err(raw);
    }
    Ok(Some(if negative { -value } else { value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SeriesFormat::from_path(Path::new("flows.CSV")), SeriesFormat::Csv);
        assert_eq!(SeriesFormat::from_path(Path::new("flows.json")), SeriesFormat::Json);
        assert_eq!(SeriesFormat::from_path(Path::new("flows")), SeriesFormat::Json);
    }

    #[test]
    fn test_parse_flow_cells() {
        assert_eq!(parse_flow("111.7"), Ok(Some(111.7)));
        assert_eq!(parse_flow("(95.1)"), Ok(Some(-95.1)));
        assert_eq!(parse_flow("1,234.5"), Ok(Some(1234.5)));
        assert_eq!(parse_flow("-"), Ok(None));
        assert_eq!(parse_flow(""), Ok(None));
        assert_eq!(parse_flow("n/a"), Err("n/a"));
        assert_eq!(parse_flow("NaN"), Err("NaN"));
    }

    #[test]
    fn test_reads_json_array() {
        let json = r#"[
            {"Date": "2024-01-11", "IBIT": 111.7, "GBTC": -95.1, "Total": 655.3, "rank": 12},
            {"Date": "2024-01-12", "Total": -50}
        ]"#;
        let records = read_series(json.as_bytes(), SeriesFormat::Json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].flow("GBTC"), Some(-95.1));
        assert_eq!(records[1].total, -50.0);
        assert_eq!(records[1].daily_rank, 0);
    }

    #[test]
    fn test_reads_csv_with_accounting_negatives() {
        let csv = "Date,IBIT,GBTC,Total,Rank\n\
                   11 Jan 2024,111.7,(95.1),655.3,12\n\
                   12 Jan 2024,-,(50),(50),\n";
        let records = read_series(csv.as_bytes(), SeriesFormat::Csv).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "11 Jan 2024");
        assert_eq!(records[0].daily_rank, 12);
        assert_eq!(records[0].flow("GBTC"), Some(-95.1));
        assert_eq!(records[1].total, -50.0);
        assert_eq!(records[1].flow("IBIT"), None);
        assert!(!records[1].per_instrument.contains_key("IBIT"));
    }

    #[test]
    fn test_csv_without_total_column_is_rejected() {
        let csv = "Date,IBIT\n2024-01-11,1\n";
        assert!(matches!(
            read_series(csv.as_bytes(), SeriesFormat::Csv),
            Err(Error::MissingColumn("Total"))
        ));
    }

    #[test]
    fn test_csv_blank_total_cell_is_rejected() {
        let csv = "Date,IBIT,Total\n2024-01-11,100,\n";
        assert!(matches!(
            read_series(csv.as_bytes(), SeriesFormat::Csv),
            Err(Error::MissingTotal { line: 2 })
        ));

        let dashed = "Date,IBIT,Total\n2024-01-11,100,1\n2024-01-12,50,-\n";
        assert!(matches!(
            read_series(dashed.as_bytes(), SeriesFormat::Csv),
            Err(Error::MissingTotal { line: 3 })
        ));
    }

    #[test]
    fn test_csv_bad_number_names_line_and_column() {
        let csv = "Date,IBIT,Total\n2024-01-11,1,1\n2024-01-12,lots,1\n";
        match read_series(csv.as_bytes(), SeriesFormat::Csv) {
            Err(Error::InvalidNumber { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "IBIT");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }
}
