//! Record extraction from the raw rate table.
//!
//! Turns the flattened table (one `Vec<String>` of cell texts per row) into
//! validated `RateRecord`s.
//!
//! - **Row-level tolerance**: a bad row is skipped, never fatal
//! - **Diagnostics**: every skipped row is reported with its reason
//! - **Source order**: records come out in table order, no sorting here

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::RateRecord;
use crate::error::RecordError;

/// First-cell labels that mark a header row rather than data.
pub const HEADER_LABELS: [&str; 4] = ["Date", "Term", "日期", "期限"];

const MIN_CELLS: usize = 3;

/// Why a table row produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than three cells.
    ShortRow { cells: usize },
    /// First cell is a header label.
    HeaderRow,
    /// Date or rate failed validation.
    Invalid(RecordError),
    /// Same date as an earlier row; the earlier row wins.
    DuplicateDate(NaiveDate),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ShortRow { cells } => write!(f, "only {cells} cell(s)"),
            SkipReason::HeaderRow => write!(f, "header row"),
            SkipReason::Invalid(err) => write!(f, "{err}"),
            SkipReason::DuplicateDate(date) => write!(f, "duplicate date {date}"),
        }
    }
}

/// A row that was dropped, with its 1-based position in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSkip {
    pub row: usize,
    pub reason: SkipReason,
}

/// Extractor output.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<RateRecord>,
    /// Every row's cells joined by a space, in table order.
    pub raw_lines: Vec<String>,
    pub skipped: Vec<RowSkip>,
    pub rows_read: usize,
}

impl Extraction {
    /// Rows that looked like data but failed validation or repeated a date.
    pub fn rejected(&self) -> impl Iterator<Item = &RowSkip> {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::Invalid(_) | SkipReason::DuplicateDate(_)))
    }
}

/// Extract rate records from table rows.
pub fn extract_records(rows: &[Vec<String>]) -> Extraction {
    let mut out = Extraction::default();
    let mut seen = HashSet::new();

    for (idx, cells) in rows.iter().enumerate() {
        if cells.is_empty() {
            continue;
        }
        let row = idx + 1;
        out.rows_read += 1;
        out.raw_lines.push(cells.join(" "));

        let result = parse_row(cells).and_then(|record| {
            if seen.insert(record.date()) {
                Ok(record)
            } else {
                Err(SkipReason::DuplicateDate(record.date()))
            }
        });

        match result {
            Ok(record) => out.records.push(record),
            Err(reason) => {
                debug!(row, %reason, "skipping table row");
                out.skipped.push(RowSkip { row, reason });
            }
        }
    }

    out
}

/// Classify a single row: data record or skip reason.
pub fn parse_row(cells: &[String]) -> Result<RateRecord, SkipReason> {
    if cells.len() < MIN_CELLS {
        return Err(SkipReason::ShortRow { cells: cells.len() });
    }
    let first = cells[0].trim();
    if HEADER_LABELS.contains(&first) {
        return Err(SkipReason::HeaderRow);
    }
    RateRecord::parse(first, &cells[1], &cells[2]).map_err(SkipReason::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn malformed_row_is_dropped_without_affecting_others() {
        let table = rows(&[
            &["LPR"],
            &["Date", "1Y", "5Y"],
            &["2024-11-20", "3.10%", "3.60%"],
            &["2024-10-21", "abc", "3.60"],
            &["2024-09-20", "3.35", "3.85"],
        ]);
        let ex = extract_records(&table);

        assert_eq!(ex.records.len(), 2);
        assert_eq!(ex.records[0].date().to_string(), "2024-11-20");
        assert_eq!(ex.records[1].date().to_string(), "2024-09-20");
        assert_eq!(ex.rows_read, 5);

        let reasons: Vec<_> = ex.skipped.iter().map(|s| (s.row, s.reason.clone())).collect();
        assert_eq!(
            reasons,
            vec![
                (1, SkipReason::ShortRow { cells: 1 }),
                (2, SkipReason::HeaderRow),
                (
                    4,
                    SkipReason::Invalid(RecordError::InvalidRate {
                        field: "one-year",
                        value: "abc".to_string()
                    })
                ),
            ]
        );
        assert_eq!(ex.rejected().count(), 1);
    }

    #[test]
    fn raw_lines_cover_every_row_in_source_order() {
        let table = rows(&[&["期限", "一年期", "五年期以上"], &["2024-11-20", "3.10", "3.60"], &["note"]]);
        let ex = extract_records(&table);
        assert_eq!(ex.raw_lines, vec!["期限 一年期 五年期以上", "2024-11-20 3.10 3.60", "note"]);
        assert_eq!(ex.records.len(), 1);
    }

    #[test]
    fn output_keeps_input_order() {
        let table = rows(&[&["2023-01-20", "3.65", "4.30"], &["2024-01-22", "3.45", "4.20"]]);
        let ex = extract_records(&table);
        let dates: Vec<_> = ex.records.iter().map(|r| r.date().to_string()).collect();
        assert_eq!(dates, ["2023-01-20", "2024-01-22"]);
    }

    #[test]
    fn repeated_date_keeps_first_occurrence() {
        let table = rows(&[&["2024-11-20", "3.10", "3.60"], &["2024-11-20", "3.00", "3.50"]]);
        let ex = extract_records(&table);
        assert_eq!(ex.records.len(), 1);
        assert_eq!(ex.records[0].one_year_rate(), "3.10");
        assert!(matches!(ex.skipped[0].reason, SkipReason::DuplicateDate(_)));
    }

    #[test]
    fn extra_cells_are_ignored() {
        let table = rows(&[&["2024-11-20", "3.10", "3.60", "footnote"]]);
        assert_eq!(extract_records(&table).records.len(), 1);
    }
}
