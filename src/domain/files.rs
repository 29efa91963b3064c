//! Persisted file schemas and timestamp handling.
//!
//! These layouts are a stable contract with downstream readers; field names and
//! order must not change.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{RateRecord, YearPartition};

/// Column header shared by the aggregate and per-year CSV files.
pub const CSV_HEADER: [&str; 3] = ["Date", "OneYearLPR(%)", "FiveYearLPR(%)"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Render a write timestamp (local, ISO-8601, microsecond precision).
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts naive ISO-8601 or RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

/// Full cross-year snapshot used for the freshness check.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateDataset {
    pub last_updated: NaiveDateTime,
    pub records: Vec<RateRecord>,
}

/// `LPR_Data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateFile {
    pub last_updated: String,
    pub data: Vec<RateRecord>,
}

impl AggregateFile {
    pub fn from_dataset(dataset: &AggregateDataset) -> Self {
        Self {
            last_updated: format_timestamp(dataset.last_updated),
            data: dataset.records.clone(),
        }
    }

    /// Convert back to a dataset; `None` if the timestamp is unreadable.
    pub fn into_dataset(self) -> Option<AggregateDataset> {
        let last_updated = parse_timestamp(&self.last_updated)?;
        Some(AggregateDataset {
            last_updated,
            records: self.data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// `LPR_Data_<year>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearFile {
    pub year: i32,
    pub total_records: usize,
    pub date_range: DateRange,
    pub last_updated: String,
    pub data: Vec<RateRecord>,
}

impl YearFile {
    /// `None` for an empty partition: there is no date range to report.
    pub fn from_partition(partition: &YearPartition, written_at: NaiveDateTime) -> Option<Self> {
        let (start, end) = partition.date_range()?;
        Some(Self {
            year: partition.year(),
            total_records: partition.len(),
            date_range: DateRange { start, end },
            last_updated: format_timestamp(written_at),
            data: partition.records().to_vec(),
        })
    }
}
