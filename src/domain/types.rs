//! Core rate types.
//!
//! `RateRecord` can only be built through validated construction, so any value
//! of the type carries a real calendar date and two parseable rates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Date format used by the source table and every persisted file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One published day of LPR quotes.
///
/// Rates keep the source formatting (`"3.45"` stays `"3.45"`, never `3.4500`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRateRecord")]
pub struct RateRecord {
    date: NaiveDate,
    one_year_rate: String,
    five_year_rate: String,
}

/// Unvalidated shape of a stored record.
#[derive(Debug, Deserialize)]
struct RawRateRecord {
    date: String,
    one_year_rate: String,
    five_year_rate: String,
}

impl TryFrom<RawRateRecord> for RateRecord {
    type Error = RecordError;

    fn try_from(raw: RawRateRecord) -> Result<Self, Self::Error> {
        RateRecord::parse(&raw.date, &raw.one_year_rate, &raw.five_year_rate)
    }
}

impl RateRecord {
    /// Build a record from cell text.
    ///
    /// A trailing `%` on either rate is stripped before validation.
    pub fn parse(date: &str, one_year_rate: &str, five_year_rate: &str) -> Result<Self, RecordError> {
        let date_text = date.trim();
        let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT)
            .map_err(|_| RecordError::InvalidDate(date_text.to_string()))?;

        Ok(Self {
            date,
            one_year_rate: normalize_rate("one-year", one_year_rate)?,
            five_year_rate: normalize_rate("five-year", five_year_rate)?,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Calendar year of `date`; the partition key.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn one_year_rate(&self) -> &str {
        &self.one_year_rate
    }

    pub fn five_year_rate(&self) -> &str {
        &self.five_year_rate
    }
}

fn normalize_rate(field: &'static str, raw: &str) -> Result<String, RecordError> {
    let text = raw.trim().trim_end_matches('%').trim();
    // `NaN` and `inf` parse as f64 but are never real fixings.
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(text.to_string()),
        _ => Err(RecordError::InvalidRate {
            field,
            value: raw.trim().to_string(),
        }),
    }
}

/// All records of one calendar year, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPartition {
    year: i32,
    records: Vec<RateRecord>,
}

impl YearPartition {
    /// Build a partition, sorting records by date descending.
    ///
    /// Callers are responsible for only passing records of `year`; use
    /// [`YearPartition::from_stored`] for data that has not been checked.
    pub fn new(year: i32, mut records: Vec<RateRecord>) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Self { year, records }
    }

    /// Build a partition from previously persisted records.
    ///
    /// Returns `None` if any record belongs to another year or a date repeats.
    pub fn from_stored(year: i32, records: Vec<RateRecord>) -> Option<Self> {
        if records.iter().any(|r| r.year() != year) {
            return None;
        }
        let partition = Self::new(year, records);
        let has_duplicates = partition
            .records
            .windows(2)
            .any(|pair| pair[0].date == pair[1].date);
        if has_duplicates {
            return None;
        }
        Some(partition)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent record of the year.
    pub fn newest(&self) -> Option<&RateRecord> {
        self.records.first()
    }

    /// `(earliest, latest)` date present.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let latest = self.records.first()?.date;
        let earliest = self.records.last()?.date;
        Some((earliest, latest))
    }
}

/// Why a year has to be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeReason {
    /// Force mode: change detection was bypassed.
    Forced,
    /// The fetched year holds a different number of records.
    RecordCount { existing: usize, fetched: usize },
    /// Counts match but the newest record differs in date or rates.
    NewestRecord { existing: NaiveDate, fetched: NaiveDate },
}

impl std::fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeReason::Forced => write!(f, "forced"),
            ChangeReason::RecordCount { existing, fetched } => {
                write!(f, "record count {existing} -> {fetched}")
            }
            ChangeReason::NewestRecord { existing, fetched } if existing == fetched => {
                write!(f, "newest record {fetched} revised")
            }
            ChangeReason::NewestRecord { existing, fetched } => {
                write!(f, "newest record {existing} -> {fetched}")
            }
        }
    }
}

/// Outcome of comparing one year of fetched data with what is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationDecision {
    Unchanged,
    Changed(ChangeReason),
    New,
}

impl ReconciliationDecision {
    pub fn requires_write(&self) -> bool {
        !matches!(self, ReconciliationDecision::Unchanged)
    }
}

impl std::fmt::Display for ReconciliationDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconciliationDecision::Unchanged => write!(f, "unchanged"),
            ReconciliationDecision::Changed(reason) => write!(f, "changed ({reason})"),
            ReconciliationDecision::New => write!(f, "new"),
        }
    }
}
