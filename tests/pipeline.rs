//! End-to-end runs against temp directories with a canned page and a fixed clock.

use std::fs;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lpr_sync::app::pipeline::{Collaborators, RunOutcome, RunSummary, run_update};
use lpr_sync::data::{Fetcher, FixedClock};
use lpr_sync::domain::{AggregateDataset, RunMode};
use lpr_sync::error::{PersistError, PipelineError};
use lpr_sync::io::{AggregateStore, PartitionStore, StateStore, YearlyStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct StaticPage(String);

impl Fetcher for StaticPage {
    fn fetch(&self) -> Result<String, PipelineError> {
        Ok(self.0.clone())
    }
}

struct Unreachable;

impl Fetcher for Unreachable {
    fn fetch(&self) -> Result<String, PipelineError> {
        Err(PipelineError::Fetch("request failed with status 503 Service Unavailable".to_string()))
    }
}

fn page(rows: &[(&str, &str, &str)]) -> StaticPage {
    let mut html = String::from(
        "<html><body><table><tr><td>menu</td></tr></table>\
         <table><tr><th colspan=\"3\">贷款市场报价利率（LPR）</th></tr>\
         <tr><th>日期</th><th>1年期LPR</th><th>5年期以上LPR</th></tr>",
    );
    for (date, one, five) in rows {
        html.push_str(&format!("<tr><td>{date}</td><td>{one}%</td><td>{five}%</td></tr>"));
    }
    html.push_str("</table></body></html>");
    StaticPage(html)
}

const BASE_ROWS: [(&str, &str, &str); 4] = [
    ("2024-11-20", "3.10", "3.60"),
    ("2024-10-21", "3.10", "3.60"),
    ("2023-12-20", "3.45", "4.20"),
    ("2023-11-20", "3.45", "4.20"),
];

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
}

struct Workspace {
    _dir: TempDir,
    yearly: YearlyStore,
    aggregate: AggregateStore,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let yearly = YearlyStore::new(dir.path().join("yearly_data"));
        let aggregate = AggregateStore::new(dir.path());
        Self {
            _dir: dir,
            yearly,
            aggregate,
        }
    }

    fn run(&self, fetcher: &dyn Fetcher, now: NaiveDateTime, mode: RunMode) -> Result<RunOutcome, PipelineError> {
        let clock = FixedClock(now);
        let deps = Collaborators {
            fetcher,
            partitions: &self.yearly,
            state: &self.aggregate,
            clock: &clock,
        };
        run_update(mode, &deps)
    }

    fn year_stamp(&self, year: i32) -> String {
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(self.yearly.json_path(year)).unwrap()).unwrap();
        json["last_updated"].as_str().unwrap().to_string()
    }
}

fn completed(outcome: RunOutcome) -> RunSummary {
    match outcome {
        RunOutcome::Completed(summary) => summary,
        RunOutcome::Skipped { .. } => panic!("expected a completed run"),
    }
}

#[test]
fn first_run_writes_every_year_and_the_aggregate() {
    let ws = Workspace::new();
    let summary = completed(ws.run(&page(&BASE_ROWS), at(21, 9), RunMode::Auto).unwrap());

    assert!(summary.is_success());
    assert_eq!((summary.tally.attempted, summary.tally.succeeded), (2, 2));
    assert_eq!(ws.yearly.stored_years(), vec![2023, 2024]);
    assert_eq!(ws.yearly.load(2024).unwrap().len(), 2);

    let stored = ws.aggregate.load().unwrap();
    assert_eq!(stored.last_updated, at(21, 9));
    assert_eq!(stored.records.len(), 4);

    let raw = fs::read_to_string(ws.aggregate.text_path()).unwrap();
    assert_eq!(raw.lines().count(), 6);
    assert!(raw.starts_with("贷款市场报价利率（LPR）\n日期 1年期LPR 5年期以上LPR\n2024-11-20 3.10% 3.60%"));
}

#[test]
fn fresh_data_skips_the_fetch() {
    let ws = Workspace::new();
    ws.run(&page(&BASE_ROWS), at(21, 9), RunMode::Auto).unwrap();

    // The unreachable source proves no fetch happened.
    let outcome = ws.run(&Unreachable, at(21, 9) + Duration::hours(23), RunMode::Auto).unwrap();
    assert!(matches!(outcome, RunOutcome::Skipped { last_updated } if last_updated == at(21, 9)));

    let outcome = ws.run(&Unreachable, at(21, 10), RunMode::IncrementalOnly).unwrap();
    assert!(matches!(outcome, RunOutcome::Skipped { .. }));
}

#[test]
fn rerun_with_identical_data_writes_no_years() {
    let ws = Workspace::new();
    ws.run(&page(&BASE_ROWS), at(20, 9), RunMode::Auto).unwrap();

    let summary = completed(ws.run(&page(&BASE_ROWS), at(22, 9), RunMode::Auto).unwrap());

    assert!(summary.is_success());
    assert_eq!(summary.tally.attempted, 0);
    assert!(summary.reconciliation.to_write.is_empty());
    assert_eq!(ws.year_stamp(2024), "2024-11-20T09:00:00.000000");
    // The aggregate is refreshed regardless.
    assert_eq!(ws.aggregate.load().unwrap().last_updated, at(22, 9));
}

#[test]
fn appended_day_rewrites_only_its_year() {
    let ws = Workspace::new();
    ws.run(&page(&BASE_ROWS), at(20, 9), RunMode::Auto).unwrap();

    let mut rows = vec![("2024-11-21", "3.05", "3.55")];
    rows.extend(BASE_ROWS);
    let summary = completed(ws.run(&page(&rows), at(22, 9), RunMode::Auto).unwrap());

    assert_eq!(summary.reconciliation.to_write.keys().copied().collect::<Vec<_>>(), vec![2024]);
    let y2024 = ws.yearly.load(2024).unwrap();
    assert_eq!(y2024.len(), 3);
    assert_eq!(y2024.newest().unwrap().date().to_string(), "2024-11-21");
    assert_eq!(ws.year_stamp(2024), "2024-11-22T09:00:00.000000");
    assert_eq!(ws.year_stamp(2023), "2024-11-20T09:00:00.000000");

    let csv = fs::read_to_string(ws.yearly.csv_path(2024)).unwrap();
    assert_eq!(csv.lines().nth(1), Some("2024-11-21,3.05,3.55"));
}

#[test]
fn force_rewrites_fresh_identical_data() {
    let ws = Workspace::new();
    ws.run(&page(&BASE_ROWS), at(21, 9), RunMode::Auto).unwrap();

    let summary = completed(ws.run(&page(&BASE_ROWS), at(21, 10), RunMode::Force).unwrap());

    assert_eq!(summary.tally.attempted, 2);
    assert_eq!(ws.year_stamp(2023), "2024-11-21T10:00:00.000000");
}

#[test]
fn fetch_failure_writes_nothing() {
    let ws = Workspace::new();
    let err = ws.run(&Unreachable, at(21, 9), RunMode::Auto).unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)));
    assert!(!ws.aggregate.json_path().exists());
    assert!(!ws.yearly.dir().exists());
}

#[test]
fn page_without_rate_table_keeps_previous_state() {
    let ws = Workspace::new();
    ws.run(&page(&BASE_ROWS), at(20, 9), RunMode::Auto).unwrap();
    let before = fs::read_to_string(ws.aggregate.json_path()).unwrap();

    let maintenance = StaticPage("<html><body><table><tr><td>维护中</td></tr></table></body></html>".into());
    let err = ws.run(&maintenance, at(22, 9), RunMode::Auto).unwrap_err();

    assert!(matches!(err, PipelineError::TableNotFound { .. }));
    assert_eq!(fs::read_to_string(ws.aggregate.json_path()).unwrap(), before);
}

#[test]
fn table_with_no_valid_rows_is_fatal() {
    let ws = Workspace::new();
    let err = ws.run(&page(&[("soon", "-", "-")]), at(21, 9), RunMode::Auto).unwrap_err();
    assert!(matches!(err, PipelineError::NoRecords { rows: 3 }));
    assert!(!ws.aggregate.json_path().exists());
}

#[test]
fn malformed_row_is_skipped_and_reported() {
    let ws = Workspace::new();
    let mut rows = BASE_ROWS.to_vec();
    rows.insert(1, ("2024-11-01", "n/a", "3.60"));

    let summary = completed(ws.run(&page(&rows), at(21, 9), RunMode::Auto).unwrap());

    assert!(summary.is_success());
    assert_eq!(summary.extraction.records.len(), 4);
    assert_eq!(summary.extraction.rejected().count(), 1);
}

#[test]
fn unwritable_year_directory_fails_the_run_but_not_the_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("yearly_data");
    fs::write(&blocker, "not a directory").unwrap();

    let yearly = YearlyStore::new(&blocker);
    let aggregate = AggregateStore::new(dir.path());
    let clock = FixedClock(at(21, 9));
    let fetcher = page(&BASE_ROWS);
    let deps = Collaborators {
        fetcher: &fetcher,
        partitions: &yearly,
        state: &aggregate,
        clock: &clock,
    };

    let summary = completed(run_update(RunMode::Auto, &deps).unwrap());

    assert!(!summary.is_success());
    assert_eq!((summary.tally.attempted, summary.tally.succeeded), (2, 0));
    assert_eq!(summary.tally.failed_years(), vec![2024, 2023]);
    assert!(summary.aggregate_error.is_none());
    assert!(aggregate.json_path().exists());
}

#[test]
fn year_dropped_by_the_source_keeps_its_files_and_fails_the_run() {
    let ws = Workspace::new();
    ws.run(&page(&BASE_ROWS), at(20, 9), RunMode::Auto).unwrap();
    let json_before = fs::read_to_string(ws.yearly.json_path(2023)).unwrap();
    let csv_before = fs::read_to_string(ws.yearly.csv_path(2023)).unwrap();

    let summary = completed(ws.run(&page(&BASE_ROWS[..2]), at(22, 9), RunMode::Auto).unwrap());

    assert!(!summary.is_success());
    assert_eq!(summary.tally.failed_years(), vec![2023]);
    assert!(matches!(summary.tally.failures[0].error, PersistError::EmptyPartition(2023)));
    assert_eq!(fs::read_to_string(ws.yearly.json_path(2023)).unwrap(), json_before);
    assert_eq!(fs::read_to_string(ws.yearly.csv_path(2023)).unwrap(), csv_before);
}

/// Aggregate store whose writes always fail.
struct ReadOnlyState;

impl StateStore for ReadOnlyState {
    fn load(&self) -> Option<AggregateDataset> {
        None
    }

    fn save(&self, _dataset: &AggregateDataset, _raw_lines: &[String]) -> Result<(), PersistError> {
        Err(PersistError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }
}

#[test]
fn aggregate_write_failure_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let yearly = YearlyStore::new(dir.path().join("yearly_data"));
    let clock = FixedClock(at(21, 9));
    let fetcher = page(&BASE_ROWS);
    let deps = Collaborators {
        fetcher: &fetcher,
        partitions: &yearly,
        state: &ReadOnlyState,
        clock: &clock,
    };

    let summary = completed(run_update(RunMode::Auto, &deps).unwrap());

    assert!(summary.tally.all_succeeded());
    assert!(matches!(summary.aggregate_error, Some(PersistError::Io(_))));
    assert!(!summary.is_success());
    assert_eq!(yearly.stored_years(), vec![2023, 2024]);
}
