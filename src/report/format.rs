//! Human-readable run output.
//!
//! Kept apart from the pipeline so wording changes stay local.

use chrono::NaiveDateTime;

use crate::app::pipeline::RunSummary;
use crate::domain::{ReconciliationDecision, RunMode};

pub fn format_run_header(mode: RunMode, now: NaiveDateTime) -> String {
    let mode = match mode {
        RunMode::Auto => "auto",
        RunMode::Force => "force",
        RunMode::IncrementalOnly => "incremental-only",
    };
    format!("=== lpr - LPR history sync ===\nRun: {} | mode: {mode}", now.format("%Y-%m-%d %H:%M:%S"))
}

pub fn format_skipped(last_updated: NaiveDateTime) -> String {
    format!(
        "Data is up to date (last updated {}); nothing to do.\nUse --force to rewrite every year.",
        last_updated.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Format the per-year decisions and write tally.
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    let ex = &summary.extraction;
    out.push_str(&format!(
        "Rows: read={} | records={} | skipped={} (rejected={})\n",
        ex.rows_read,
        ex.records.len(),
        ex.skipped.len(),
        ex.rejected().count()
    ));
    for skip in ex.rejected() {
        out.push_str(&format!("  row {}: {}\n", skip.row, skip.reason));
    }

    out.push_str("\nYears:\n");
    for d in &summary.reconciliation.decisions {
        let marker = if d.decision.requires_write() { "*" } else { " " };
        out.push_str(&format!("{marker} {} {}\n", d.year, d.decision));
    }

    let rec = &summary.reconciliation;
    out.push_str(&format!(
        "\nNew: {} | changed: {} | unchanged: {}\n",
        rec.count(|d| matches!(d, ReconciliationDecision::New)),
        rec.count(|d| matches!(d, ReconciliationDecision::Changed(_))),
        rec.count(|d| matches!(d, ReconciliationDecision::Unchanged)),
    ));

    let tally = &summary.tally;
    out.push_str(&format!(
        "Years written: {}/{} (failed: {})\n",
        tally.succeeded,
        tally.attempted,
        tally.attempted - tally.succeeded
    ));
    for f in &tally.failures {
        out.push_str(&format!("  {}: {}\n", f.year, f.error));
    }

    match &summary.aggregate_error {
        None => out.push_str("Aggregate: written\n"),
        Some(e) => out.push_str(&format!("Aggregate: FAILED ({e})\n")),
    }

    out.push_str(if summary.is_success() {
        "Result: OK"
    } else {
        "Result: FAILED"
    });
    out
}
