//! The sequential update pipeline.
//!
//! freshness gate -> fetch -> table -> extract -> partition -> reconcile -> write
//!
//! Every fatal condition returns before the first write, so a failed fetch or
//! a page without the rate table leaves stored files untouched. Collaborators
//! are passed in so the whole run can be driven from fixtures.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::data::{Clock, Fetcher, find_marker_table};
use crate::domain::{AggregateDataset, RunMode, TABLE_MARKER};
use crate::error::{PersistError, PipelineError};
use crate::io::ingest::{Extraction, extract_records};
use crate::io::{PartitionStore, StateStore, WriteTally, write_partitions};
use crate::reconcile::{Reconciliation, classify, needs_refresh, partition_by_year};

/// Everything a run talks to outside of pure computation.
pub struct Collaborators<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub partitions: &'a dyn PartitionStore,
    pub state: &'a dyn StateStore,
    pub clock: &'a dyn Clock,
}

/// Result of a run that did not hit a fatal error.
#[derive(Debug)]
pub enum RunOutcome {
    /// Stored data is less than a day old; nothing was fetched.
    Skipped { last_updated: NaiveDateTime },
    Completed(RunSummary),
}

#[derive(Debug)]
pub struct RunSummary {
    pub mode: RunMode,
    pub ran_at: NaiveDateTime,
    pub extraction: Extraction,
    pub reconciliation: Reconciliation,
    pub tally: WriteTally,
    /// Set when the aggregate files could not be written.
    pub aggregate_error: Option<PersistError>,
}

impl RunSummary {
    /// True only if every required write completed.
    pub fn is_success(&self) -> bool {
        self.tally.all_succeeded() && self.aggregate_error.is_none()
    }
}

/// Run one update.
pub fn run_update(mode: RunMode, deps: &Collaborators<'_>) -> Result<RunOutcome, PipelineError> {
    let now = deps.clock.now();
    let force = mode.is_force();

    // 1) Freshness gate (force never reads stored state).
    let last_updated = if force {
        None
    } else {
        deps.state.load().map(|d| d.last_updated)
    };
    if let Some(ts) = last_updated {
        if !needs_refresh(Some(ts), now, force) {
            info!(last_updated = %ts, "stored data is fresh, skipping fetch");
            return Ok(RunOutcome::Skipped { last_updated: ts });
        }
    }

    // 2) Fetch and locate the table.
    let body = deps.fetcher.fetch()?;
    let rows = find_marker_table(&body, TABLE_MARKER)?;

    // 3) Extract records.
    let extraction = extract_records(&rows);
    if extraction.records.is_empty() {
        return Err(PipelineError::NoRecords {
            rows: extraction.rows_read,
        });
    }
    info!(
        records = extraction.records.len(),
        skipped = extraction.skipped.len(),
        "extracted LPR records"
    );

    // 4) Partition and reconcile.
    let fetched = partition_by_year(&extraction.records);
    let existing = if force {
        BTreeMap::new()
    } else {
        deps.partitions.load_all()
    };
    let reconciliation = classify(&fetched, &existing, force);

    // 5) Write approved years, then always refresh the aggregate.
    let tally = write_partitions(deps.partitions, &reconciliation.to_write, now);

    let aggregate = AggregateDataset {
        last_updated: now,
        records: extraction.records.clone(),
    };
    let aggregate_error = match deps.state.save(&aggregate, &extraction.raw_lines) {
        Ok(()) => None,
        Err(e) => {
            error!(error = %e, "failed to save aggregate files");
            Some(e)
        }
    };

    Ok(RunOutcome::Completed(RunSummary {
        mode,
        ran_at: now,
        extraction,
        reconciliation,
        tally,
        aggregate_error,
    }))
}
