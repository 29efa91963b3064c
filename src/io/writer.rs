//! Apply reconciler-approved partitions to storage.
//!
//! Each year is its own failure domain: one failed write is recorded and the
//! remaining years are still attempted.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::domain::YearPartition;
use crate::error::PersistError;
use crate::io::yearly::PartitionStore;

#[derive(Debug)]
pub struct PersistenceFailure {
    pub year: i32,
    pub error: PersistError,
}

/// `(attempted, succeeded)` plus what went wrong.
#[derive(Debug, Default)]
pub struct WriteTally {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<PersistenceFailure>,
}

impl WriteTally {
    pub fn all_succeeded(&self) -> bool {
        self.attempted == self.succeeded
    }

    pub fn failed_years(&self) -> Vec<i32> {
        self.failures.iter().map(|f| f.year).collect()
    }
}

/// Write every partition, newest year first.
pub fn write_partitions(
    store: &dyn PartitionStore,
    partitions: &BTreeMap<i32, YearPartition>,
    written_at: NaiveDateTime,
) -> WriteTally {
    let mut tally = WriteTally::default();

    for (&year, partition) in partitions.iter().rev() {
        tally.attempted += 1;
        match store.save(partition, written_at) {
            Ok(()) => {
                tally.succeeded += 1;
                info!(year, records = partition.len(), "saved year");
            }
            Err(e) => {
                error!(year, error = %e, "failed to save year");
                tally.failures.push(PersistenceFailure { year, error: e });
            }
        }
    }

    tally
}
