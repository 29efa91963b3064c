//! Per-year change detection.
//!
//! When record counts match, only the newest record of the year is compared.
//! The source appends new fixing dates and does not revise published ones, so
//! a revision to an older record inside an otherwise unchanged year is not
//! detected here; `--force` rewrites everything when that matters.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::domain::{ChangeReason, RateRecord, ReconciliationDecision, YearPartition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearDecision {
    pub year: i32,
    pub decision: ReconciliationDecision,
}

/// Decisions for every year seen plus the partitions that must be written.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Newest year first.
    pub decisions: Vec<YearDecision>,
    pub to_write: BTreeMap<i32, YearPartition>,
}

impl Reconciliation {
    pub fn count(&self, pred: impl Fn(&ReconciliationDecision) -> bool) -> usize {
        self.decisions.iter().filter(|d| pred(&d.decision)).count()
    }
}

/// Partitions that must be (re)written.
pub fn reconcile(
    fetched: &BTreeMap<i32, YearPartition>,
    existing: &BTreeMap<i32, YearPartition>,
    force: bool,
) -> BTreeMap<i32, YearPartition> {
    classify(fetched, existing, force).to_write
}

/// Classify every year in `fetched ∪ existing`.
///
/// Under `force` stored data is ignored and every fetched year is written.
pub fn classify(
    fetched: &BTreeMap<i32, YearPartition>,
    existing: &BTreeMap<i32, YearPartition>,
    force: bool,
) -> Reconciliation {
    let mut out = Reconciliation::default();

    if force {
        for (&year, partition) in fetched.iter().rev() {
            out.decisions.push(YearDecision {
                year,
                decision: ReconciliationDecision::Changed(ChangeReason::Forced),
            });
            out.to_write.insert(year, partition.clone());
        }
        info!(years = out.to_write.len(), "force mode: rewriting every fetched year");
        return out;
    }

    let years: BTreeSet<i32> = fetched.keys().chain(existing.keys()).copied().collect();
    for year in years.into_iter().rev() {
        // A stored year the source no longer lists counts as zero fetched
        // records. The empty partition is refused by the store, so the stored
        // files stay put and the year surfaces as a write failure.
        let new = fetched
            .get(&year)
            .cloned()
            .unwrap_or_else(|| YearPartition::new(year, Vec::new()));
        if new.is_empty() {
            warn!(year, "stored year absent from fetched table");
        }

        let decision = decide(&new, existing.get(&year));
        info!(year, %decision, "reconciled year");
        if decision.requires_write() {
            out.to_write.insert(year, new);
        }
        out.decisions.push(YearDecision { year, decision });
    }

    out
}

/// Compare one fetched year against its stored counterpart.
pub fn decide(fetched: &YearPartition, existing: Option<&YearPartition>) -> ReconciliationDecision {
    let Some(existing) = existing else {
        return ReconciliationDecision::New;
    };

    if fetched.len() != existing.len() {
        return ReconciliationDecision::Changed(ChangeReason::RecordCount {
            existing: existing.len(),
            fetched: fetched.len(),
        });
    }

    match (fetched.newest(), existing.newest()) {
        (Some(new), Some(old)) if !same_record(new, old) => {
            ReconciliationDecision::Changed(ChangeReason::NewestRecord {
                existing: old.date(),
                fetched: new.date(),
            })
        }
        _ => ReconciliationDecision::Unchanged,
    }
}

fn same_record(a: &RateRecord, b: &RateRecord) -> bool {
    a.date() == b.date() && a.one_year_rate() == b.one_year_rate() && a.five_year_rate() == b.five_year_rate()
}
