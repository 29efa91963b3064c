use std::collections::BTreeMap;

use crate::domain::{RateRecord, YearPartition};

/// Group records by calendar year, each year sorted newest first.
pub fn partition_by_year(records: &[RateRecord]) -> BTreeMap<i32, YearPartition> {
    let mut by_year: BTreeMap<i32, Vec<RateRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year()).or_default().push(record.clone());
    }
    by_year
        .into_iter()
        .map(|(year, records)| (year, YearPartition::new(year, records)))
        .collect()
}
