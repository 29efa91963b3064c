//! Per-year storage: `LPR_Data_<year>.json` + `LPR_Data_<year>.csv`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::domain::{CSV_HEADER, RateRecord, YearFile, YearPartition};
use crate::error::PersistError;
use crate::io::atomic::{replace_file, replace_json};

const FILE_PREFIX: &str = "LPR_Data_";

/// Load/save access to persisted year partitions.
pub trait PartitionStore {
    /// Years that have a structured file on disk.
    fn stored_years(&self) -> Vec<i32>;

    /// A stored partition; `None` if missing or unreadable.
    fn load(&self, year: i32) -> Option<YearPartition>;

    /// Replace both files of one year.
    fn save(&self, partition: &YearPartition, written_at: NaiveDateTime) -> Result<(), PersistError>;

    /// Every readable stored partition.
    fn load_all(&self) -> BTreeMap<i32, YearPartition> {
        self.stored_years()
            .into_iter()
            .filter_map(|year| self.load(year).map(|p| (year, p)))
            .collect()
    }
}

/// Year files in one directory.
pub struct YearlyStore {
    dir: PathBuf,
}

impl YearlyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn json_path(&self, year: i32) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{year}.json"))
    }

    pub fn csv_path(&self, year: i32) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{year}.csv"))
    }
}

impl PartitionStore for YearlyStore {
    fn stored_years(&self) -> Vec<i32> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut years: Vec<i32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| year_from_file_name(&entry.file_name().to_string_lossy()))
            .collect();
        years.sort_unstable();
        years
    }

    fn load(&self, year: i32) -> Option<YearPartition> {
        let path = self.json_path(year);
        let file = File::open(&path).ok()?;

        let stored: YearFile = match serde_json::from_reader(file) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable year file");
                return None;
            }
        };
        if stored.year != year {
            warn!(path = %path.display(), stored = stored.year, "year file names a different year");
            return None;
        }

        let partition = YearPartition::from_stored(year, stored.data);
        match &partition {
            Some(p) => debug!(year, records = p.len(), "loaded stored year"),
            None => warn!(path = %path.display(), "ignoring year file with inconsistent records"),
        }
        partition
    }

    fn save(&self, partition: &YearPartition, written_at: NaiveDateTime) -> Result<(), PersistError> {
        let year = partition.year();
        let file = YearFile::from_partition(partition, written_at).ok_or(PersistError::EmptyPartition(year))?;

        write_rates_csv(&self.csv_path(year), partition.records())?;
        replace_json(&self.json_path(year), &file)?;
        Ok(())
    }
}

/// `LPR_Data_2024.json` -> `Some(2024)`.
fn year_from_file_name(name: &str) -> Option<i32> {
    name.strip_prefix(FILE_PREFIX)?.strip_suffix(".json")?.parse().ok()
}

/// Write the shared CSV layout, records in the order given.
pub fn write_rates_csv(path: &Path, records: &[RateRecord]) -> Result<(), PersistError> {
    replace_file(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(CSV_HEADER)?;
        for r in records {
            writer.write_record([r.date().to_string().as_str(), r.one_year_rate(), r.five_year_rate()])?;
        }
        writer.flush()?;
        Ok(())
    })
}
