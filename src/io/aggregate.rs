//! Cross-year aggregate: `LPR_Data.json`, `LPR_Data.csv`, `LPR_Data.txt`.
//!
//! The JSON timestamp doubles as the state consulted by the freshness gate.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::{AggregateDataset, AggregateFile};
use crate::error::PersistError;
use crate::io::atomic::{replace_file, replace_json};
use crate::io::yearly::write_rates_csv;

/// Persisted aggregate snapshot.
pub trait StateStore {
    /// `None` when nothing is stored or the stored file cannot be read.
    fn load(&self) -> Option<AggregateDataset>;

    fn save(&self, dataset: &AggregateDataset, raw_lines: &[String]) -> Result<(), PersistError>;
}

pub struct AggregateStore {
    dir: PathBuf,
}

impl AggregateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join("LPR_Data.json")
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join("LPR_Data.csv")
    }

    pub fn text_path(&self) -> PathBuf {
        self.dir.join("LPR_Data.txt")
    }
}

impl StateStore for AggregateStore {
    fn load(&self) -> Option<AggregateDataset> {
        let path = self.json_path();
        let file = File::open(&path).ok()?;
        let stored: AggregateFile = match serde_json::from_reader(file) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable aggregate file");
                return None;
            }
        };

        let dataset = stored.into_dataset();
        if dataset.is_none() {
            warn!(path = %path.display(), "aggregate file has an unreadable timestamp");
        }
        dataset
    }

    fn save(&self, dataset: &AggregateDataset, raw_lines: &[String]) -> Result<(), PersistError> {
        write_raw_lines(&self.text_path(), raw_lines)?;

        let mut sorted = dataset.records.clone();
        sorted.sort_by(|a, b| b.date().cmp(&a.date()));
        write_rates_csv(&self.csv_path(), &sorted)?;

        // JSON last: its timestamp marks the snapshot as complete.
        replace_json(&self.json_path(), &AggregateFile::from_dataset(dataset))?;
        Ok(())
    }
}

fn write_raw_lines(path: &Path, lines: &[String]) -> Result<(), PersistError> {
    replace_file(path, |out| {
        out.write_all(lines.join("\n").as_bytes())?;
        Ok(())
    })
}
