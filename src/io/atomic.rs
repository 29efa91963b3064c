//! Whole-file replacement.
//!
//! Content is written to a temp file next to the target and renamed over it,
//! so readers see either the previous file or the complete new one.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::PersistError;

/// Replace `path` with whatever `write` produces.
pub fn replace_file<F>(path: &Path, write: F) -> Result<(), PersistError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), PersistError>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write(&mut out)?;
        out.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Write a value as pretty-printed JSON.
pub fn replace_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    replace_file(path, |out| {
        serde_json::to_writer_pretty(&mut *out, value)?;
        out.write_all(b"\n")?;
        Ok(())
    })
}
