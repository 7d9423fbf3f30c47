use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use scrape_logging::scrape_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::record::DetailRecord;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("dataset name {0:?} is not a plain file name")]
    DatasetName(String),
    #[error("cannot serialise dataset: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Writes `records` as a pretty JSON array to `{dir}/{name}.json`.
pub fn write_dataset(
    dir: &Path,
    name: &str,
    records: &[DetailRecord],
) -> Result<PathBuf, PersistError> {
    let stem = name.trim();
    if stem.is_empty() || stem.contains(['/', '\\']) || stem == "." || stem == ".." {
        return Err(PersistError::DatasetName(name.to_string()));
    }
    let json = serde_json::to_string_pretty(records)?;
    let path = AtomicFileWriter::new(dir.to_path_buf()).write(&format!("{stem}.json"), &json)?;
    scrape_info!("Wrote {} records to {}", records.len(), path.display());
    Ok(path)
}
