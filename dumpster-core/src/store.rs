//! Sharded, atomically written record store
//!
//! Layout under the output directory:
//!
//! ```text
//! .sync-state.json
//! issues/<shard>/<number>.json
//! pull_requests/<shard>/<number>.json
//! discussions/<shard>/<number>.json
//! ```
//!
//! The shard is the first two digits of the record number (or the whole
//! number below 10). Every document goes through a temporary sibling file
//! that is renamed into place, so readers see either the previous version
//! or the new one, never a partial write.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::kind::ResourceKind;
use crate::model::Record;
use crate::state::SyncState;
use crate::{Error, Result};

/// File name of the watermark document
pub const STATE_FILE: &str = ".sync-state.json";

const RECORD_EXTENSION: &str = "json";
const TEMP_PREFIX: &str = ".tmp-";

/// Record store rooted at an output directory
#[derive(Debug, Clone)]
pub struct RecordStore {
    base_dir: PathBuf,
}

impl RecordStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the per-kind directories; safe to call repeatedly
    pub fn ensure_layout(&self) -> Result<()> {
        for kind in ResourceKind::ALL {
            fs::create_dir_all(self.kind_dir(kind)).map_err(|source| Error::Layout { source })?;
        }
        Ok(())
    }

    fn kind_dir(&self, kind: ResourceKind) -> PathBuf {
        self.base_dir.join(kind.dir_name())
    }

    fn state_path(&self) -> PathBuf {
        self.base_dir.join(STATE_FILE)
    }

    /// Path a record of `kind` with `number` is stored at
    pub fn record_path(&self, kind: ResourceKind, number: u64) -> PathBuf {
        self.kind_dir(kind)
            .join(shard_for(number))
            .join(format!("{}.{}", number, RECORD_EXTENSION))
    }

    /// Persist one record document, replacing any previous version
    pub fn save<T: Serialize>(&self, kind: ResourceKind, number: u64, doc: &T) -> Result<PathBuf> {
        let path = self.record_path(kind, number);
        write_json_atomic(&path, doc).map_err(|source| Error::Save {
            kind,
            number,
            source,
        })?;
        debug!(%kind, number, path = %path.display(), "Saved record");
        Ok(path)
    }

    /// Persist a record under its own kind and number
    pub fn save_record(&self, record: &Record) -> Result<PathBuf> {
        self.save(record.kind(), record.number(), record)
    }

    /// Load the watermark document; a missing file yields empty state
    pub fn load_state(&self) -> Result<SyncState> {
        let path = self.state_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No sync state yet");
                return Ok(SyncState::default());
            }
            Err(source) => {
                return Err(Error::State {
                    action: "read",
                    path,
                    source,
                })
            }
        };

        serde_json::from_slice(&data).map_err(|source| Error::StateFormat { path, source })
    }

    /// Persist the watermark document
    pub fn save_state(&self, state: &SyncState) -> Result<()> {
        let path = self.state_path();
        write_json_atomic(&path, state).map_err(|source| Error::State {
            action: "write",
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), ?state, "Saved sync state");
        Ok(())
    }

    /// Number of record files stored for `kind`
    pub fn count_records(&self, kind: ResourceKind) -> Result<usize> {
        let dir = self.kind_dir(kind);
        if !dir.exists() {
            return Ok(0);
        }

        let mut count = 0;
        for shard in fs::read_dir(&dir)? {
            let shard = shard?;
            if !shard.file_type()?.is_dir() {
                continue;
            }
            for entry in fs::read_dir(shard.path())? {
                let path = entry?.path();
                let is_record = path.extension().is_some_and(|ext| ext == RECORD_EXTENSION)
                    && !path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(TEMP_PREFIX));
                if is_record {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

/// Shard directory name for a record number
pub fn shard_for(number: u64) -> String {
    let digits = number.to_string();
    if digits.len() < 2 {
        digits
    } else {
        digits[..2].to_string()
    }
}

/// Serialize `value` as indented JSON and move it into place atomically
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');

    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other(format!("path has no parent: {}", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
