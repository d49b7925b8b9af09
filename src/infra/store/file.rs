//! File-backed snapshot store.
//!
//! The whole hospital state is written as one JSON document. A commit writes a sibling
//! temp file and renames it over the snapshot, so readers see either the old or the new
//! state, never a torn write.

use std::fs::{create_dir_all, rename, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::{AdmissionStore, HospitalSnapshot, SchedulerError};

/// JSON snapshot persisted under `dir/<stream>.json`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    stream: String,
}

impl FileStore {
    /// Create a store rooted at `path`, creating the directory when missing.
    pub fn new(path: impl AsRef<Path>, stream: impl Into<String>) -> Result<Self, SchedulerError> {
        let path = path.as_ref().to_path_buf();
        create_dir_all(&path).map_err(|e| SchedulerError::Backend(e.to_string()))?;
        Ok(Self {
            path,
            stream: stream.into(),
        })
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.path.join(format!("{}.json", self.stream))
    }

    fn temp_path(&self) -> PathBuf {
        self.path.join(format!("{}.json.tmp", self.stream))
    }
}

impl AdmissionStore for FileStore {
    fn load(&mut self) -> Result<Option<HospitalSnapshot>, SchedulerError> {
        let file_path = self.file_path();
        if !file_path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&file_path).map_err(|e| SchedulerError::Backend(e.to_string()))?;
        let snapshot =
            serde_json::from_str(&raw).map_err(|e| SchedulerError::Backend(format!("corrupt snapshot: {e}")))?;
        tracing::debug!(path = %file_path.display(), "snapshot loaded");
        Ok(Some(snapshot))
    }

    fn commit(&mut self, snapshot: &HospitalSnapshot) -> Result<(), SchedulerError> {
        let body = serde_json::to_vec(snapshot).map_err(|e| SchedulerError::Backend(e.to_string()))?;
        let temp = self.temp_path();
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp)
            .map_err(|e| SchedulerError::Backend(e.to_string()))?;
        file.write_all(&body)
            .and_then(|()| file.sync_all())
            .map_err(|e| SchedulerError::Backend(e.to_string()))?;
        rename(&temp, self.file_path()).map_err(|e| SchedulerError::Backend(e.to_string()))
    }
}
