// ABOUTME: Key-value backup store writing one JSON file per key.
// ABOUTME: Whole-list replace semantics with atomic writes and an optional byte quota.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};
use crate::types::ImageRecord;

/// Fixed key the registry blob is stored under.
pub const BACKUP_KEY: &str = "uploadedImages";

/// Directory-backed key-value store. The registry lives in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    key: String,
    quota: Option<u64>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            key: BACKUP_KEY.to_string(),
            quota: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Reject blobs larger than `limit` bytes.
    pub fn with_quota(mut self, limit: Option<u64>) -> Self {
        self.quota = limit;
        self
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", self.key))
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, contents).await?;
        tokio::fs::rename(&temp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn save(&self, records: &[ImageRecord]) -> Result<(), StorageError> {
        let blob = serde_json::to_vec(records)?;

        if let Some(limit) = self.quota {
            let size = blob.len() as u64;
            if size > limit {
                return Err(StorageError::QuotaExceeded { size, limit });
            }
        }

        let path = self.path();
        self.write_atomic(&path, &blob).await?;
        tracing::debug!(path = %path.display(), count = records.len(), "backup saved");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ImageRecord>, StorageError> {
        let path = self.path();
        let blob = match tokio::fs::read(&path).await {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records: Vec<ImageRecord> = serde_json::from_slice(&blob)?;
        tracing::debug!(path = %path.display(), count = records.len(), "backup loaded");
        Ok(records)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
