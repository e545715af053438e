// ABOUTME: Durable storage adapters that follow the in-memory registry.
// ABOUTME: A whole-list JSON backup store and a per-record SQLite catalog.

mod kv;
mod sqlite;

pub use kv::{BACKUP_KEY, JsonFileStore};
pub use sqlite::{DATABASE_FILENAME, SqliteStore};

use crate::types::{ImageId, ImageRecord};
use async_trait::async_trait;

/// Flat backup store holding the whole registry as one serialized blob.
///
/// Every save replaces the previous blob.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn save(&self, records: &[ImageRecord]) -> Result<(), StorageError>;

    /// Load the stored list. A missing blob is an empty list, not an error.
    async fn load(&self) -> Result<Vec<ImageRecord>, StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

/// Keyed, indexed store of individual records.
#[async_trait]
pub trait StructuredStore: Send + Sync {
    /// Insert or replace the record with the same id.
    async fn put(&self, record: &ImageRecord) -> Result<(), StorageError>;

    async fn delete(&self, id: &ImageId) -> Result<(), StorageError>;

    /// All records, newest upload first. Records without an upload time come last.
    async fn get_all_sorted(&self) -> Result<Vec<ImageRecord>, StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

/// Errors from either storage adapter.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("quota exceeded: {size} bytes exceeds the {limit} byte limit")]
    QuotaExceeded { size: u64, limit: u64 },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
