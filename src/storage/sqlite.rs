// ABOUTME: SQLite catalog of image records with an index on upload time.
// ABOUTME: Creates its schema idempotently and degrades to a no-op when unavailable.

use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Arc;

use super::{StorageError, StructuredStore};
use crate::types::{ImageId, ImageRecord};

pub const DATABASE_FILENAME: &str = "images.db";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS images (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    url         TEXT NOT NULL,
    preview     TEXT,
    size        INTEGER,
    mime_type   TEXT,
    uploaded_at INTEGER
);
CREATE INDEX IF NOT EXISTS idx_images_uploaded_at ON images(uploaded_at DESC);
";

/// Structured store backed by SQLite.
///
/// When the database cannot be opened the store is *unavailable*: writes
/// succeed without effect and reads return nothing, so callers fall back to
/// the backup store.
///
/// Queries run on tokio's blocking pool.
pub struct SqliteStore {
    conn: Option<Arc<Mutex<Connection>>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("available", &self.is_available())
            .finish()
    }
}

impl SqliteStore {
    /// Open or create the catalog at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open the catalog, or return an unavailable store if that fails.
    pub fn open_or_unavailable(path: &Path) -> Self {
        match Self::open(path) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "image catalog unavailable, using backup store only: {}",
                    e
                );
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { conn: None }
    }

    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Some(Arc::new(Mutex::new(conn))),
        })
    }

    /// Run `f` against the connection on the blocking pool, or return
    /// `fallback` when unavailable.
    async fn with_conn<T, F>(&self, fallback: T, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let Some(conn) = self.conn.clone() else {
            return Ok(fallback);
        };
        let result = tokio::task::spawn_blocking(move || f(&conn.lock())).await?;
        Ok(result?)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageRecord> {
    let id: String = row.get(0)?;
    let size: Option<i64> = row.get(4)?;
    let uploaded_at: Option<i64> = row.get(6)?;
    Ok(ImageRecord {
        id: ImageId::new(id),
        name: row.get(1)?,
        url: row.get(2)?,
        preview: row.get(3)?,
        size: size.and_then(|s| u64::try_from(s).ok()),
        mime_type: row.get(5)?,
        uploaded_at: uploaded_at.and_then(DateTime::from_timestamp_millis),
    })
}

#[async_trait]
impl StructuredStore for SqliteStore {
    async fn put(&self, record: &ImageRecord) -> Result<(), StorageError> {
        let record = record.clone();
        self.with_conn((), move |conn| {
            conn.execute(
                "INSERT INTO images (id, name, url, preview, size, mime_type, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    url = excluded.url,
                    preview = excluded.preview,
                    size = excluded.size,
                    mime_type = excluded.mime_type,
                    uploaded_at = excluded.uploaded_at",
                params![
                    record.id.as_str(),
                    record.name,
                    record.url,
                    record.preview,
                    record.size.and_then(|s| i64::try_from(s).ok()),
                    record.mime_type,
                    record.uploaded_at.map(|t| t.timestamp_millis()),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &ImageId) -> Result<(), StorageError> {
        let id = id.clone();
        self.with_conn((), move |conn| {
            conn.execute("DELETE FROM images WHERE id = ?1", params![id.as_str()])?;
            Ok(())
        })
        .await
    }

    async fn get_all_sorted(&self) -> Result<Vec<ImageRecord>, StorageError> {
        self.with_conn(Vec::new(), |conn| {
            // NULL upload times sort last under DESC.
            let mut stmt = conn.prepare(
                "SELECT id, name, url, preview, size, mime_type, uploaded_at
                 FROM images
                 ORDER BY uploaded_at DESC, rowid DESC",
            )?;
            stmt.query_map([], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.with_conn((), |conn| {
            conn.execute("DELETE FROM images", [])?;
            Ok(())
        })
        .await
    }
}
