// ABOUTME: A file selected for upload.
// ABOUTME: Holds name, declared size, MIME type and bytes; renders a data URL preview.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{ValidationError, validate};
use crate::types::mime_for_path;

/// Failure picking a file up from disk.
#[derive(Debug, thiserror::Error)]
pub enum ReadFileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A file picked by the user, read fully into memory.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring the MIME type from its extension.
    ///
    /// Type and size are checked against the file's metadata before any
    /// bytes are read.
    pub async fn from_path(path: &Path) -> Result<Self, ReadFileError> {
        let io_error = |source| ReadFileError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mime_type = mime_for_path(path);
        let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
        validate(mime_type, size)?;

        let bytes = tokio::fs::read(path).await.map_err(io_error)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, mime_type, bytes))
    }

    /// `data:` URL of the file contents, used as the record preview.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            STANDARD.encode(&self.bytes)
        )
    }
}
