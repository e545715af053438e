// ABOUTME: Upload client: local validation, transport submission, record creation.
// ABOUTME: Validation failures never reach the transport.

mod file;
mod multipart;
mod simulated;
mod transport;

pub use file::{ReadFileError, UploadFile};
pub use simulated::{DEFAULT_LATENCY, DEFAULT_SHARE_HOST, DEFAULT_SUCCESS_RATE, SimulatedTransport};
pub use transport::{HttpTransport, UploadError, UploadResponse, UploadTransport};

use std::sync::Arc;

use crate::types::{ImageId, ImageMime, ImageRecord, now_millis};

/// Largest accepted file: 5 MiB.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// A file rejected before any network attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Only .jpg, .png and .gif files are supported (got {0})")]
    UnsupportedType(String),

    #[error("Maximum file size is 5MB (file is {size} bytes)")]
    TooLarge { size: u64, limit: u64 },
}

/// Check MIME type and size. The type is checked first.
pub fn validate(mime_type: &str, size: u64) -> Result<ImageMime, ValidationError> {
    let mime = ImageMime::parse(mime_type)
        .map_err(|_| ValidationError::UnsupportedType(mime_type.to_string()))?;

    if size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }

    Ok(mime)
}

/// Either half of a failed upload.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Validates files and turns transport responses into registry records.
#[derive(Clone)]
pub struct UploadClient {
    transport: Arc<dyn UploadTransport>,
    images_prefix: String,
}

impl std::fmt::Debug for UploadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadClient")
            .field("images_prefix", &self.images_prefix)
            .finish_non_exhaustive()
    }
}

impl UploadClient {
    pub fn new(transport: Arc<dyn UploadTransport>, images_prefix: impl Into<String>) -> Self {
        Self {
            transport,
            images_prefix: images_prefix.into(),
        }
    }

    /// Validate and submit `file`, producing the record to add.
    pub async fn upload(&self, file: &UploadFile) -> Result<ImageRecord, SubmitError> {
        let mime = validate(&file.mime_type, file.size)?;
        tracing::debug!(name = %file.name, size = file.size, %mime, "uploading");

        let response = self.transport.send(file).await?;
        let record = self.record_for(file, response);
        tracing::info!(name = %record.name, url = %record.url, "upload complete");
        Ok(record)
    }

    /// Server-assigned filename and URL win over the local file name.
    fn record_for(&self, file: &UploadFile, response: UploadResponse) -> ImageRecord {
        let name = non_blank(response.filename).unwrap_or_else(|| file.name.clone());
        let url =
            non_blank(response.url).unwrap_or_else(|| format!("{}{}", self.images_prefix, name));

        ImageRecord {
            id: ImageId::generate(),
            name,
            url,
            preview: Some(file.data_url()),
            size: Some(file.size),
            mime_type: Some(file.mime_type.clone()),
            uploaded_at: Some(now_millis()),
        }
    }
}

/// Blank server fields count as missing.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
