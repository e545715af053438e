// ABOUTME: Pluggable upload transports and the upload endpoint's wire types.
// ABOUTME: The HTTP transport posts a multipart body and parses `{ filename?, url? }`.

use async_trait::async_trait;
use http_body_util::Full;
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request};
use serde::Deserialize;

use super::UploadFile;
use super::multipart::MultipartBody;
use crate::remote::{Endpoint, HttpError, send};

/// Form field the upload endpoint reads the file from.
const FILE_FIELD: &str = "file";

const DEFAULT_FAILURE_MESSAGE: &str = "Upload failed";

/// Successful upload response. Both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Errors from submitting a file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Network(#[from] HttpError),

    #[error("invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("Upload failed. Please try again.")]
    Simulated,
}

impl UploadError {
    /// HTTP status of a rejected upload.
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Mechanism that actually delivers a file somewhere.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send(&self, file: &UploadFile) -> Result<UploadResponse, UploadError>;
}

/// Uploads over HTTP to `<endpoint><upload_path>`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Endpoint,
    upload_path: String,
}

impl HttpTransport {
    pub fn new(endpoint: Endpoint, upload_path: impl Into<String>) -> Self {
        Self {
            endpoint,
            upload_path: upload_path.into(),
        }
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn send(&self, file: &UploadFile) -> Result<UploadResponse, UploadError> {
        let multipart = MultipartBody::file(FILE_FIELD, file);
        let req = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.path(&self.upload_path))
            .header(HOST, self.endpoint.authority())
            .header(CONTENT_TYPE, multipart.content_type())
            .body(Full::new(multipart.into_bytes()))
            .map_err(HttpError::build)?;

        let (status, body) = send(&self.endpoint, req).await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let text = text.trim();
            let message = if text.is_empty() {
                DEFAULT_FAILURE_MESSAGE.to_string()
            } else {
                text.to_string()
            };
            tracing::warn!(status = status.as_u16(), "upload rejected: {}", message);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }
}
