// ABOUTME: Remote listing of images the server already knows about.
// ABOUTME: Failures are logged and yield an empty list; reconciliation is best-effort.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{ACCEPT, HOST};
use hyper::{Method, Request};

use super::{Endpoint, HttpError, send};
use crate::types::ImageRecord;

/// Source of server-side image records.
///
/// Implementations never fail: an unreachable or misbehaving server is an
/// empty listing.
#[async_trait]
pub trait RemoteListing: Send + Sync {
    async fn fetch_records(&self) -> Vec<ImageRecord>;
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("listing returned status {0}")]
    Status(u16),

    #[error("malformed listing: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Listing client for `GET <list_path>` returning a JSON array of filenames.
#[derive(Debug, Clone)]
pub struct HttpListingClient {
    endpoint: Endpoint,
    list_path: String,
    images_prefix: String,
}

impl HttpListingClient {
    pub fn new(
        endpoint: Endpoint,
        list_path: impl Into<String>,
        images_prefix: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            list_path: list_path.into(),
            images_prefix: images_prefix.into(),
        }
    }

    /// Fetch the raw filename list, surfacing every failure.
    pub async fn fetch_filenames(&self) -> Result<Vec<String>, ListingError> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(self.endpoint.path(&self.list_path))
            .header(HOST, self.endpoint.authority())
            .header(ACCEPT, "application/json")
            .body(Full::new(Bytes::new()))
            .map_err(HttpError::build)?;

        let (status, body) = send(&self.endpoint, req).await?;
        if !status.is_success() {
            return Err(ListingError::Status(status.as_u16()));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RemoteListing for HttpListingClient {
    async fn fetch_records(&self) -> Vec<ImageRecord> {
        match self.fetch_filenames().await {
            Ok(names) => names
                .iter()
                .map(|name| ImageRecord::from_server_file(name, &self.images_prefix))
                .collect(),
            Err(e) => {
                tracing::debug!("remote listing unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

/// Listing for setups without a backing server.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoListing;

#[async_trait]
impl RemoteListing for NoListing {
    async fn fetch_records(&self) -> Vec<ImageRecord> {
        Vec::new()
    }
}
