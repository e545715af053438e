// ABOUTME: Identifier for image records in the registry.
// ABOUTME: Generated for local uploads, derived from the filename for server-listed images.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix for ids of records that came from the remote listing.
const SERVER_ID_PREFIX: &str = "srv-";

/// Unique identifier of an [`ImageRecord`](super::ImageRecord).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use = "ids identify records and should not be ignored"]
pub struct ImageId(String);

impl ImageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fresh id for a locally uploaded image.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Stable id for an image reported by the listing endpoint.
    pub fn for_server_file(filename: &str) -> Self {
        Self(format!("{SERVER_ID_PREFIX}{filename}"))
    }

    pub fn is_server_file(&self) -> bool {
        self.0.starts_with(SERVER_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
