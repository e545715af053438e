// ABOUTME: Image MIME types accepted for upload.
// ABOUTME: Parses MIME strings and infers types from file extensions.

use std::fmt;
use std::path::Path;
use thiserror::Error;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported image type: {0}")]
pub struct ParseImageMimeError(pub String);

/// One of the image formats the upload endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Jpeg,
    Png,
    Gif,
}

impl ImageMime {
    /// Parse a MIME type string. `image/jpg` is accepted as an alias of `image/jpeg`.
    pub fn parse(value: &str) -> Result<Self, ParseImageMimeError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(ImageMime::Jpeg),
            "image/png" => Ok(ImageMime::Png),
            "image/gif" => Ok(ImageMime::Gif),
            _ => Err(ParseImageMimeError(value.to_string())),
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            "gif" => Some(ImageMime::Gif),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MIME type string for a file path, falling back to `application/octet-stream`.
pub fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageMime::from_extension)
        .map(|mime| mime.as_str())
        .unwrap_or(OCTET_STREAM)
}
