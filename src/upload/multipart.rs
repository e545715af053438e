// ABOUTME: multipart/form-data encoding for a single file field.
// ABOUTME: Builds the request body and matching Content-Type header value.

use bytes::{BufMut, Bytes, BytesMut};

use super::UploadFile;

/// A single-part multipart body ready to send.
pub(crate) struct MultipartBody {
    boundary: String,
    body: Bytes,
}

impl MultipartBody {
    /// Encode `file` as form field `field`.
    pub(crate) fn file(field: &str, file: &UploadFile) -> Self {
        let boundary = format!("imgdrop-{}", uuid::Uuid::new_v4().simple());
        let filename = escape_quoted(&file.name);

        let mut body = BytesMut::with_capacity(file.bytes.len() + 256);
        body.put_slice(format!("--{boundary}\r\n").as_bytes());
        body.put_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.put_slice(format!("Content-Type: {}\r\n\r\n", file.mime_type).as_bytes());
        body.put_slice(&file.bytes);
        body.put_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Self {
            boundary,
            body: body.freeze(),
        }
    }

    pub(crate) fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        self.body
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}
