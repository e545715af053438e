// ABOUTME: The image record kept by the registry and both storage adapters.
// ABOUTME: Serialized as camelCase JSON with absent optionals omitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ImageId;

/// Metadata for one uploaded (or server-listed) image.
///
/// Records are never mutated once they enter the registry; operations replace
/// them wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: ImageId,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl ImageRecord {
    /// Record for a filename reported by the listing endpoint.
    pub fn from_server_file(filename: &str, images_prefix: &str) -> Self {
        let url = format!("{images_prefix}{filename}");
        Self {
            id: ImageId::for_server_file(filename),
            name: filename.to_string(),
            preview: Some(url.clone()),
            url,
            size: None,
            mime_type: None,
            uploaded_at: None,
        }
    }
}

/// Current time truncated to milliseconds, the precision the catalog stores.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_record_uses_prefix() {
        let record = ImageRecord::from_server_file("b.jpg", "/images/");
        assert_eq!(record.id.as_str(), "srv-b.jpg");
        assert_eq!(record.url, "/images/b.jpg");
        assert_eq!(record.preview.as_deref(), Some("/images/b.jpg"));
        assert!(record.uploaded_at.is_none());
    }

    #[test]
    fn json_uses_camel_case_and_omits_missing() {
        let record = ImageRecord {
            id: ImageId::new("1"),
            name: "cat.png".to_string(),
            url: "/images/cat.png".to_string(),
            preview: None,
            size: Some(10),
            mime_type: Some("image/png".to_string()),
            uploaded_at: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["mimeType"], "image/png");
        assert!(json.get("preview").is_none());
        assert!(json.get("uploadedAt").is_none());
    }

    #[test]
    fn now_millis_has_no_sub_millisecond_part() {
        let t = now_millis();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
