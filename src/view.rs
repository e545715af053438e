// ABOUTME: Projects registry snapshots into display rows.
// ABOUTME: Formats sizes and upload times the way the image list shows them.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::types::ImageRecord;

pub const EMPTY_STATE: &str = "No images uploaded yet. Upload your first image to see it here.";

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// One rendered line of the image list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Size and upload time, joined with a bullet when both are known.
    pub meta: String,
}

pub fn render_rows(records: &[ImageRecord]) -> Vec<Row> {
    records.iter().map(render_row).collect()
}

fn render_row(record: &ImageRecord) -> Row {
    let size = record.size.map(format_file_size);
    let date = record.uploaded_at.as_ref().map(format_uploaded_at);
    let meta = match (size, date) {
        (Some(size), Some(date)) => format!("{size} • {date}"),
        (Some(part), None) | (None, Some(part)) => part,
        (None, None) => String::new(),
    };

    Row {
        id: record.id.to_string(),
        name: record.name.clone(),
        url: record.url.clone(),
        meta,
    }
}

/// Human-readable size with up to two decimals, e.g. `1.91 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

pub fn format_uploaded_at(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Plain-text table of `rows`, or the empty-state message.
pub fn render_text(rows: &[Row]) -> String {
    if rows.is_empty() {
        return EMPTY_STATE.to_string();
    }

    let mut out = String::new();
    for row in rows {
        out.push_str(&format!("{}  {}\n", row.id, row.name));
        out.push_str(&format!("    {}\n", row.url));
        if !row.meta.is_empty() {
            out.push_str(&format!("    {}\n", row.meta));
        }
    }
    out
}
