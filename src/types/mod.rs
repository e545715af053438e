// ABOUTME: Domain types for uploaded images.
// ABOUTME: Record identifiers, accepted image MIME types, and the image record itself.

mod id;
mod mime;
mod record;

pub use id::ImageId;
pub use mime::{ImageMime, ParseImageMimeError, mime_for_path};
pub use record::{ImageRecord, now_millis};
