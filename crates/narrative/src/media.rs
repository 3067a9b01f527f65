//! Non-text cell payloads.
//!
//! These values are embedded into table cells as-is; they never pass through the sentinel
//! decoder. The document-assembly layer decides how to present them (multimedia is typically
//! rendered in a side panel rather than inline).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to an attachment (image, scanned document, recording) held outside the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultimediaReference {
    /// Identifier of the attachment within the record.
    pub id: Uuid,

    /// Media type (MIME type), for example "image/png".
    pub media_type: String,

    /// Path or URI of the attachment, relative to the record.
    pub path: String,

    /// Optional human-readable caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// A hyperlink cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hyperlink {
    /// Link target.
    pub href: String,

    /// Text shown for the link.
    pub text: String,
}
