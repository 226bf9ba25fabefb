use serde::{Deserialize, Serialize};

/// Metadata returned by a successful image upload.
///
/// Immutable once created; a generate call references it by `image_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub image_id: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    /// Size of the uploaded file in bytes. Older service builds omit it.
    #[serde(default)]
    pub size: u64,
}
