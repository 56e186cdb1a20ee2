use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an asset held by the media store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MediaReference {
    pub url: String,

    /// Stable handle used for later deletion
    #[serde(rename = "publicId")]
    pub public_id: String,
}

/// Resource type requested from the media store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Auto,
    Image,
    Video,
}

impl MediaKind {
    /// Classifies a declared content type. `None` for anything that is not image or video.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let lowered = content_type.trim().to_ascii_lowercase();
        if lowered.starts_with("image/") {
            Some(MediaKind::Image)
        } else if lowered.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Reads a stored resource type name such as `"video"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(MediaKind::Auto),
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Auto => "auto",
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file part buffered from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
