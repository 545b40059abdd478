use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{GalleryImageId, UserId};
use crate::domain::listing::{SortDirection, SortKey};

/// A persisted record of an uploaded or generated asset, with checksum
/// metadata used for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: GalleryImageId,
    pub user_id: UserId,
    /// Hex-encoded SHA-256 of the original bytes.
    pub checksum: String,
    pub content_type: String,
    pub byte_size: i64,
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub host_public_id: String,
    pub source: ImageSource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    #[default]
    Uploaded,
    Generated,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Uploaded => "uploaded",
            ImageSource::Generated => "generated",
        }
    }
}

impl FromStr for ImageSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uploaded" => Ok(ImageSource::Uploaded),
            "generated" => Ok(ImageSource::Generated),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewGalleryImage {
    pub user_id: UserId,
    pub checksum: String,
    pub content_type: String,
    pub byte_size: i64,
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub host_public_id: String,
    pub source: ImageSource,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GallerySortKey {
    CreatedAt,
    ByteSize,
}

impl SortKey for GallerySortKey {
    fn default() -> Self {
        GallerySortKey::CreatedAt
    }

    fn from_query(value: &str) -> Option<Self> {
        match value {
            "created-at" => Some(GallerySortKey::CreatedAt),
            "byte-size" => Some(GallerySortKey::ByteSize),
            _ => None,
        }
    }

    fn query_value(self) -> &'static str {
        match self {
            GallerySortKey::CreatedAt => "created-at",
            GallerySortKey::ByteSize => "byte-size",
        }
    }

    fn default_direction(self) -> SortDirection {
        SortDirection::Desc
    }
}
