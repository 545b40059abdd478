use std::io::Cursor;

use image::ImageFormat;
use thiserror::Error;

/// Maximum dimension (width or height) of generated thumbnails.
pub const THUMBNAIL_MAX_DIM: u32 = 320;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported image type{}", .0.as_ref().map(|t| format!(": {t}")).unwrap_or_default())]
    UnsupportedType(Option<String>),

    #[error("failed to decode image: {0}")]
    Decode(String),
}

/// Metadata extracted from validated image bytes.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Sniff the content type from magic bytes. Returns `None` for anything
/// outside the allow-list.
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Validate bytes as an allowed image and extract its dimensions.
pub fn inspect_image(bytes: &[u8]) -> Result<ImageInfo, ImageError> {
    let content_type = sniff_content_type(bytes).ok_or(ImageError::UnsupportedType(None))?;

    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;

    Ok(ImageInfo {
        content_type,
        width: decoded.width(),
        height: decoded.height(),
    })
}

/// Downscale to a JPEG thumbnail bounded by `THUMBNAIL_MAX_DIM`.
pub fn make_thumbnail(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let thumbnail = decoded.thumbnail(THUMBNAIL_MAX_DIM, THUMBNAIL_MAX_DIM);

    let mut out = Vec::new();
    thumbnail
        .into_rgb8()
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    Ok(out)
}
