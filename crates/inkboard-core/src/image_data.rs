//! Image payload handling for image elements.
//!
//! Bitmaps travel as base64 data URLs on the element's `src` field so
//! documents stay plain JSON.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Supported bitmap formats for imported images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// Encode raw bitmap bytes as a data URL, sniffing the format. `None` for
/// payloads that are not a recognizable bitmap.
pub fn encode_data_url(data: &[u8]) -> Option<String> {
    let format = ImageFormat::from_magic_bytes(data)?;
    Some(format!(
        "data:{};base64,{}",
        format.mime_type(),
        STANDARD.encode(data)
    ))
}

/// Decode the payload of a data URL back into raw bytes.
pub fn decode_data_url(src: &str) -> Option<Vec<u8>> {
    let (_, payload) = src.strip_prefix("data:")?.split_once(";base64,")?;
    STANDARD.decode(payload).ok()
}
