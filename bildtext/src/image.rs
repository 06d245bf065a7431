//! Image intake: format detection for upload bytes.

use llm_client::ImageInput;
use std::path::Path;

use crate::error::{Error, Result};

/// Detect the MIME type of image data from its magic bytes.
///
/// Only formats the vision APIs accept directly are recognized; TIFF and
/// anything else return `None`.
pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        Some("image/png")
    } else if data.starts_with(b"GIF8") {
        Some("image/gif")
    } else if data.starts_with(b"RIFF") && data.len() > 12 && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else if data.starts_with(b"BM") {
        Some("image/bmp")
    } else {
        None
    }
}

/// Wrap image bytes for a model request.
pub fn image_input(data: Vec<u8>, name: Option<&str>) -> Result<ImageInput> {
    let mime_type = detect_mime_type(&data).ok_or_else(|| Error::UnsupportedImage {
        name: name.map(str::to_string),
    })?;
    Ok(ImageInput::new(data, mime_type))
}

/// Read an image file for a model request.
pub fn load_image(path: &Path) -> Result<ImageInput> {
    let data = std::fs::read(path)?;
    image_input(data, Some(&path.display().to_string()))
}
