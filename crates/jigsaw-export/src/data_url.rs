//! PNG encoding and `data:` URLs.
//!
//! Piece rasters are handed to presentation layers either as PNG files
//! or as self-contained `data:image/png;base64,...` URLs that can be
//! used directly as an image source.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use jigsaw_pipeline::RgbaImage;

use crate::ExportError;

/// MIME type of every encoded piece.
pub const PNG_MIME: &str = "image/png";

/// Encode an RGBA image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::PngEncode`] if the encoder rejects the image.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Wrap already-encoded PNG bytes in a base64 `data:` URL.
#[must_use]
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:{PNG_MIME};base64,{}", STANDARD.encode(png))
}

/// Encode an RGBA image as a `data:image/png;base64,...` URL.
///
/// # Errors
///
/// Returns [`ExportError::PngEncode`] if PNG encoding fails.
pub fn to_data_url(image: &RgbaImage) -> Result<String, ExportError> {
    Ok(png_data_url(&encode_png(image)?))
}

/// Payload of a parsed `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Declared media type, empty when omitted.
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Parse a `data:[<mime>][;params][;base64],<payload>` URL.
///
/// Base64 payloads are decoded; other payloads are taken verbatim
/// (percent-encoding is not interpreted).
///
/// # Errors
///
/// Returns [`ExportError::InvalidDataUrl`] when the scheme or the comma
/// separator is missing and [`ExportError::Base64`] when a base64
/// payload is malformed.
pub fn parse_data_url(url: &str) -> Result<DataUrl, ExportError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ExportError::InvalidDataUrl("missing `data:` scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExportError::InvalidDataUrl("missing `,` separator".to_string()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_string();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        STANDARD.decode(payload.trim())?
    } else {
        payload.as_bytes().to_vec()
    };
    Ok(DataUrl { mime, bytes })
}
