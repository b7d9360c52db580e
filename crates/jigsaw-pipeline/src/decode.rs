//! Source image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! straight-alpha RGBA image every piece is cut from.
//!
//! This is the first step in the pipeline: raw bytes in, `RgbaImage` out.

use crate::types::{Dimensions, PuzzleError, RgbaImage};

/// Decode raw image bytes into an RGBA image.
///
/// Supports whatever formats the `image` crate was built with (PNG, JPEG,
/// BMP, WebP in this workspace).
///
/// # Errors
///
/// Returns [`PuzzleError::EmptyInput`] if `bytes` is empty.
/// Returns [`PuzzleError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, PuzzleError> {
    if bytes.is_empty() {
        return Err(PuzzleError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Dimensions of a decoded image.
#[must_use]
pub fn dimensions(image: &RgbaImage) -> Dimensions {
    Dimensions {
        width: image.width(),
        height: image.height(),
    }
}
