//! jigsaw-export: Pure format serializers (sans-IO)
//!
//! Converts generated puzzles into output formats: PNG bytes and
//! `data:` URLs for piece rasters, SVG cut sheets for piece outlines and
//! a JSON manifest tying pieces to their assets.

pub mod data_url;
pub mod manifest;
pub mod svg;

pub use data_url::{DataUrl, PNG_MIME, encode_png, parse_data_url, png_data_url, to_data_url};
pub use manifest::{AssetNaming, Manifest, ManifestPiece};
pub use svg::{SvgMetadata, path_data, to_cut_svg, to_piece_svg};

/// Errors that can occur while serializing a puzzle.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The PNG encoder rejected a piece raster.
    #[error("failed to encode PNG: {0}")]
    PngEncode(#[from] image::ImageError),

    /// A string that should be a `data:` URL is malformed.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// A base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// JSON serialization failed.
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}
