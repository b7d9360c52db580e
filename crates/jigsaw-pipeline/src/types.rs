//! Shared types for the jigsaw generation pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can reference decoded
/// sources and piece rasters without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in pixel coordinates.
///
/// Depending on context this is either puzzle-global (the assembled
/// puzzle's pixel space) or piece-local (a piece canvas' pixel space).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// This point shifted by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Width divided by height.
    #[must_use]
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Maximum display area available to the puzzle, in pixels.
///
/// Supplied by the presentation layer after it has subtracted its own
/// padding and chrome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Maximum puzzle width.
    pub max_width: f64,
    /// Maximum puzzle height.
    pub max_height: f64,
}

impl Bounds {
    /// Create new display bounds.
    #[must_use]
    pub const fn new(max_width: f64, max_height: f64) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

/// Named difficulty tiers and their base grid sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 3 pieces along the short axis.
    Easy,
    /// 5 pieces along the short axis.
    #[default]
    Medium,
    /// 10 pieces along the short axis.
    Hard,
}

impl Difficulty {
    /// Base grid size (piece count along the image's shorter axis).
    #[must_use]
    pub const fn grid_size(self) -> u32 {
        match self {
            Self::Easy => 3,
            Self::Medium => 5,
            Self::Hard => 10,
        }
    }
}

/// Thin outline traced along each piece's cut path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    /// Stroke width in pixels. Zero disables the stroke.
    pub width: f32,
    /// Straight (non-premultiplied) RGBA stroke color.
    pub color: [u8; 4],
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            color: [255, 255, 255, 77],
        }
    }
}

/// Simulated 3D bevel: a dark rim along the bottom-right inner edge and a
/// light rim along the top-left inner edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BevelStyle {
    /// Whether the bevel is applied at all.
    pub enabled: bool,
    /// Distance in pixels the coverage is shifted to find the rims.
    /// At least 1 when the bevel is enabled.
    pub offset: f32,
    /// Gaussian sigma used to soften the rims. Zero gives hard rims.
    pub softness: f32,
    /// Opacity of the dark shadow rim (0.0 to 1.0).
    pub shadow_opacity: f32,
    /// Opacity of the light highlight rim (0.0 to 1.0).
    pub highlight_opacity: f32,
}

impl Default for BevelStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            offset: 2.0,
            softness: 1.5,
            shadow_opacity: 0.45,
            highlight_opacity: 0.35,
        }
    }
}

/// Visual treatment applied to each rasterized piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    /// Outline stroke.
    pub border: BorderStyle,
    /// Emboss effect.
    pub bevel: BevelStyle,
}

/// Configuration for one puzzle generation run.
///
/// Display bounds are passed separately because they belong to the
/// presentation layer and change on every resize, while the config is
/// typically chosen once per puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    /// Base grid size: the number of pieces along the image's shorter
    /// axis. See [`Difficulty::grid_size`].
    pub grid_size: u32,

    /// Tab protrusion as a fraction of the smaller piece dimension.
    pub tab_ratio: f64,

    /// Seed for the edge-shape random source. `None` draws a fresh seed
    /// from the operating system for every run.
    pub seed: Option<u64>,

    /// Border stroke and bevel settings.
    pub style: RenderStyle,
}

impl PuzzleConfig {
    /// Default base grid size ([`Difficulty::Medium`]).
    pub const DEFAULT_GRID_SIZE: u32 = Difficulty::Medium.grid_size();

    /// Default tab size ratio.
    pub const DEFAULT_TAB_RATIO: f64 = 0.2;

    /// Largest accepted tab size ratio. Beyond this, opposing slots on a
    /// single piece start to collide.
    pub const MAX_TAB_RATIO: f64 = 0.3;

    /// Check the configuration for values the generator cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidConfig`] describing the first
    /// offending field.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.grid_size == 0 {
            return Err(PuzzleError::InvalidConfig(
                "grid_size must be at least 1".to_string(),
            ));
        }
        if !(self.tab_ratio > 0.0 && self.tab_ratio <= Self::MAX_TAB_RATIO) {
            return Err(PuzzleError::InvalidConfig(format!(
                "tab_ratio must be in (0, {}], got {}",
                Self::MAX_TAB_RATIO,
                self.tab_ratio,
            )));
        }
        let border = &self.style.border;
        if !border.width.is_finite() || border.width < 0.0 {
            return Err(PuzzleError::InvalidConfig(format!(
                "border width must be finite and non-negative, got {}",
                border.width,
            )));
        }
        let bevel = &self.style.bevel;
        if !bevel.offset.is_finite() || bevel.offset < 0.0 {
            return Err(PuzzleError::InvalidConfig(format!(
                "bevel offset must be finite and non-negative, got {}",
                bevel.offset,
            )));
        }
        if bevel.enabled && bevel.offset < 1.0 {
            return Err(PuzzleError::InvalidConfig(format!(
                "bevel offset must be at least 1 pixel when the bevel is enabled, got {}",
                bevel.offset,
            )));
        }
        if !bevel.softness.is_finite() || bevel.softness < 0.0 {
            return Err(PuzzleError::InvalidConfig(format!(
                "bevel softness must be finite and non-negative, got {}",
                bevel.softness,
            )));
        }
        for (name, value) in [
            ("shadow_opacity", bevel.shadow_opacity),
            ("highlight_opacity", bevel.highlight_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PuzzleError::InvalidConfig(format!(
                    "bevel {name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            grid_size: Self::DEFAULT_GRID_SIZE,
            tab_ratio: Self::DEFAULT_TAB_RATIO,
            seed: None,
            style: RenderStyle::default(),
        }
    }
}

/// Errors that can occur during puzzle generation.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` variant is
/// serialized as its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    /// Failed to decode the source image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The source image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Configuration or display bounds are invalid.
    #[error("invalid puzzle configuration: {0}")]
    InvalidConfig(String),

    /// A drawing surface for a piece could not be allocated.
    ///
    /// Fatal for the whole run: a puzzle with a missing piece cannot be
    /// completed.
    #[error("could not allocate a drawing surface for piece ({row}, {col})")]
    RasterContextUnavailable {
        /// Grid row of the failing piece.
        row: u32,
        /// Grid column of the failing piece.
        col: u32,
    },

    /// A piece outline collapsed to an empty path.
    #[error("piece ({row}, {col}) produced an empty outline")]
    DegeneratePath {
        /// Grid row of the failing piece.
        row: u32,
        /// Grid column of the failing piece.
        col: u32,
    },
}

/// Serde-compatible proxy for `PuzzleError`.
///
/// `image::ImageError` does not implement serde, so the `ImageDecode`
/// variant stores its `Display` string instead.
#[derive(Serialize, Deserialize)]
enum PuzzleErrorProxy {
    ImageDecode(String),
    EmptyInput,
    InvalidConfig(String),
    RasterContextUnavailable { row: u32, col: u32 },
    DegeneratePath { row: u32, col: u32 },
}

impl Serialize for PuzzleError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::ImageDecode(e) => PuzzleErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PuzzleErrorProxy::EmptyInput,
            Self::InvalidConfig(s) => PuzzleErrorProxy::InvalidConfig(s.clone()),
            Self::RasterContextUnavailable { row, col } => {
                PuzzleErrorProxy::RasterContextUnavailable {
                    row: *row,
                    col: *col,
                }
            }
            Self::DegeneratePath { row, col } => PuzzleErrorProxy::DegeneratePath {
                row: *row,
                col: *col,
            },
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PuzzleError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PuzzleErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            // The typed image error cannot be rebuilt; keep its message.
            PuzzleErrorProxy::ImageDecode(msg) => {
                Self::InvalidConfig(format!("image decode error: {msg}"))
            }
            PuzzleErrorProxy::EmptyInput => Self::EmptyInput,
            PuzzleErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
            PuzzleErrorProxy::RasterContextUnavailable { row, col } => {
                Self::RasterContextUnavailable { row, col }
            }
            PuzzleErrorProxy::DegeneratePath { row, col } => Self::DegeneratePath { row, col },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_offset() {
        let p = Point::new(1.5, -2.0).offset(0.5, 3.0);
        assert_eq!(p, Point::new(2.0, 1.0));
    }

    // --- Dimensions / Difficulty tests ---

    #[test]
    fn dimensions_aspect() {
        let d = Dimensions {
            width: 800,
            height: 400,
        };
        assert!((d.aspect() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn difficulty_grid_sizes() {
        assert_eq!(Difficulty::Easy.grid_size(), 3);
        assert_eq!(Difficulty::Medium.grid_size(), 5);
        assert_eq!(Difficulty::Hard.grid_size(), 10);
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Hard).unwrap();
        assert_eq!(json, "\"hard\"");
    }

    // --- PuzzleConfig tests ---

    #[test]
    fn config_defaults() {
        let config = PuzzleConfig::default();
        assert_eq!(config.grid_size, 5);
        assert!((config.tab_ratio - 0.2).abs() < f64::EPSILON);
        assert!(config.seed.is_none());
        assert!(config.style.bevel.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_grid() {
        let config = PuzzleConfig {
            grid_size: 0,
            ..PuzzleConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PuzzleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_out_of_range_tab_ratio() {
        for tab_ratio in [0.0, -0.1, 0.31, f64::NAN] {
            let config = PuzzleConfig {
                tab_ratio,
                ..PuzzleConfig::default()
            };
            assert!(
                config.validate().is_err(),
                "tab_ratio {tab_ratio} should be rejected"
            );
        }
    }

    #[test]
    fn config_rejects_subpixel_bevel_offset() {
        let mut config = PuzzleConfig::default();
        for offset in [0.0, 0.4, 0.99] {
            config.style.bevel.offset = offset;
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("at least 1"), "offset {offset}");
        }
        config.style.bevel.offset = 1.0;
        assert!(config.validate().is_ok());
        config.style.bevel.enabled = false;
        config.style.bevel.offset = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_bad_bevel_opacity() {
        let mut config = PuzzleConfig::default();
        config.style.bevel.shadow_opacity = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shadow_opacity"));
    }

    #[test]
    fn config_serde_round_trip() {
        let config = PuzzleConfig {
            grid_size: 10,
            tab_ratio: 0.25,
            seed: Some(42),
            style: RenderStyle {
                border: BorderStyle {
                    width: 2.0,
                    color: [0, 0, 0, 128],
                },
                bevel: BevelStyle {
                    enabled: false,
                    ..BevelStyle::default()
                },
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PuzzleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    // --- PuzzleError tests ---

    #[test]
    fn error_display() {
        assert_eq!(
            PuzzleError::EmptyInput.to_string(),
            "input image data is empty"
        );
        assert_eq!(
            PuzzleError::RasterContextUnavailable { row: 1, col: 2 }.to_string(),
            "could not allocate a drawing surface for piece (1, 2)",
        );
    }

    #[test]
    fn error_serde_round_trip_keeps_piece_coordinates() {
        let err = PuzzleError::RasterContextUnavailable { row: 3, col: 4 };
        let json = serde_json::to_string(&err).unwrap();
        let deserialized: PuzzleError = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            deserialized,
            PuzzleError::RasterContextUnavailable { row: 3, col: 4 }
        ));
    }

    #[test]
    fn result_err_serde_round_trip() {
        let result: Result<(), PuzzleError> = Err(PuzzleError::EmptyInput);
        let json = serde_json::to_string(&result).unwrap();
        let deserialized: Result<(), PuzzleError> = serde_json::from_str(&json).unwrap();
        assert!(matches!(deserialized, Err(PuzzleError::EmptyInput)));
    }
}
