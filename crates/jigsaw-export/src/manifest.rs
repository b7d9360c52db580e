//! JSON manifest describing a generated puzzle.
//!
//! The manifest carries everything a presentation layer needs to lay out
//! and play a puzzle without re-running the generator: the assembled
//! size, the grid, and per piece its shape, canvas size, correct
//! position and a reference to its raster.

use serde::{Deserialize, Serialize};

use jigsaw_pipeline::{PieceDefinition, PieceInfo, Puzzle};

use crate::ExportError;
use crate::data_url::to_data_url;

/// How piece rasters are referenced from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetNaming {
    /// Each piece refers to a PNG file `<prefix><id>.png` written
    /// alongside the manifest.
    Files {
        /// File name prefix, e.g. `piece_`.
        prefix: String,
    },
    /// Each piece carries its raster inline as a PNG data URL.
    Embedded,
}

impl Default for AssetNaming {
    fn default() -> Self {
        Self::Files {
            prefix: "piece_".to_string(),
        }
    }
}

impl AssetNaming {
    /// File name of a piece's PNG, or `None` when assets are embedded.
    #[must_use]
    pub fn file_name(&self, id: usize) -> Option<String> {
        match self {
            Self::Files { prefix } => Some(format!("{prefix}{id}.png")),
            Self::Embedded => None,
        }
    }

    fn asset(&self, piece: &PieceDefinition) -> Result<String, ExportError> {
        match self.file_name(piece.id) {
            Some(name) => Ok(name),
            None => to_data_url(&piece.image),
        }
    }
}

/// One piece entry of a [`Manifest`].
///
/// The piece fields sit inline next to `asset`; edge kinds serialize as
/// signed integers (-1 slot, 0 flat, 1 tab).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestPiece {
    /// Grid placement, shape and canvas geometry.
    #[serde(flatten)]
    pub piece: PieceInfo,
    /// PNG file name or `data:` URL.
    pub asset: String,
}

/// Serializable description of a whole puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Assembled puzzle width in pixels.
    pub puzzle_width: f64,
    /// Assembled puzzle height in pixels.
    pub puzzle_height: f64,
    /// Grid rows.
    pub rows: u32,
    /// Grid columns.
    pub cols: u32,
    /// Tab protrusion in pixels.
    pub tab_size: f64,
    /// Seed of the edge shapes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Pieces in id order.
    pub pieces: Vec<ManifestPiece>,
}

impl Manifest {
    /// Describe `puzzle`, referencing rasters as `naming` dictates.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::PngEncode`] if a raster has to be embedded
    /// and cannot be encoded.
    pub fn from_puzzle(puzzle: &Puzzle, naming: &AssetNaming) -> Result<Self, ExportError> {
        let pieces = puzzle
            .pieces
            .iter()
            .map(|piece| {
                Ok(ManifestPiece {
                    piece: PieceInfo::from(piece),
                    asset: naming.asset(piece)?,
                })
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        Ok(Self {
            puzzle_width: puzzle.puzzle_width,
            puzzle_height: puzzle.puzzle_height,
            rows: puzzle.layout.rows,
            cols: puzzle.layout.cols,
            tab_size: puzzle.tab_size,
            seed: puzzle.seed,
            pieces,
        })
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
