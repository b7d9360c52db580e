//! Generated pieces and the puzzle that owns them.

use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::path::PiecePath;
use crate::shape::{PieceShape, ShapeGrid};
use crate::types::{Point, RgbaImage};

/// An immutable piece produced by the generator.
///
/// Mutable play state (position, lock, stacking) lives in
/// [`crate::play::PieceState`], joined to this definition by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceDefinition {
    /// `row * cols + col`.
    pub id: usize,
    /// Grid row.
    pub row: u32,
    /// Grid column.
    pub col: u32,
    /// Edge kinds.
    pub shape: PieceShape,
    /// Canvas width: piece width plus a tab margin on each side.
    pub width: f64,
    /// Canvas height: piece height plus a tab margin on each side.
    pub height: f64,
    /// Where the canvas' top-left corner sits in the assembled puzzle.
    pub correct_position: Point,
    /// Outline in canvas coordinates.
    pub path: PiecePath,
    /// Clipped, bordered and beveled piece raster (straight alpha).
    pub image: RgbaImage,
}

impl PieceDefinition {
    /// Outline in puzzle-global coordinates.
    #[must_use]
    pub fn global_path(&self) -> PiecePath {
        self.path
            .translated(self.correct_position.x, self.correct_position.y)
    }
}

/// Placement metadata of a piece, without its outline or raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceInfo {
    /// `row * cols + col`.
    pub id: usize,
    /// Grid row.
    pub row: u32,
    /// Grid column.
    pub col: u32,
    /// Edge kinds.
    pub shape: PieceShape,
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
    /// Canvas top-left in the assembled puzzle.
    pub correct_position: Point,
}

impl From<&PieceDefinition> for PieceInfo {
    fn from(piece: &PieceDefinition) -> Self {
        Self {
            id: piece.id,
            row: piece.row,
            col: piece.col,
            shape: piece.shape,
            width: piece.width,
            height: piece.height,
            correct_position: piece.correct_position,
        }
    }
}

/// A fully generated puzzle.
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    /// Pieces in id order (row-major).
    pub pieces: Vec<PieceDefinition>,
    /// Assembled puzzle width in pixels.
    pub puzzle_width: f64,
    /// Assembled puzzle height in pixels.
    pub puzzle_height: f64,
    /// Layout the pieces were cut from.
    pub layout: Layout,
    /// Edge shapes of every piece.
    pub shapes: ShapeGrid,
    /// Tab protrusion in pixels.
    pub tab_size: f64,
    /// Seed the edge shapes were drawn from, when known.
    pub seed: Option<u64>,
}

impl Puzzle {
    /// Piece with the given id.
    #[must_use]
    pub fn piece(&self, id: usize) -> Option<&PieceDefinition> {
        self.pieces.get(id)
    }

    /// Total number of pixels across all piece rasters.
    #[must_use]
    pub fn raster_pixels(&self) -> u64 {
        self.pieces
            .iter()
            .map(|p| u64::from(p.image.width()) * u64::from(p.image.height()))
            .sum()
    }
}
