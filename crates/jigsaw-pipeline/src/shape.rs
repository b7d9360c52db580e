//! Edge-shape assignment.
//!
//! Every piece has four edges, each of which is flat, a tab (protruding
//! outward) or a slot (indented inward). Border edges are always flat.
//! Interior edges are shared by two pieces and must mate: where one
//! piece has a tab, its neighbor has a slot.
//!
//! The grid is filled row-major. Each cell randomizes only its right and
//! bottom edges; top and left are derived from the already-filled
//! neighbors above and to the left.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shape of one piece edge.
///
/// Serialized as a signed integer: `-1` slot, `0` flat, `1` tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum EdgeKind {
    /// Indented inward.
    Slot,
    /// Straight border edge.
    Flat,
    /// Protruding outward.
    Tab,
}

impl EdgeKind {
    /// The edge kind the neighboring piece must have on the shared edge.
    #[must_use]
    pub const fn mate(self) -> Self {
        match self {
            Self::Slot => Self::Tab,
            Self::Flat => Self::Flat,
            Self::Tab => Self::Slot,
        }
    }

    /// `1.0` for a tab, `-1.0` for a slot, `0.0` for flat.
    ///
    /// Multiplies the outward normal when building the bump.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Slot => -1.0,
            Self::Flat => 0.0,
            Self::Tab => 1.0,
        }
    }

    /// Whether this edge is a straight line.
    #[must_use]
    pub const fn is_flat(self) -> bool {
        matches!(self, Self::Flat)
    }
}

impl From<EdgeKind> for i8 {
    fn from(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Slot => -1,
            EdgeKind::Flat => 0,
            EdgeKind::Tab => 1,
        }
    }
}

impl TryFrom<i8> for EdgeKind {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Slot),
            0 => Ok(Self::Flat),
            1 => Ok(Self::Tab),
            other => Err(format!("edge kind must be -1, 0 or 1, got {other}")),
        }
    }
}

/// One of a piece's four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

/// Edge kinds of a single piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceShape {
    /// Top edge.
    pub top: EdgeKind,
    /// Right edge.
    pub right: EdgeKind,
    /// Bottom edge.
    pub bottom: EdgeKind,
    /// Left edge.
    pub left: EdgeKind,
}

impl PieceShape {
    /// A piece with four flat edges (a 1x1 puzzle).
    pub const FLAT: Self = Self {
        top: EdgeKind::Flat,
        right: EdgeKind::Flat,
        bottom: EdgeKind::Flat,
        left: EdgeKind::Flat,
    };

    /// Edge kind on the given side.
    #[must_use]
    pub const fn edge(&self, side: Side) -> EdgeKind {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }
}

/// A rows x cols grid of piece shapes, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeGrid {
    rows: u32,
    cols: u32,
    cells: Vec<PieceShape>,
}

impl ShapeGrid {
    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Shape of the piece at `(row, col)`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, row: u32, col: u32) -> Option<&PieceShape> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(self.index(row, col))
    }

    /// All shapes in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[PieceShape] {
        &self.cells
    }

    /// Iterate `(row, col, shape)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &PieceShape)> + '_ {
        let cols = self.cols;
        (0..self.rows)
            .flat_map(move |row| (0..cols).map(move |col| (row, col)))
            .zip(self.cells.iter())
            .map(|((row, col), shape)| (row, col, shape))
    }

    /// Re-check the border and mating invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violation found.
    pub fn verify(&self) -> Result<(), String> {
        let expected = self.rows as usize * self.cols as usize;
        if self.cells.len() != expected {
            return Err(format!(
                "grid holds {} cells, expected {expected}",
                self.cells.len()
            ));
        }
        for (row, col, shape) in self.iter() {
            let borders = [
                (Side::Top, row == 0),
                (Side::Bottom, row + 1 == self.rows),
                (Side::Left, col == 0),
                (Side::Right, col + 1 == self.cols),
            ];
            for (side, on_border) in borders {
                let edge = shape.edge(side);
                if on_border && !edge.is_flat() {
                    return Err(format!("({row}, {col}) {side:?} border edge is {edge:?}"));
                }
                if !on_border && edge.is_flat() {
                    return Err(format!("({row}, {col}) {side:?} interior edge is flat"));
                }
            }
            if let Some(right) = self.get(row, col + 1)
                && shape.right != right.left.mate()
            {
                return Err(format!(
                    "({row}, {col}) right {:?} does not mate with left {:?}",
                    shape.right, right.left
                ));
            }
            if let Some(below) = self.get(row + 1, col)
                && shape.bottom != below.top.mate()
            {
                return Err(format!(
                    "({row}, {col}) bottom {:?} does not mate with top {:?}",
                    shape.bottom, below.top
                ));
            }
        }
        Ok(())
    }

    const fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }
}

/// Assign edge shapes for a `rows x cols` grid.
///
/// `rng` decides tab versus slot for every interior right and bottom
/// edge; the same generator state always yields the same grid.
pub fn assign_shapes<R: Rng + ?Sized>(rows: u32, cols: u32, rng: &mut R) -> ShapeGrid {
    let mut grid = ShapeGrid {
        rows,
        cols,
        cells: vec![PieceShape::FLAT; rows as usize * cols as usize],
    };

    for row in 0..rows {
        for col in 0..cols {
            let top = if row == 0 {
                EdgeKind::Flat
            } else {
                grid.cells[grid.index(row - 1, col)].bottom.mate()
            };
            let left = if col == 0 {
                EdgeKind::Flat
            } else {
                grid.cells[grid.index(row, col - 1)].right.mate()
            };
            let right = if col + 1 == cols {
                EdgeKind::Flat
            } else {
                random_bump(rng)
            };
            let bottom = if row + 1 == rows {
                EdgeKind::Flat
            } else {
                random_bump(rng)
            };
            let index = grid.index(row, col);
            grid.cells[index] = PieceShape {
                top,
                right,
                bottom,
                left,
            };
        }
    }

    debug_assert!(grid.verify().is_ok());
    log::debug!("shapes: assigned {rows}x{cols} grid");
    grid
}

fn random_bump<R: Rng + ?Sized>(rng: &mut R) -> EdgeKind {
    if rng.gen_bool(0.5) {
        EdgeKind::Tab
    } else {
        EdgeKind::Slot
    }
}
