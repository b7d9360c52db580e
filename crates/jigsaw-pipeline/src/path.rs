//! Piece outline construction.
//!
//! A piece outline is plain data: a start point followed by line and
//! cubic Bezier segments, implicitly closed back to the start. Nothing
//! here knows about rasterization; [`crate::raster`] replays the segments
//! into a drawing path and `jigsaw-export` writes them as SVG.
//!
//! Coordinates are piece-local. The body rectangle occupies
//! `[tab, tab + piece_width] x [tab, tab + piece_height]`, leaving a
//! `tab`-wide margin on every side for outward tabs.

use serde::{Deserialize, Serialize};

use crate::shape::{EdgeKind, PieceShape};
use crate::types::Point;

/// Neck width as a fraction of the edge length.
const NECK_RATIO: f64 = 0.2;

/// How far along the neck (in neck half-widths) the first control point
/// sits. Keeps the bump tangent to the straight edge where it starts.
const NECK_PULL: f64 = 0.5;

/// Spread of the control points level with the apex, in neck
/// half-widths from the edge midpoint. At 3 the rounded head is about
/// 1.5 times as wide as the neck.
const HEAD_SPREAD: f64 = 3.0;

/// One drawing command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    /// Straight line to `to`.
    Line {
        /// End point.
        to: Point,
    },
    /// Cubic Bezier curve to `to`.
    Cubic {
        /// First control point.
        ctrl1: Point,
        /// Second control point.
        ctrl2: Point,
        /// End point.
        to: Point,
    },
}

impl Segment {
    /// End point of the segment.
    #[must_use]
    pub const fn end(&self) -> Point {
        match *self {
            Self::Line { to } | Self::Cubic { to, .. } => to,
        }
    }

    #[must_use]
    fn translated(self, dx: f64, dy: f64) -> Self {
        match self {
            Self::Line { to } => Self::Line {
                to: to.offset(dx, dy),
            },
            Self::Cubic { ctrl1, ctrl2, to } => Self::Cubic {
                ctrl1: ctrl1.offset(dx, dy),
                ctrl2: ctrl2.offset(dx, dy),
                to: to.offset(dx, dy),
            },
        }
    }
}

/// A closed piece outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecePath {
    /// First point of the outline.
    pub start: Point,
    /// Segments in drawing order. The outline closes back to `start`.
    pub segments: Vec<Segment>,
}

impl PiecePath {
    /// The same outline shifted by `(dx, dy)`.
    ///
    /// Used to move a piece-local outline into puzzle-global
    /// coordinates.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            start: self.start.offset(dx, dy),
            segments: self
                .segments
                .iter()
                .map(|seg| seg.translated(dx, dy))
                .collect(),
        }
    }

    /// Every point of the outline in drawing order: the start point, then
    /// each segment's control points and end point.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.start).chain(self.segments.iter().flat_map(|seg| {
            let points: Vec<Point> = match *seg {
                Segment::Line { to } => vec![to],
                Segment::Cubic { ctrl1, ctrl2, to } => vec![ctrl1, ctrl2, to],
            };
            points
        }))
    }

    /// Axis-aligned bounding box of all points, as `(min, max)`.
    ///
    /// Each cubic lies inside the convex hull of its control points, so
    /// this box contains the whole outline.
    #[must_use]
    pub fn bounds(&self) -> (Point, Point) {
        self.points().fold((self.start, self.start), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        })
    }
}

/// Segments for one edge walked from `from` to `to`.
///
/// A flat edge is a single line. A tab or slot edge is a straight neck,
/// two mirrored cubics forming the rounded bump with its apex `tab`
/// pixels from the edge line (outward for a tab, inward for a slot),
/// and a straight neck to `to`. Outward is the left-hand normal of the
/// walk direction in a y-down coordinate system, i.e. away from the
/// body when edges are walked clockwise.
#[must_use]
pub fn edge_segments(from: Point, to: Point, kind: EdgeKind, tab: f64) -> Vec<Segment> {
    if kind.is_flat() {
        return vec![Segment::Line { to }];
    }

    let length = from.distance(to);
    let (dx, dy) = ((to.x - from.x) / length, (to.y - from.y) / length);
    let (nx, ny) = (dy, -dx);
    let height = kind.sign() * tab;
    let local = |u: f64, v: f64| {
        Point::new(
            nx.mul_add(v, dx.mul_add(u, from.x)),
            ny.mul_add(v, dy.mul_add(u, from.y)),
        )
    };

    let mid = length / 2.0;
    let neck = length * NECK_RATIO / 2.0;

    vec![
        Segment::Line {
            to: local(mid - neck, 0.0),
        },
        Segment::Cubic {
            ctrl1: local(NECK_PULL.mul_add(-neck, mid), 0.0),
            ctrl2: local(HEAD_SPREAD.mul_add(-neck, mid), height),
            to: local(mid, height),
        },
        Segment::Cubic {
            ctrl1: local(HEAD_SPREAD.mul_add(neck, mid), height),
            ctrl2: local(NECK_PULL.mul_add(neck, mid), 0.0),
            to: local(mid + neck, 0.0),
        },
        Segment::Line { to },
    ]
}

/// Build the closed outline of one piece on its local canvas.
///
/// Edges are walked clockwise starting at the body's top-left corner:
/// top (left to right), right (top to bottom), bottom (right to left),
/// left (bottom to top).
#[must_use]
pub fn piece_path(shape: &PieceShape, piece_width: f64, piece_height: f64, tab: f64) -> PiecePath {
    let top_left = Point::new(tab, tab);
    let top_right = Point::new(tab + piece_width, tab);
    let bottom_right = Point::new(tab + piece_width, tab + piece_height);
    let bottom_left = Point::new(tab, tab + piece_height);

    let mut segments = Vec::with_capacity(16);
    segments.extend(edge_segments(top_left, top_right, shape.top, tab));
    segments.extend(edge_segments(top_right, bottom_right, shape.right, tab));
    segments.extend(edge_segments(bottom_right, bottom_left, shape.bottom, tab));
    segments.extend(edge_segments(bottom_left, top_left, shape.left, tab));

    PiecePath {
        start: top_left,
        segments,
    }
}
