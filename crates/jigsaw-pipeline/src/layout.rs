//! Layout planning: puzzle size and piece grid.
//!
//! Fits the source image into the caller's display bounds while
//! preserving its aspect ratio, then picks a rows x cols grid whose
//! cells are approximately square. The base grid size (difficulty) is
//! applied to the image's shorter axis; the longer axis gets
//! proportionally more pieces.

use serde::{Deserialize, Serialize};

use crate::types::{Bounds, Dimensions, Point, PuzzleError};

/// Output of the layout planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Rendered puzzle width in pixels.
    pub puzzle_width: f64,
    /// Rendered puzzle height in pixels.
    pub puzzle_height: f64,
    /// Number of piece rows.
    pub rows: u32,
    /// Number of piece columns.
    pub cols: u32,
    /// Width of one piece body (excluding tabs).
    pub piece_width: f64,
    /// Height of one piece body (excluding tabs).
    pub piece_height: f64,
}

impl Layout {
    /// Total number of pieces (`rows * cols`).
    #[must_use]
    pub const fn piece_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Tab protrusion in pixels for the given ratio.
    ///
    /// Based on the smaller piece dimension so tabs fit on both axes.
    #[must_use]
    pub fn tab_size(&self, tab_ratio: f64) -> f64 {
        self.piece_width.min(self.piece_height) * tab_ratio
    }

    /// Puzzle-global top-left corner of the piece body at `(row, col)`.
    #[must_use]
    pub fn body_origin(&self, row: u32, col: u32) -> Point {
        Point::new(
            f64::from(col) * self.piece_width,
            f64::from(row) * self.piece_height,
        )
    }
}

/// Plan the puzzle size and piece grid.
///
/// # Algorithm
///
/// 1. If the image is relatively wider than the container, the puzzle is
///    width-bound (`puzzle_width = max_width`); otherwise it is
///    height-bound (`puzzle_height = max_height`). The other axis follows
///    the image aspect ratio.
/// 2. Landscape or square images get `rows = grid_size` and
///    `cols = round(grid_size * aspect)`; portrait images get
///    `cols = grid_size` and `rows = round(grid_size / aspect)`.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidConfig`] if `grid_size` is zero, the
/// image has a zero dimension, or either bound is non-finite or not
/// positive.
pub fn plan_layout(
    image: Dimensions,
    bounds: Bounds,
    grid_size: u32,
) -> Result<Layout, PuzzleError> {
    if grid_size == 0 {
        return Err(PuzzleError::InvalidConfig(
            "grid_size must be at least 1".to_string(),
        ));
    }
    if image.width == 0 || image.height == 0 {
        return Err(PuzzleError::InvalidConfig(format!(
            "image must not be empty, got {}x{}",
            image.width, image.height,
        )));
    }
    let Bounds {
        max_width,
        max_height,
    } = bounds;
    if !(max_width.is_finite() && max_height.is_finite() && max_width > 0.0 && max_height > 0.0)
    {
        return Err(PuzzleError::InvalidConfig(format!(
            "display bounds must be finite and positive, got {max_width}x{max_height}",
        )));
    }

    let image_aspect = image.aspect();
    let container_aspect = max_width / max_height;

    let (puzzle_width, puzzle_height) = if image_aspect > container_aspect {
        (max_width, max_width / image_aspect)
    } else {
        (max_height * image_aspect, max_height)
    };

    let grid = f64::from(grid_size);
    let (rows, cols) = if image_aspect >= 1.0 {
        (grid_size, round_axis(grid * image_aspect))
    } else {
        (round_axis(grid / image_aspect), grid_size)
    };

    let layout = Layout {
        puzzle_width,
        puzzle_height,
        rows,
        cols,
        piece_width: puzzle_width / f64::from(cols),
        piece_height: puzzle_height / f64::from(rows),
    };
    log::debug!(
        "layout: image {}x{} -> puzzle {:.1}x{:.1}, grid {}x{} ({:.1}x{:.1} per piece)",
        image.width,
        image.height,
        layout.puzzle_width,
        layout.puzzle_height,
        layout.cols,
        layout.rows,
        layout.piece_width,
        layout.piece_height,
    );
    Ok(layout)
}

/// Round a piece count to the nearest integer, never below 1.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_axis(count: f64) -> u32 {
    (count.round() as u32).max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn square_image_in_square_container() {
        let layout = plan_layout(dims(300, 300), Bounds::new(300.0, 300.0), 3).unwrap();
        assert_eq!((layout.rows, layout.cols), (3, 3));
        assert_eq!(layout.piece_count(), 9);
        assert!((layout.puzzle_width - 300.0).abs() < EPS);
        assert!((layout.puzzle_height - 300.0).abs() < EPS);
        assert!((layout.piece_width - 100.0).abs() < EPS);
        assert!((layout.piece_height - 100.0).abs() < EPS);
    }

    #[test]
    fn landscape_image_is_width_bound() {
        let layout = plan_layout(dims(800, 400), Bounds::new(500.0, 500.0), 5).unwrap();
        assert!((layout.puzzle_width - 500.0).abs() < EPS);
        assert!((layout.puzzle_height - 250.0).abs() < EPS);
        assert_eq!(layout.rows, 5);
        assert_eq!(layout.cols, 10);
        assert_eq!(layout.piece_count(), 50);
        assert!((layout.piece_width - 50.0).abs() < EPS);
        assert!((layout.piece_height - 50.0).abs() < EPS);
    }

    #[test]
    fn portrait_image_is_height_bound() {
        let layout = plan_layout(dims(300, 600), Bounds::new(800.0, 400.0), 4).unwrap();
        assert!((layout.puzzle_height - 400.0).abs() < EPS);
        assert!((layout.puzzle_width - 200.0).abs() < EPS);
        assert_eq!(layout.cols, 4);
        assert_eq!(layout.rows, 8);
    }

    #[test]
    fn fit_respects_bounds_with_one_axis_equal() {
        let cases = [
            (dims(1920, 1080), Bounds::new(640.0, 480.0)),
            (dims(1080, 1920), Bounds::new(640.0, 480.0)),
            (dims(123, 457), Bounds::new(1000.0, 200.0)),
            (dims(999, 10), Bounds::new(50.0, 700.0)),
            (dims(640, 480), Bounds::new(640.0, 480.0)),
        ];
        for (image, bounds) in cases {
            let layout = plan_layout(image, bounds, 5).unwrap();
            assert!(layout.puzzle_width <= bounds.max_width + EPS);
            assert!(layout.puzzle_height <= bounds.max_height + EPS);
            let width_equal = (layout.puzzle_width - bounds.max_width).abs() < EPS;
            let height_equal = (layout.puzzle_height - bounds.max_height).abs() < EPS;
            assert!(
                width_equal || height_equal,
                "{image:?} in {bounds:?} touches neither bound: {layout:?}"
            );
            let aspect = layout.puzzle_width / layout.puzzle_height;
            assert!(
                (aspect - image.aspect()).abs() < 1e-6,
                "aspect {aspect} differs from image aspect {}",
                image.aspect()
            );
        }
    }

    #[test]
    fn pieces_are_roughly_square() {
        let layout = plan_layout(dims(1600, 900), Bounds::new(1600.0, 900.0), 10).unwrap();
        let ratio = layout.piece_width / layout.piece_height;
        assert!((0.9..=1.1).contains(&ratio), "piece ratio {ratio}");
    }

    #[test]
    fn extreme_portrait_still_has_one_column() {
        let layout = plan_layout(dims(10, 1000), Bounds::new(100.0, 100.0), 1).unwrap();
        assert_eq!(layout.cols, 1);
        assert_eq!(layout.rows, 100);
    }

    #[test]
    fn zero_grid_is_rejected() {
        let result = plan_layout(dims(10, 10), Bounds::new(10.0, 10.0), 0);
        assert!(matches!(result, Err(PuzzleError::InvalidConfig(_))));
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        for bounds in [
            Bounds::new(0.0, 100.0),
            Bounds::new(100.0, -1.0),
            Bounds::new(f64::INFINITY, 100.0),
            Bounds::new(f64::NAN, 100.0),
        ] {
            let result = plan_layout(dims(10, 10), bounds, 3);
            assert!(
                matches!(result, Err(PuzzleError::InvalidConfig(_))),
                "{bounds:?} should be rejected"
            );
        }
    }

    #[test]
    fn tab_size_uses_smaller_piece_side() {
        let layout = Layout {
            puzzle_width: 300.0,
            puzzle_height: 200.0,
            rows: 2,
            cols: 2,
            piece_width: 150.0,
            piece_height: 100.0,
        };
        assert!((layout.tab_size(0.2) - 20.0).abs() < EPS);
        assert_eq!(layout.body_origin(1, 1), Point::new(150.0, 100.0));
    }
}
