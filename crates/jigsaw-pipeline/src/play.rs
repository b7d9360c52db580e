//! Play-state model: where each piece currently is, whether it has been
//! snapped into place, and stacking order.
//!
//! A [`Board`] owns one mutable [`PieceState`] per immutable
//! [`PieceDefinition`](crate::PieceDefinition), joined by id. Any
//! front end (pointer events, keyboard, a test) drives it through
//! [`Board::pick`] and [`Board::drop_piece`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::piece::Puzzle;
use crate::types::{Bounds, Point};

/// Default distance in pixels within which a dropped piece snaps into
/// place.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 20.0;

/// Mutable state of one piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceState {
    /// Id of the matching piece definition.
    pub id: usize,
    /// Current canvas top-left in puzzle-global coordinates.
    pub position: Point,
    /// Snapped into its correct position; no longer movable.
    pub locked: bool,
    /// Stacking order. Higher values draw on top.
    pub z_order: usize,
}

/// Result of dropping a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropOutcome {
    /// Left where it was dropped.
    Placed,
    /// Snapped to its correct position and locked.
    Locked,
    /// Snapped and locked, and it was the last piece.
    Completed,
    /// Unknown id or the piece was already locked.
    Ignored,
}

/// Play state of a whole puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    states: Vec<PieceState>,
    targets: Vec<Point>,
    sizes: Vec<(f64, f64)>,
    next_z: usize,
    completed: bool,
}

impl Board {
    /// Fresh board: every piece at the origin, unlocked, stacked by id.
    #[must_use]
    pub fn new(puzzle: &Puzzle) -> Self {
        let states = puzzle
            .pieces
            .iter()
            .map(|piece| PieceState {
                id: piece.id,
                position: Point::ORIGIN,
                locked: false,
                z_order: piece.id,
            })
            .collect();
        Self {
            states,
            targets: puzzle.pieces.iter().map(|p| p.correct_position).collect(),
            sizes: puzzle.pieces.iter().map(|p| (p.width, p.height)).collect(),
            next_z: puzzle.pieces.len(),
            completed: false,
        }
    }

    /// Place every unlocked piece at a random position inside `area`.
    ///
    /// A piece canvas lies fully inside the area when it fits; a piece
    /// larger than the area is pinned to the area's left or top edge.
    ///
    /// Returns `false` and moves nothing when the area is not finite and
    /// positive.
    pub fn scatter<R: Rng + ?Sized>(&mut self, area: Bounds, rng: &mut R) -> bool {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !(usable(area.max_width) && usable(area.max_height)) {
            log::warn!("scatter: unusable area {area:?}");
            return false;
        }
        for (state, &(width, height)) in self.states.iter_mut().zip(&self.sizes) {
            if state.locked {
                continue;
            }
            let max_x = (area.max_width - width).max(0.0);
            let max_y = (area.max_height - height).max(0.0);
            state.position = Point::new(rng.gen_range(0.0..=max_x), rng.gen_range(0.0..=max_y));
        }
        log::debug!("scatter: {} pieces over {area:?}", self.states.len());
        true
    }

    /// Raise a piece to the top of the draw order.
    ///
    /// Returns `false` for unknown or locked pieces.
    pub fn pick(&mut self, id: usize) -> bool {
        let next_z = self.next_z;
        match self.states.get_mut(id) {
            Some(state) if !state.locked => {
                state.z_order = next_z;
                self.next_z += 1;
                true
            }
            _ => false,
        }
    }

    /// Move an unlocked piece without snapping (e.g. while dragging).
    ///
    /// Returns `false` for unknown or locked pieces and non-finite
    /// positions.
    pub fn move_piece(&mut self, id: usize, position: Point) -> bool {
        if !position.is_finite() {
            return false;
        }
        match self.states.get_mut(id) {
            Some(state) if !state.locked => {
                state.position = position;
                true
            }
            _ => false,
        }
    }

    /// Drop a piece at `position`.
    ///
    /// Within `tolerance` of its correct position (Euclidean distance,
    /// inclusive) the piece snaps exactly into place and locks. Otherwise
    /// it stays where it was dropped. A non-finite position or a NaN
    /// tolerance is ignored.
    pub fn drop_piece(&mut self, id: usize, position: Point, tolerance: f64) -> DropOutcome {
        if !position.is_finite() || tolerance.is_nan() {
            return DropOutcome::Ignored;
        }
        let Some(&target) = self.targets.get(id) else {
            return DropOutcome::Ignored;
        };
        let Some(state) = self.states.get_mut(id) else {
            return DropOutcome::Ignored;
        };
        if state.locked {
            return DropOutcome::Ignored;
        }

        if position.distance(target) > tolerance {
            state.position = position;
            return DropOutcome::Placed;
        }

        state.position = target;
        state.locked = true;
        log::debug!("piece {id} locked");

        if !self.completed && self.is_complete() {
            self.completed = true;
            log::info!("puzzle completed ({} pieces)", self.states.len());
            DropOutcome::Completed
        } else {
            DropOutcome::Locked
        }
    }

    /// Whether every piece is locked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|s| s.locked)
    }

    /// Number of locked pieces.
    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.states.iter().filter(|s| s.locked).count()
    }

    /// State of the piece with the given id.
    #[must_use]
    pub fn piece(&self, id: usize) -> Option<&PieceState> {
        self.states.get(id)
    }

    /// All piece states in id order.
    #[must_use]
    pub fn pieces(&self) -> &[PieceState] {
        &self.states
    }

    /// Piece ids from bottom to top.
    #[must_use]
    pub fn draw_order(&self) -> Vec<usize> {
        let mut order: Vec<&PieceState> = self.states.iter().collect();
        order.sort_by_key(|s| s.z_order);
        order.into_iter().map(|s| s.id).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::layout::Layout;
    use crate::path::piece_path;
    use crate::piece::PieceDefinition;
    use crate::shape::assign_shapes;
    use crate::types::RgbaImage;

    /// A puzzle of 50px pieces with 10px tabs; rasters are left empty.
    fn puzzle(rows: u32, cols: u32) -> Puzzle {
        let (pw, ph, tab) = (50.0, 50.0, 10.0);
        let layout = Layout {
            puzzle_width: pw * f64::from(cols),
            puzzle_height: ph * f64::from(rows),
            rows,
            cols,
            piece_width: pw,
            piece_height: ph,
        };
        let shapes = assign_shapes(rows, cols, &mut Pcg32::seed_from_u64(0));
        let pieces = shapes
            .iter()
            .map(|(row, col, shape)| PieceDefinition {
                id: (row * cols + col) as usize,
                row,
                col,
                shape: *shape,
                width: pw + 2.0 * tab,
                height: ph + 2.0 * tab,
                correct_position: layout.body_origin(row, col).offset(-tab, -tab),
                path: piece_path(shape, pw, ph, tab),
                image: RgbaImage::new(1, 1),
            })
            .collect();
        Puzzle {
            pieces,
            puzzle_width: layout.puzzle_width,
            puzzle_height: layout.puzzle_height,
            layout,
            shapes,
            tab_size: tab,
            seed: Some(0),
        }
    }

    #[test]
    fn new_board_starts_at_origin_stacked_by_id() {
        let board = Board::new(&puzzle(2, 2));
        for (i, state) in board.pieces().iter().enumerate() {
            assert_eq!(state.id, i);
            assert_eq!(state.position, Point::ORIGIN);
            assert!(!state.locked);
            assert_eq!(state.z_order, i);
        }
        assert_eq!(board.draw_order(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn drop_within_tolerance_snaps_and_locks() {
        let mut board = Board::new(&puzzle(2, 2));
        // Piece 3 belongs at (40, 40).
        let outcome = board.drop_piece(3, Point::new(52.0, 49.0), DEFAULT_SNAP_TOLERANCE);
        assert_eq!(outcome, DropOutcome::Locked);
        let state = board.piece(3).unwrap();
        assert!(state.locked);
        assert_eq!(state.position, Point::new(40.0, 40.0));
    }

    #[test]
    fn drop_exactly_at_tolerance_snaps() {
        let mut board = Board::new(&puzzle(1, 2));
        let outcome = board.drop_piece(0, Point::new(-10.0, 10.0), 20.0);
        assert_eq!(outcome, DropOutcome::Locked);
    }

    #[test]
    fn drop_beyond_tolerance_stays_unlocked() {
        let mut board = Board::new(&puzzle(2, 2));
        let dropped = Point::new(200.0, 5.0);
        let outcome = board.drop_piece(1, dropped, DEFAULT_SNAP_TOLERANCE);
        assert_eq!(outcome, DropOutcome::Placed);
        let state = board.piece(1).unwrap();
        assert!(!state.locked);
        assert_eq!(state.position, dropped);
    }

    #[test]
    fn locked_pieces_ignore_further_input() {
        let mut board = Board::new(&puzzle(1, 2));
        board.drop_piece(0, Point::new(-10.0, -10.0), 1.0);
        assert_eq!(
            board.drop_piece(0, Point::new(300.0, 300.0), 1.0),
            DropOutcome::Ignored
        );
        assert!(!board.pick(0));
        assert!(!board.move_piece(0, Point::ORIGIN));
        assert_eq!(board.piece(0).unwrap().position, Point::new(-10.0, -10.0));
    }

    #[test]
    fn completion_is_reported_exactly_once() {
        let puzzle = puzzle(2, 3);
        let mut board = Board::new(&puzzle);
        let mut completions = 0;
        for piece in &puzzle.pieces {
            // Miss first, then hit.
            board.drop_piece(piece.id, piece.correct_position.offset(100.0, 0.0), 5.0);
            if board.drop_piece(piece.id, piece.correct_position, 5.0) == DropOutcome::Completed {
                completions += 1;
            }
            assert_eq!(board.drop_piece(piece.id, Point::ORIGIN, 5.0), DropOutcome::Ignored);
        }
        assert_eq!(completions, 1);
        assert!(board.is_complete());
        assert_eq!(board.locked_count(), 6);
    }

    #[test]
    fn single_piece_completes_on_first_lock() {
        let mut board = Board::new(&puzzle(1, 1));
        assert_eq!(
            board.drop_piece(0, Point::new(-10.0, -10.0), 0.0),
            DropOutcome::Completed
        );
    }

    #[test]
    fn non_finite_drops_are_ignored() {
        let mut board = Board::new(&puzzle(1, 1));
        let nan = Point::new(f64::NAN, f64::NAN);
        assert_eq!(board.drop_piece(0, nan, DEFAULT_SNAP_TOLERANCE), DropOutcome::Ignored);
        let inf = Point::new(f64::INFINITY, -10.0);
        assert_eq!(board.drop_piece(0, inf, DEFAULT_SNAP_TOLERANCE), DropOutcome::Ignored);
        assert_eq!(
            board.drop_piece(0, Point::new(-10.0, -10.0), f64::NAN),
            DropOutcome::Ignored
        );
        assert!(!board.move_piece(0, nan));
        let state = board.piece(0).unwrap();
        assert!(!state.locked);
        assert_eq!(state.position, Point::ORIGIN);
        assert!(!board.is_complete());
    }

    #[test]
    fn unknown_piece_is_ignored() {
        let mut board = Board::new(&puzzle(1, 1));
        assert_eq!(board.drop_piece(5, Point::ORIGIN, 10.0), DropOutcome::Ignored);
        assert!(!board.pick(5));
        assert!(board.piece(5).is_none());
    }

    #[test]
    fn pick_raises_to_top() {
        let mut board = Board::new(&puzzle(2, 2));
        assert!(board.pick(1));
        assert!(board.pick(0));
        assert_eq!(board.draw_order(), vec![2, 3, 1, 0]);
    }

    #[test]
    fn scatter_keeps_pieces_inside_area() {
        let mut board = Board::new(&puzzle(3, 3));
        board.drop_piece(4, Point::new(40.0, 40.0), 1.0);
        let area = Bounds::new(400.0, 300.0);
        assert!(board.scatter(area, &mut Pcg32::seed_from_u64(11)));
        for state in board.pieces() {
            if state.id == 4 {
                assert_eq!(state.position, Point::new(40.0, 40.0));
                continue;
            }
            assert!(state.position.x >= 0.0 && state.position.x + 70.0 <= 400.0);
            assert!(state.position.y >= 0.0 && state.position.y + 70.0 <= 300.0);
        }
    }

    #[test]
    fn scatter_pins_oversized_pieces() {
        let mut board = Board::new(&puzzle(1, 1));
        assert!(board.scatter(Bounds::new(30.0, 30.0), &mut Pcg32::seed_from_u64(1)));
        assert_eq!(board.piece(0).unwrap().position, Point::ORIGIN);
    }

    #[test]
    fn scatter_rejects_unusable_areas() {
        let mut board = Board::new(&puzzle(2, 2));
        board.move_piece(1, Point::new(5.0, 6.0));
        let mut rng = Pcg32::seed_from_u64(2);
        for area in [
            Bounds::new(f64::INFINITY, 100.0),
            Bounds::new(100.0, f64::NAN),
            Bounds::new(0.0, 100.0),
            Bounds::new(100.0, -1.0),
        ] {
            assert!(!board.scatter(area, &mut rng), "{area:?}");
        }
        assert_eq!(board.piece(1).unwrap().position, Point::new(5.0, 6.0));
    }
}
