//! jigsaw-pipeline: Pure jigsaw puzzle generation engine (sans-IO).
//!
//! Cuts a raster image into interlocking pieces through:
//! decode -> layout planning -> edge-shape assignment -> outline
//! construction -> per-piece rasterization (clip, border, bevel).
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. File and async loading lives
//! in `jigsaw-io`; PNG, SVG and manifest serialization in
//! `jigsaw-export`.

pub mod bevel;
pub mod decode;
pub mod diagnostics;
pub mod layout;
pub mod path;
pub mod piece;
pub mod pipeline;
pub mod play;
pub mod raster;
pub mod shape;
pub mod types;

pub use diagnostics::{Clock, PipelineDiagnostics, StageDiagnostics, StageMetrics, SystemClock};
pub use layout::{Layout, plan_layout};
pub use path::{PiecePath, Segment, piece_path};
pub use piece::{PieceDefinition, PieceInfo, Puzzle};
pub use pipeline::{Pipeline, PipelineStage};
pub use play::{Board, DEFAULT_SNAP_TOLERANCE, DropOutcome, PieceState};
pub use shape::{EdgeKind, PieceShape, ShapeGrid, Side, assign_shapes};
pub use types::{
    BevelStyle, BorderStyle, Bounds, Difficulty, Dimensions, Point, PuzzleConfig, PuzzleError,
    RenderStyle, RgbaImage,
};

use diagnostics::PipelineSummary;

/// Generate a complete puzzle.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP), a configuration and
/// the display bounds the puzzle must fit into.
///
/// # Pipeline steps
///
/// 1. Validate the config and decode the image
/// 2. Fit the puzzle into `bounds` and choose the piece grid
/// 3. Assign tab/slot/flat edges (seeded from `config.seed`)
/// 4. Build each piece outline and rasterize it
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidConfig`] for an unusable config or
/// bounds, [`PuzzleError::EmptyInput`] / [`PuzzleError::ImageDecode`]
/// when the image cannot be read, and
/// [`PuzzleError::RasterContextUnavailable`] /
/// [`PuzzleError::DegeneratePath`] when a piece cannot be drawn. No
/// partial puzzle is ever returned.
pub fn generate(
    image_bytes: &[u8],
    config: &PuzzleConfig,
    bounds: Bounds,
) -> Result<Puzzle, PuzzleError> {
    let puzzle = Pipeline::new(image_bytes.to_vec(), config.clone())
        .decode()?
        .plan(bounds)?
        .assign_shapes()
        .rasterize()?
        .into_puzzle();
    log::info!(
        "generated {} pieces ({}x{}) at {:.0}x{:.0}",
        puzzle.pieces.len(),
        puzzle.layout.cols,
        puzzle.layout.rows,
        puzzle.puzzle_width,
        puzzle.puzzle_height,
    );
    Ok(puzzle)
}

/// Generate a puzzle and collect per-stage timing and metrics.
///
/// Produces the same puzzle as [`generate`] for the same seed.
///
/// # Errors
///
/// Same as [`generate`].
pub fn generate_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PuzzleConfig,
    bounds: Bounds,
    clock: &C,
) -> Result<(Puzzle, PipelineDiagnostics), PuzzleError> {
    let start = clock.now();

    let t = clock.now();
    let decoded = Pipeline::new(image_bytes.to_vec(), config.clone()).decode()?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(t),
        metrics: decoded.metrics(),
    };

    let t = clock.now();
    let planned = decoded.plan(bounds)?;
    let layout = StageDiagnostics {
        duration: clock.elapsed(t),
        metrics: planned.metrics(),
    };

    let t = clock.now();
    let shaped = planned.assign_shapes();
    let shapes = StageDiagnostics {
        duration: clock.elapsed(t),
        metrics: shaped.metrics(),
    };

    let t = clock.now();
    let rasterized = shaped.rasterize()?;
    let rasterize = StageDiagnostics {
        duration: clock.elapsed(t),
        metrics: rasterized.metrics(),
    };

    let dimensions = rasterized.dimensions();
    let puzzle = rasterized.into_puzzle();
    let diagnostics = PipelineDiagnostics {
        decode,
        layout,
        shapes,
        rasterize,
        total_duration: clock.elapsed(start),
        summary: PipelineSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            piece_count: puzzle.pieces.len(),
            raster_pixels: puzzle.raster_pixels(),
        },
    };
    log::info!(
        "generated {} pieces in {:.3}ms",
        puzzle.pieces.len(),
        diagnostics.total_duration.as_secs_f64() * 1000.0,
    );
    Ok((puzzle, diagnostics))
}
