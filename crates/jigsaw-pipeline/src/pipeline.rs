//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::generate`] which runs every stage in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use jigsaw_pipeline::{Bounds, Pipeline, PuzzleConfig, PuzzleError};
//! # fn run(png: Vec<u8>) -> Result<(), PuzzleError> {
//! let config = PuzzleConfig::default();
//! let planned = Pipeline::new(png, config)
//!     .decode()?
//!     .plan(Bounds::new(800.0, 600.0))?;
//! println!("{} pieces", planned.layout().piece_count());
//!
//! let puzzle = planned.assign_shapes().rasterize()?.into_puzzle();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying the previously computed
//! intermediates forward. Shape assignment is infallible; decoding,
//! planning and rasterization can fail.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::diagnostics::StageMetrics;
use crate::layout::{Layout, plan_layout};
use crate::piece::{PieceDefinition, Puzzle};
use crate::shape::{EdgeKind, ShapeGrid};
use crate::types::{Bounds, Dimensions, PuzzleConfig, PuzzleError, RgbaImage};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing: call .decode() to continue"]
pub struct Pending {
    config: PuzzleConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Validate the configuration, decode the source image and advance
    /// to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidConfig`] for an unusable config,
    /// [`PuzzleError::EmptyInput`] if the source bytes are empty and
    /// [`PuzzleError::ImageDecode`] if the data cannot be decoded.
    pub fn decode(self) -> Result<Decoded, PuzzleError> {
        self.config.validate()?;
        let source_len = self.source.len();
        let image = crate::decode::decode(&self.source)?;
        log::debug!(
            "decode: {source_len} bytes -> {}x{}",
            image.width(),
            image.height()
        );
        Ok(Decoded {
            config: self.config,
            image,
            source_len,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding the source image.
#[must_use = "pipeline stages are consumed by advancing: call .plan() to continue"]
pub struct Decoded {
    config: PuzzleConfig,
    image: RgbaImage,
    source_len: usize,
}

impl Decoded {
    /// The decoded source image.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Source image dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        crate::decode::dimensions(&self.image)
    }

    /// Fit the image into `bounds` and choose the piece grid.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidConfig`] for degenerate bounds.
    pub fn plan(self, bounds: Bounds) -> Result<Planned, PuzzleError> {
        let layout = plan_layout(self.dimensions(), bounds, self.config.grid_size)?;
        let tab_size = layout.tab_size(self.config.tab_ratio);
        Ok(Planned {
            config: self.config,
            image: self.image,
            source_len: self.source_len,
            layout,
            tab_size,
        })
    }
}

// ───────────────────────── Stage 2: Planned ──────────────────────────

/// Pipeline state after layout planning.
#[must_use = "pipeline stages are consumed by advancing: call .assign_shapes() to continue"]
pub struct Planned {
    config: PuzzleConfig,
    image: RgbaImage,
    source_len: usize,
    layout: Layout,
    tab_size: f64,
}

impl Planned {
    /// The planned layout.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Tab protrusion in pixels.
    #[must_use]
    pub const fn tab_size(&self) -> f64 {
        self.tab_size
    }

    /// Assign edge shapes using the configured seed.
    ///
    /// Without a configured seed a fresh one is drawn; the seed actually
    /// used is recorded on the resulting puzzle.
    pub fn assign_shapes(self) -> Shaped {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut shaped = self.assign_shapes_with(&mut rng);
        shaped.seed = Some(seed);
        shaped
    }

    /// Assign edge shapes with a caller-supplied random source.
    pub fn assign_shapes_with<R: Rng + ?Sized>(self, rng: &mut R) -> Shaped {
        let shapes = crate::shape::assign_shapes(self.layout.rows, self.layout.cols, rng);
        Shaped {
            config: self.config,
            image: self.image,
            source_len: self.source_len,
            layout: self.layout,
            tab_size: self.tab_size,
            shapes,
            seed: None,
        }
    }
}

// ───────────────────────── Stage 3: Shaped ───────────────────────────

/// Pipeline state after edge-shape assignment.
#[must_use = "pipeline stages are consumed by advancing: call .rasterize() to continue"]
pub struct Shaped {
    config: PuzzleConfig,
    image: RgbaImage,
    source_len: usize,
    layout: Layout,
    tab_size: f64,
    shapes: ShapeGrid,
    seed: Option<u64>,
}

impl Shaped {
    /// The assigned shape grid.
    #[must_use]
    pub const fn shapes(&self) -> &ShapeGrid {
        &self.shapes
    }

    /// Seed the shapes were drawn from, if known.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Cut every piece out of the source image.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::RasterContextUnavailable`] or
    /// [`PuzzleError::DegeneratePath`] for the first piece that cannot
    /// be drawn.
    pub fn rasterize(self) -> Result<Rasterized, PuzzleError> {
        let pieces = crate::raster::rasterize_pieces(
            &self.image,
            &self.layout,
            &self.shapes,
            self.tab_size,
            &self.config.style,
        )?;
        Ok(Rasterized {
            source_len: self.source_len,
            dimensions: crate::decode::dimensions(&self.image),
            layout: self.layout,
            tab_size: self.tab_size,
            shapes: self.shapes,
            seed: self.seed,
            pieces,
        })
    }
}

// ───────────────────────── Stage 4: Rasterized ───────────────────────

/// Final pipeline state: every piece has been drawn.
///
/// The source image is dropped here; only the piece rasters remain.
#[must_use = "call .into_puzzle() to take the generated puzzle"]
pub struct Rasterized {
    source_len: usize,
    dimensions: Dimensions,
    layout: Layout,
    tab_size: f64,
    shapes: ShapeGrid,
    seed: Option<u64>,
    pieces: Vec<PieceDefinition>,
}

impl Rasterized {
    /// The generated pieces.
    #[must_use]
    pub fn pieces(&self) -> &[PieceDefinition] {
        &self.pieces
    }

    /// Consume the pipeline and return the finished puzzle.
    pub fn into_puzzle(self) -> Puzzle {
        Puzzle {
            pieces: self.pieces,
            puzzle_width: self.layout.puzzle_width,
            puzzle_height: self.layout.puzzle_height,
            layout: self.layout,
            shapes: self.shapes,
            tab_size: self.tab_size,
            seed: self.seed,
        }
    }
}

// ───────────────────────── Stage metadata ────────────────────────────

/// Trait implemented by every pipeline stage that has done work.
pub trait PipelineStage {
    /// Human-readable name of this stage (e.g. `"decode"`).
    const NAME: &str;

    /// Position of this stage in the pipeline. [`Pending`] is stage 0.
    const INDEX: usize;

    /// Metrics describing the work done to reach this state.
    fn metrics(&self) -> StageMetrics;
}

impl PipelineStage for Decoded {
    const NAME: &str = "decode";
    const INDEX: usize = 1;

    fn metrics(&self) -> StageMetrics {
        let Dimensions { width, height } = self.dimensions();
        StageMetrics::Decode {
            input_bytes: self.source_len,
            width,
            height,
            pixel_count: u64::from(width) * u64::from(height),
        }
    }
}

impl PipelineStage for Planned {
    const NAME: &str = "layout";
    const INDEX: usize = 2;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Layout {
            puzzle_width: self.layout.puzzle_width,
            puzzle_height: self.layout.puzzle_height,
            rows: self.layout.rows,
            cols: self.layout.cols,
            piece_width: self.layout.piece_width,
            piece_height: self.layout.piece_height,
            tab_size: self.tab_size,
        }
    }
}

impl PipelineStage for Shaped {
    const NAME: &str = "shapes";
    const INDEX: usize = 3;

    fn metrics(&self) -> StageMetrics {
        let count = |kind: EdgeKind| {
            self.shapes
                .cells()
                .iter()
                .flat_map(|s| [s.top, s.right, s.bottom, s.left])
                .filter(|&edge| edge == kind)
                .count()
        };
        StageMetrics::Shapes {
            rows: self.shapes.rows(),
            cols: self.shapes.cols(),
            seed: self.seed,
            tab_edges: count(EdgeKind::Tab),
            slot_edges: count(EdgeKind::Slot),
            flat_edges: count(EdgeKind::Flat),
        }
    }
}

impl PipelineStage for Rasterized {
    const NAME: &str = "rasterize";
    const INDEX: usize = 4;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Rasterize {
            piece_count: self.pieces.len(),
            canvas_width: 2.0f64.mul_add(self.tab_size, self.layout.piece_width),
            canvas_height: 2.0f64.mul_add(self.tab_size, self.layout.piece_height),
            total_pixels: self
                .pieces
                .iter()
                .map(|p| u64::from(p.image.width()) * u64::from(p.image.height()))
                .sum(),
        }
    }
}

impl Rasterized {
    /// Source image dimensions the pieces were cut from.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Size of the encoded source image in bytes.
    #[must_use]
    pub const fn source_len(&self) -> usize {
        self.source_len
    }
}

/// Entry point for the staged pipeline.
///
/// # Example
///
/// ```rust
/// # use jigsaw_pipeline::{Pipeline, PuzzleConfig};
/// let pending = Pipeline::new(vec![], PuzzleConfig::default());
/// assert!(pending.decode().is_err());
/// ```
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from source image bytes and config.
    ///
    /// No processing is performed; the bytes and config are stored until
    /// [`.decode()`](Pending::decode) is called.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: PuzzleConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }
}
