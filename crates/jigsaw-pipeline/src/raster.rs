//! Piece rasterization.
//!
//! Each piece gets its own canvas (piece size plus a tab margin on every
//! side). The canvas is clipped to the piece outline, the whole source
//! image is drawn scaled to the puzzle size and shifted so that the
//! piece's region lands under the clip, then the outline is stroked and
//! the bevel applied. Adjacent pieces therefore share pixel content
//! exactly along their common edge.
//!
//! Drawing uses `tiny-skia`, which works in premultiplied RGBA. The
//! finished canvas is converted back to straight alpha.

use image::GrayImage;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::bevel;
use crate::layout::Layout;
use crate::path::{PiecePath, Segment, piece_path};
use crate::piece::PieceDefinition;
use crate::shape::ShapeGrid;
use crate::types::{BorderStyle, Point, PuzzleError, RenderStyle, RgbaImage};

/// Source image prepared for repeated drawing.
///
/// Converting to premultiplied pixels once avoids redoing it per piece.
pub struct PreparedSource {
    pixmap: Pixmap,
    scale_x: f32,
    scale_y: f32,
}

impl PreparedSource {
    /// Prepare `source` to be drawn at the puzzle size in `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidConfig`] if the source has a zero
    /// dimension.
    pub fn new(source: &RgbaImage, layout: &Layout) -> Result<Self, PuzzleError> {
        let (width, height) = source.dimensions();
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            return Err(PuzzleError::InvalidConfig(format!(
                "source image must not be empty, got {width}x{height}"
            )));
        };
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(source.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        #[allow(clippy::cast_possible_truncation)]
        let (scale_x, scale_y) = (
            (layout.puzzle_width / f64::from(width)) as f32,
            (layout.puzzle_height / f64::from(height)) as f32,
        );
        Ok(Self {
            pixmap,
            scale_x,
            scale_y,
        })
    }
}

/// Rasterize every piece of the puzzle.
///
/// Pieces are produced in row-major order, so `pieces[id].id == id`.
///
/// # Errors
///
/// Fails on the first piece that cannot be drawn. No partial result is
/// returned.
pub fn rasterize_pieces(
    source: &RgbaImage,
    layout: &Layout,
    shapes: &ShapeGrid,
    tab_size: f64,
    style: &RenderStyle,
) -> Result<Vec<PieceDefinition>, PuzzleError> {
    let prepared = PreparedSource::new(source, layout)?;
    let cols = layout.cols as usize;

    let pieces = shapes
        .iter()
        .map(|(row, col, shape)| {
            let path = piece_path(shape, layout.piece_width, layout.piece_height, tab_size);
            let correct_position = layout.body_origin(row, col).offset(-tab_size, -tab_size);
            let width = 2.0f64.mul_add(tab_size, layout.piece_width);
            let height = 2.0f64.mul_add(tab_size, layout.piece_height);
            let image = rasterize_piece(
                &prepared,
                &path,
                width,
                height,
                correct_position,
                style,
                (row, col),
            )?;
            Ok(PieceDefinition {
                id: row as usize * cols + col as usize,
                row,
                col,
                shape: *shape,
                width,
                height,
                correct_position,
                path,
                image,
            })
        })
        .collect::<Result<Vec<_>, PuzzleError>>()?;

    log::debug!("rasterize: {} pieces", pieces.len());
    Ok(pieces)
}

/// Draw a single piece.
///
/// `origin` is the puzzle-global position of the canvas' top-left
/// corner; `cell` is used only for error reporting.
///
/// # Errors
///
/// Returns [`PuzzleError::RasterContextUnavailable`] if the canvas cannot
/// be allocated and [`PuzzleError::DegeneratePath`] if the outline is
/// empty.
pub fn rasterize_piece(
    source: &PreparedSource,
    path: &PiecePath,
    canvas_width: f64,
    canvas_height: f64,
    origin: Point,
    style: &RenderStyle,
    cell: (u32, u32),
) -> Result<RgbaImage, PuzzleError> {
    let (row, col) = cell;
    let (width, height) = (canvas_pixels(canvas_width), canvas_pixels(canvas_height));

    let Some(mut canvas) = Pixmap::new(width, height) else {
        return Err(PuzzleError::RasterContextUnavailable { row, col });
    };
    let Some(mut clip) = Mask::new(width, height) else {
        return Err(PuzzleError::RasterContextUnavailable { row, col });
    };
    let Some(outline) = build_path(path) else {
        return Err(PuzzleError::DegeneratePath { row, col });
    };

    clip.fill_path(&outline, FillRule::Winding, true, Transform::identity());

    #[allow(clippy::cast_possible_truncation)]
    let transform = Transform::from_row(
        source.scale_x,
        0.0,
        0.0,
        source.scale_y,
        -origin.x as f32,
        -origin.y as f32,
    );
    canvas.draw_pixmap(
        0,
        0,
        source.pixmap.as_ref(),
        &PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        },
        transform,
        Some(&clip),
    );

    stroke_border(&mut canvas, &outline, &style.border);

    let mut piece = to_rgba(&canvas);
    if style.bevel.enabled {
        let coverage = GrayImage::from_raw(width, height, clip.data().to_vec())
            .ok_or(PuzzleError::RasterContextUnavailable { row, col })?;
        bevel::apply(&mut piece, &coverage, &style.bevel);
    }
    Ok(piece)
}

/// Pixel size of a canvas axis: the fractional size rounded up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn canvas_pixels(size: f64) -> u32 {
    size.ceil().max(0.0) as u32
}

/// Replay a [`PiecePath`] into a `tiny-skia` path.
///
/// Returns `None` when the outline has no area to draw.
#[allow(clippy::cast_possible_truncation)]
fn build_path(path: &PiecePath) -> Option<tiny_skia::Path> {
    if path.segments.is_empty() {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(path.start.x as f32, path.start.y as f32);
    for segment in &path.segments {
        match *segment {
            Segment::Line { to } => pb.line_to(to.x as f32, to.y as f32),
            Segment::Cubic { ctrl1, ctrl2, to } => pb.cubic_to(
                ctrl1.x as f32,
                ctrl1.y as f32,
                ctrl2.x as f32,
                ctrl2.y as f32,
                to.x as f32,
                to.y as f32,
            ),
        }
    }
    pb.close();
    pb.finish()
}

fn stroke_border(canvas: &mut Pixmap, outline: &tiny_skia::Path, border: &BorderStyle) {
    // tiny-skia treats width 0 as a hairline.
    if border.width <= 0.0 || border.color[3] == 0 {
        return;
    }
    let [r, g, b, a] = border.color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: border.width,
        ..Stroke::default()
    };
    canvas.stroke_path(outline, &paint, &stroke, Transform::identity(), None);
}

/// Convert a premultiplied pixmap to a straight-alpha `RgbaImage`.
fn to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}
