//! Render a generated puzzle into one preview image: every piece at its
//! correct position (assembled), or scattered over a larger table.

use std::path::PathBuf;

use clap::Parser;
use image::{Rgba, RgbaImage};
use jigsaw_pipeline::{Board, Bounds, Point, Puzzle, PuzzleConfig};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use tiny_skia::{Color, ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};

/// Render a generated puzzle, assembled or scattered, into one PNG.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input image path.
    input: PathBuf,

    /// Output image path (PNG recommended).
    #[arg(short, long)]
    output: PathBuf,

    /// Pieces along the image's shorter axis.
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_GRID_SIZE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    grid: u32,

    /// Seed for edge shapes and scattering. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Scatter pieces over a table instead of assembling them.
    #[arg(long)]
    scatter: bool,

    /// Table size as a multiple of the puzzle size when scattering.
    #[arg(long, default_value_t = 1.6, value_parser = parse_table_scale)]
    table_scale: f64,

    /// Maximum puzzle size as "WxH" pixels.
    #[arg(long, value_name = "WxH", default_value = "800x600")]
    size: String,

    /// Background color as "#rrggbb" or "#rrggbbaa".
    #[arg(long, value_name = "HEX", default_value = "#2b2b2b")]
    background: String,
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

/// Parse `--size "WxH"`.
fn parse_size(s: &str) -> Result<Bounds, String> {
    let (w_str, h_str) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("size must be 'WxH', got: '{s}'"))?;
    let w: f64 = w_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid width '{w_str}': {e}"))?;
    let h: f64 = h_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid height '{h_str}': {e}"))?;
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(format!("size must be finite and positive, got {w}x{h}"));
    }
    Ok(Bounds::new(w, h))
}

/// Parse `--table-scale`: a finite multiple of at least 1.
fn parse_table_scale(s: &str) -> Result<f64, String> {
    let scale: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid table scale '{s}': {e}"))?;
    if !(scale.is_finite() && scale >= 1.0) {
        return Err(format!("table scale must be finite and at least 1, got {scale}"));
    }
    Ok(scale)
}

/// Parse `#rrggbb` or `#rrggbbaa`.
fn parse_color(s: &str) -> Result<[u8; 4], String> {
    let hex = s
        .strip_prefix('#')
        .ok_or_else(|| format!("color must start with '#', got: '{s}'"))?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(format!("color must be #rrggbb or #rrggbbaa, got: '{s}'"));
    }
    let mut rgba = [0, 0, 0, 255];
    for (i, channel) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
        let byte = &hex[i * 2..i * 2 + 2];
        *channel =
            u8::from_str_radix(byte, 16).map_err(|e| format!("invalid color '{s}': {e}"))?;
    }
    Ok(rgba)
}

// ---------------------------------------------------------------------------
// Compositing via tiny-skia
// ---------------------------------------------------------------------------

/// Premultiply a straight-alpha piece raster into a pixmap.
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Draw pieces bottom to top onto a `width`x`height` surface.
///
/// `placements` pairs a piece id with its canvas top-left on the surface.
#[allow(clippy::cast_possible_truncation)]
fn compose(
    puzzle: &Puzzle,
    placements: &[(usize, Point)],
    width: u32,
    height: u32,
    background: [u8; 4],
) -> Result<RgbaImage, String> {
    let mut surface = Pixmap::new(width, height)
        .ok_or_else(|| format!("cannot allocate a {width}x{height} surface"))?;
    let [r, g, b, a] = background;
    surface.fill(Color::from_rgba8(r, g, b, a));

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };

    for &(id, at) in placements {
        let Some(piece) = puzzle.piece(id) else {
            continue;
        };
        let Some(sprite) = to_pixmap(&piece.image) else {
            log::warn!("piece {id} has an empty raster; skipped");
            continue;
        };
        surface.draw_pixmap(
            0,
            0,
            sprite.as_ref(),
            &paint,
            Transform::from_translate(at.x as f32, at.y as f32),
            None,
        );
    }

    // Convert the pixmap (premultiplied RGBA) to an `RgbaImage` (straight RGBA).
    let mut out = RgbaImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(surface.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(out)
}

/// Every piece at its correct position on a puzzle-sized surface.
fn assembled(puzzle: &Puzzle) -> Vec<(usize, Point)> {
    puzzle
        .pieces
        .iter()
        .map(|p| (p.id, p.correct_position))
        .collect()
}

/// Pieces scattered over `table` in board stacking order.
fn scattered(puzzle: &Puzzle, table: Bounds, seed: u64) -> Result<Vec<(usize, Point)>, String> {
    let mut board = Board::new(puzzle);
    if !board.scatter(table, &mut Pcg32::seed_from_u64(seed)) {
        return Err(format!(
            "cannot scatter over a {}x{} table",
            table.max_width, table.max_height
        ));
    }
    Ok(board
        .draw_order()
        .into_iter()
        .filter_map(|id| board.piece(id).map(|s| (id, s.position)))
        .collect())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn surface_size(width: f64, height: f64) -> (u32, u32) {
    (width.ceil().max(1.0) as u32, height.ceil().max(1.0) as u32)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let bounds = parse_size(&args.size).map_err(|e| format!("--size: {e}"))?;
    let background = parse_color(&args.background).map_err(|e| format!("--background: {e}"))?;

    log::info!("reading image from {}", args.input.display());
    let image_bytes = std::fs::read(&args.input)?;

    let config = PuzzleConfig {
        grid_size: args.grid,
        seed: args.seed,
        ..PuzzleConfig::default()
    };
    let puzzle = jigsaw_pipeline::generate(&image_bytes, &config, bounds)?;

    let (placements, (width, height)) = if args.scatter {
        let table = Bounds::new(
            puzzle.puzzle_width * args.table_scale,
            puzzle.puzzle_height * args.table_scale,
        );
        let seed = puzzle.seed.unwrap_or_default();
        (
            scattered(&puzzle, table, seed)?,
            surface_size(table.max_width, table.max_height),
        )
    } else {
        (
            assembled(&puzzle),
            surface_size(puzzle.puzzle_width, puzzle.puzzle_height),
        )
    };

    log::info!(
        "composing {} pieces onto {width}x{height}",
        placements.len()
    );
    let composed = compose(&puzzle, &placements, width, height, background)?;

    log::info!("saving to {}", args.output.display());
    composed.save(&args.output)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jigsaw_pipeline::RenderStyle;

    use super::*;

    fn puzzle(color: [u8; 4]) -> Puzzle {
        let img = RgbaImage::from_pixel(120, 80, Rgba(color));
        let mut png = Vec::new();
        image::ImageEncoder::write_image(
            image::codecs::png::PngEncoder::new(&mut png),
            img.as_raw(),
            120,
            80,
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        let mut style = RenderStyle::default();
        style.border.width = 0.0;
        style.bevel.enabled = false;
        let config = PuzzleConfig {
            grid_size: 2,
            seed: Some(6),
            style,
            ..PuzzleConfig::default()
        };
        jigsaw_pipeline::generate(&png, &config, Bounds::new(120.0, 80.0)).unwrap()
    }

    #[test]
    fn parses_size() {
        assert_eq!(parse_size("640x480").unwrap(), Bounds::new(640.0, 480.0));
        assert!(parse_size("640").is_err());
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("infx10").is_err());
        assert!(parse_size("10xNaN").is_err());
    }

    #[test]
    fn parses_table_scale() {
        assert_eq!(parse_table_scale("2.5").unwrap(), 2.5);
        for bad in ["inf", "NaN", "0", "-2", "0.5", "wide"] {
            assert!(parse_table_scale(bad).is_err(), "{bad}");
        }
        let args = Args::try_parse_from(["jigsaw-compose", "in.png", "-o", "out.png"]).unwrap();
        assert_eq!(args.table_scale, 1.6);
        let unbounded = ["jigsaw-compose", "in.png", "-o", "o.png", "--table-scale", "inf"];
        assert!(Args::try_parse_from(unbounded).is_err());
    }

    #[test]
    fn parses_colors() {
        assert_eq!(parse_color("#ff8000").unwrap(), [255, 128, 0, 255]);
        assert_eq!(parse_color("#01020304").unwrap(), [1, 2, 3, 4]);
        assert!(parse_color("ff8000").is_err());
        assert!(parse_color("#ff80").is_err());
        assert!(parse_color("#gg0000").is_err());
    }

    #[test]
    fn assembled_puzzle_reproduces_the_image() {
        let color = [200, 40, 90, 255];
        let puzzle = puzzle(color);
        let composed = compose(&puzzle, &assembled(&puzzle), 120, 80, [0, 0, 0, 255]).unwrap();
        // Body centers of all six pieces (3x2 grid of 40x40 cells).
        for (x, y) in [(20, 20), (60, 20), (100, 20), (20, 60), (60, 60), (100, 60)] {
            assert_eq!(composed.get_pixel(x, y).0, color, "at ({x}, {y})");
        }
    }

    #[test]
    fn scatter_keeps_every_piece_on_the_table() {
        let puzzle = puzzle([10, 10, 10, 255]);
        let table = Bounds::new(300.0, 200.0);
        let placements = scattered(&puzzle, table, 3).unwrap();
        assert_eq!(placements.len(), puzzle.pieces.len());
        for (id, at) in placements {
            let piece = puzzle.piece(id).unwrap();
            assert!(at.x >= 0.0 && at.x + piece.width <= 300.0);
            assert!(at.y >= 0.0 && at.y + piece.height <= 200.0);
        }
    }

    #[test]
    fn unbounded_table_is_an_error() {
        let puzzle = puzzle([10, 10, 10, 255]);
        let table = Bounds::new(f64::INFINITY, 200.0);
        assert!(scattered(&puzzle, table, 3).is_err());
    }

    #[test]
    fn empty_table_keeps_background() {
        let puzzle = puzzle([10, 10, 10, 255]);
        let composed = compose(&puzzle, &[], 4, 3, [1, 2, 3, 255]).unwrap();
        assert!(composed.pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }
}
