//! SVG export serializer.
//!
//! Converts piece outlines into SVG using the [`svg`] crate for document
//! construction, XML escaping, and path data formatting.
//!
//! [`to_cut_svg`] produces a cut sheet: every piece outline in
//! puzzle-global coordinates, suitable for a laser cutter or a printed
//! template. [`to_piece_svg`] produces a single piece on its own canvas.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>` and a
//! `<metadata>` block carrying the generation config.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Group, Path, Rectangle, Title};
use svg::node::{Node, Text, Value};

use jigsaw_pipeline::{PieceDefinition, PiecePath, Puzzle, Segment};

/// Namespace of the `<jigsaw:config>` metadata element.
const METADATA_NAMESPACE: &str = "https://github.com/altendky/jigsaw/ns/1";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized [`PuzzleConfig`](jigsaw_pipeline::PuzzleConfig),
    /// emitted inside `<metadata>` so a cut sheet can be regenerated.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a piece outline.
///
/// Uses `M` for the start point, `L` for lines, `C` for cubics and a
/// closing `z`.
///
/// # Examples
///
/// ```
/// use jigsaw_pipeline::{PiecePath, Point, Segment};
/// use jigsaw_export::path_data;
///
/// let path = PiecePath {
///     start: Point::new(0.0, 0.0),
///     segments: vec![
///         Segment::Line { to: Point::new(10.0, 0.0) },
///         Segment::Line { to: Point::new(10.0, 5.0) },
///     ],
/// };
/// assert_eq!(path_data(&path), "M0,0 L10,0 L10,5 z");
/// ```
#[must_use]
pub fn path_data(path: &PiecePath) -> String {
    let mut data = Data::new().move_to((path.start.x, path.start.y));
    for segment in &path.segments {
        data = match *segment {
            Segment::Line { to } => data.line_to((to.x, to.y)),
            Segment::Cubic { ctrl1, ctrl2, to } => {
                data.cubic_curve_to((ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y))
            }
        };
    }
    String::from(Value::from(data.close()))
}

/// Serialize every piece outline of `puzzle` into one SVG cut sheet.
///
/// The `viewBox` spans the assembled puzzle. Each outline is a
/// `<path>` with an `id` of `piece-<id>` and `data-row`/`data-col`
/// attributes, grouped under `<g id="pieces">`.
#[must_use]
pub fn to_cut_svg(puzzle: &Puzzle, metadata: &SvgMetadata<'_>) -> String {
    let (w, h) = (puzzle.puzzle_width, puzzle.puzzle_height);
    let mut doc = with_metadata(sized_document(w, h), metadata);

    doc = doc.add(
        Rectangle::new()
            .set("id", "frame")
            .set("width", w.to_string())
            .set("height", h.to_string())
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", 1),
    );

    let mut group = Group::new().set("id", "pieces");
    for piece in &puzzle.pieces {
        group = group.add(outline(piece, &piece.global_path()));
    }
    doc = doc.add(group);

    finish(&doc)
}

/// Serialize a single piece outline on its own canvas.
#[must_use]
pub fn to_piece_svg(piece: &PieceDefinition, metadata: &SvgMetadata<'_>) -> String {
    let doc = with_metadata(sized_document(piece.width, piece.height), metadata)
        .add(outline(piece, &piece.path));
    finish(&doc)
}

fn sized_document(width: f64, height: f64) -> Document {
    Document::new()
        .set("width", width.to_string())
        .set("height", height.to_string())
        .set("viewBox", format!("0 0 {width} {height}"))
}

fn outline(piece: &PieceDefinition, path: &PiecePath) -> Path {
    Path::new()
        .set("id", format!("piece-{}", piece.id))
        .set("data-row", piece.row)
        .set("data-col", piece.col)
        .set("d", path_data(path))
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", 1)
}

fn with_metadata(mut doc: Document, metadata: &SvgMetadata<'_>) -> Document {
    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("jigsaw:config");
        config_el.assign("xmlns:jigsaw", METADATA_NAMESPACE);
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }
    doc
}

/// The svg crate omits the XML declaration, so we prepend it.
fn finish(doc: &Document) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
