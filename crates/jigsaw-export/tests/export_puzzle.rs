//! Integration test: generate a puzzle from a synthesized image and export
//! every format.

#![allow(clippy::unwrap_used)]

use jigsaw_export::{
    AssetNaming, Manifest, SvgMetadata, encode_png, parse_data_url, to_cut_svg, to_data_url,
};
use jigsaw_pipeline::{Bounds, PuzzleConfig, RgbaImage};

fn checkerboard(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / 16 + y / 16) % 2 == 0 {
            image::Rgba([240, 240, 240, 255])
        } else {
            image::Rgba([30, 60, 90, 255])
        }
    })
}

#[test]
fn puzzle_exports_to_manifest_svg_and_data_urls() {
    let source = encode_png(&checkerboard(320, 240)).unwrap();
    let config = PuzzleConfig {
        grid_size: 3,
        seed: Some(42),
        ..PuzzleConfig::default()
    };
    let puzzle = jigsaw_pipeline::generate(&source, &config, Bounds::new(640.0, 480.0)).unwrap();
    assert_eq!(puzzle.pieces.len(), 12);

    let config_json = serde_json::to_string(&config).unwrap();
    let svg = to_cut_svg(
        &puzzle,
        &SvgMetadata {
            title: Some("checkerboard"),
            description: None,
            config_json: Some(&config_json),
        },
    );
    assert_eq!(svg.matches("<path").count(), 12);
    assert!(svg.contains("viewBox=\"0 0 640 480\""));

    let manifest = Manifest::from_puzzle(&puzzle, &AssetNaming::default()).unwrap();
    let json = manifest.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["rows"], 3);
    assert_eq!(value["cols"], 4);
    assert_eq!(value["pieces"].as_array().unwrap().len(), 12);
    assert_eq!(value["pieces"][11]["asset"], "piece_11.png");

    for piece in &puzzle.pieces {
        let url = to_data_url(&piece.image).unwrap();
        let parsed = parse_data_url(&url).unwrap();
        let back = image::load_from_memory(&parsed.bytes).unwrap().to_rgba8();
        assert_eq!(back, piece.image);
    }
}
