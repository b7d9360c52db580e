//! Integration test: load from every source kind through one session.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use jigsaw_io::{ImageSource, PuzzleSession, SessionError};
use jigsaw_pipeline::{Bounds, PuzzleConfig, RgbaImage};

fn png() -> Vec<u8> {
    let img = RgbaImage::from_fn(90, 60, |x, y| {
        #[allow(clippy::cast_possible_truncation)]
        image::Rgba([(x * 2) as u8, (y * 3) as u8, 77, 255])
    });
    jigsaw_export::encode_png(&img).unwrap()
}

#[tokio::test]
async fn every_source_kind_generates_the_same_puzzle() {
    let bytes = png();
    let path = std::env::temp_dir().join(format!("jigsaw-io-flow-{}.png", std::process::id()));
    std::fs::write(&path, &bytes).unwrap();

    let config = PuzzleConfig {
        grid_size: 2,
        seed: Some(17),
        ..PuzzleConfig::default()
    };
    let bounds = Bounds::new(180.0, 180.0);
    let session = PuzzleSession::new();

    let sources = [
        ImageSource::Bytes(bytes.clone()),
        ImageSource::Path(path.clone()),
        ImageSource::DataUrl(jigsaw_export::png_data_url(&bytes)),
    ];
    let mut puzzles = Vec::new();
    for source in sources {
        puzzles.push(
            session
                .generate_from(source, config.clone(), bounds)
                .await
                .unwrap(),
        );
    }
    std::fs::remove_file(&path).unwrap();

    assert_eq!(session.generation(), 3);
    assert!(Arc::ptr_eq(&session.current().unwrap(), &puzzles[2]));
    for puzzle in &puzzles[1..] {
        assert_eq!(puzzle.shapes, puzzles[0].shapes);
        assert_eq!(puzzle.pieces.len(), 6);
    }
}

#[tokio::test]
async fn interleaved_requests_keep_only_the_last() {
    let session = PuzzleSession::new();
    let config = PuzzleConfig::default();
    let bounds = Bounds::new(200.0, 200.0);

    let a = session.generate_from(ImageSource::Bytes(png()), config.clone(), bounds);
    let b = session.generate_from(ImageSource::Bytes(png()), config.clone(), bounds);
    let c = session.generate_from(ImageSource::Bytes(png()), config, bounds);

    let (a, b, c) = tokio::join!(a, b, c);
    assert!(matches!(a, Err(SessionError::Superseded { ticket: 1, latest: 3 })));
    assert!(matches!(b, Err(SessionError::Superseded { ticket: 2, latest: 3 })));
    let c = c.unwrap();
    assert!(Arc::ptr_eq(&session.current().unwrap(), &c));
}
