//! jigsaw-cut: cut an image into puzzle pieces from the command line.
//!
//! Runs the generation pipeline on an image file, writes every piece as
//! `piece_<id>.png` plus a `manifest.json` into an output directory,
//! optionally writes an SVG cut sheet, and prints per-stage diagnostics.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin jigsaw-cut -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use jigsaw_export::{AssetNaming, Manifest, SvgMetadata};
use jigsaw_io::ImageSource;
use jigsaw_pipeline::{
    Bounds, Difficulty, PipelineDiagnostics, Puzzle, PuzzleConfig, SystemClock,
};

/// Cut an image into interlocking jigsaw pieces.
#[derive(Parser)]
#[command(name = "jigsaw-cut", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Pieces along the image's shorter axis.
    #[arg(long, conflicts_with = "difficulty", value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    grid: Option<u32>,

    /// Named difficulty tier (easy = 3, medium = 5, hard = 10).
    #[arg(long, value_enum)]
    difficulty: Option<Level>,

    /// Maximum puzzle width in pixels.
    #[arg(long, default_value_t = 1024.0)]
    max_width: f64,

    /// Maximum puzzle height in pixels.
    #[arg(long, default_value_t = 768.0)]
    max_height: f64,

    /// Seed for edge shapes. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Tab size as a fraction of the smaller piece dimension.
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_TAB_RATIO)]
    tab_ratio: f64,

    /// Disable the bevel effect.
    #[arg(long)]
    no_bevel: bool,

    /// Directory to write piece PNGs and `manifest.json` into.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write an SVG cut sheet to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Embed pieces in the manifest as data URLs instead of writing PNG
    /// files.
    #[arg(long)]
    embed: bool,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Full puzzle config as a JSON string.
    ///
    /// When provided, all other config flags are ignored. The JSON must
    /// be a valid `PuzzleConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Difficulty tier selection.
#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Self::Easy,
            Level::Medium => Self::Medium,
            Level::Hard => Self::Hard,
        }
    }
}

/// Build a [`PuzzleConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual config flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PuzzleConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let grid_size = cli.grid.unwrap_or_else(|| {
        cli.difficulty
            .map_or(PuzzleConfig::DEFAULT_GRID_SIZE, |level| {
                Difficulty::from(level).grid_size()
            })
    });

    let mut config = PuzzleConfig {
        grid_size,
        tab_ratio: cli.tab_ratio,
        seed: cli.seed,
        ..PuzzleConfig::default()
    };
    config.style.bevel.enabled = !cli.no_bevel;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let bounds = Bounds::new(cli.max_width, cli.max_height);

    let image_bytes = match ImageSource::Path(cli.image_path.clone()).load().await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );
    log::debug!("config: {config:#?}");

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let (puzzle, diagnostics) = match jigsaw_pipeline::generate_with_diagnostics(
            &image_bytes,
            &config,
            bounds,
            &SystemClock,
        ) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        };

        if cli.json {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", diagnostics.report());
        }

        // Write outputs on the first run only.
        if run == 0 {
            if let Some(ref dir) = cli.out
                && let Err(msg) = write_pieces(&puzzle, dir, cli.embed)
            {
                eprintln!("{msg}");
                return ExitCode::FAILURE;
            }
            if let Some(ref svg_path) = cli.svg
                && let Err(msg) = write_svg(&puzzle, &config, &cli.image_path, svg_path)
            {
                eprintln!("{msg}");
                return ExitCode::FAILURE;
            }
        }

        all_diagnostics.push(diagnostics);

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Write piece PNGs (unless embedding) and `manifest.json` into `dir`.
fn write_pieces(puzzle: &Puzzle, dir: &Path, embed: bool) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Error creating {}: {e}", dir.display()))?;

    let naming = if embed {
        AssetNaming::Embedded
    } else {
        AssetNaming::default()
    };

    let files = puzzle
        .pieces
        .iter()
        .filter_map(|piece| naming.file_name(piece.id).map(|name| (piece, name)));
    for (piece, name) in files {
        let png = jigsaw_export::encode_png(&piece.image)
            .map_err(|e| format!("Error encoding piece {}: {e}", piece.id))?;
        let path = dir.join(name);
        std::fs::write(&path, png)
            .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    }

    let json = Manifest::from_puzzle(puzzle, &naming)
        .and_then(|m| m.to_json())
        .map_err(|e| format!("Error building manifest: {e}"))?;
    let manifest_path = dir.join("manifest.json");
    std::fs::write(&manifest_path, json)
        .map_err(|e| format!("Error writing {}: {e}", manifest_path.display()))?;

    log::info!(
        "{} pieces written to {}",
        puzzle.pieces.len(),
        dir.display(),
    );
    Ok(())
}

/// Write the SVG cut sheet, embedding the config so it can be regenerated.
fn write_svg(
    puzzle: &Puzzle,
    config: &PuzzleConfig,
    image_path: &Path,
    svg_path: &Path,
) -> Result<(), String> {
    let title = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("jigsaw");
    let description = format!(
        "{}x{} pieces, seed {}",
        puzzle.layout.cols,
        puzzle.layout.rows,
        puzzle.seed.map_or_else(|| "unknown".to_string(), |s| s.to_string()),
    );
    let config_json = serde_json::to_string(config)
        .map_err(|e| format!("Error serializing config: {e}"))?;
    let metadata = SvgMetadata {
        title: Some(title),
        description: Some(&description),
        config_json: Some(&config_json),
    };
    let svg = jigsaw_export::to_cut_svg(puzzle, &metadata);
    std::fs::write(svg_path, &svg)
        .map_err(|e| format!("Error writing SVG to {}: {e}", svg_path.display()))?;
    log::info!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
    Ok(())
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> std::time::Duration;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Decode", |d| d.decode.duration),
        ("Layout", |d| d.layout.duration),
        ("Shapes", |d| d.shapes.duration),
        ("Rasterize", |d| d.rasterize.duration),
    ];

    for (name, extractor) in stage_extractors {
        let stage_mean = all_diagnostics
            .iter()
            .map(|d| extractor(d).as_secs_f64() * 1000.0)
            .sum::<f64>()
            / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
