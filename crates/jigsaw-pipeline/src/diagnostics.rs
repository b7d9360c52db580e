//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! Every call to [`generate_with_diagnostics`](crate::generate_with_diagnostics)
//! collects diagnostics alongside the generated puzzle. They are meant for
//! tuning difficulty tiers and render styles and for spotting slow images.
//!
//! Duration measurements use [`std::time::Duration`]. Timestamps come
//! from an injected [`Clock`]; [`SystemClock`] is backed by the
//! `web-time` crate, which uses `performance.now()` on WASM and
//! `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::{Decoded, PipelineStage, Planned, Rasterized, Shaped};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant: Copy;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: Self::Instant) -> Duration;
}

/// Wall clock backed by `web_time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = web_time::Instant;

    fn now(&self) -> Self::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: Self::Instant) -> Duration {
        since.elapsed()
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: image decoding.
    pub decode: StageDiagnostics,
    /// Stage 2: layout planning.
    pub layout: StageDiagnostics,
    /// Stage 3: edge-shape assignment.
    pub shapes: StageDiagnostics,
    /// Stage 4: piece rasterization.
    pub rasterize: StageDiagnostics,
    /// Total wall-clock duration of the whole run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Layout planning metrics.
    Layout {
        /// Fitted puzzle width.
        puzzle_width: f64,
        /// Fitted puzzle height.
        puzzle_height: f64,
        /// Piece rows.
        rows: u32,
        /// Piece columns.
        cols: u32,
        /// Piece body width.
        piece_width: f64,
        /// Piece body height.
        piece_height: f64,
        /// Tab protrusion.
        tab_size: f64,
    },
    /// Shape assignment metrics. Interior edges are counted once per
    /// side, so `tab_edges == slot_edges` always holds.
    Shapes {
        /// Grid rows.
        rows: u32,
        /// Grid columns.
        cols: u32,
        /// Seed used, if the pipeline chose it.
        seed: Option<u64>,
        /// Edges that protrude.
        tab_edges: usize,
        /// Edges that indent.
        slot_edges: usize,
        /// Border edges.
        flat_edges: usize,
    },
    /// Rasterization metrics.
    Rasterize {
        /// Pieces drawn.
        piece_count: usize,
        /// Fractional canvas width of every piece.
        canvas_width: f64,
        /// Fractional canvas height of every piece.
        canvas_height: f64,
        /// Pixels across all piece rasters.
        total_pixels: u64,
    },
}

/// High-level summary counts for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Number of pieces generated.
    pub piece_count: usize,
    /// Pixels across all piece rasters.
    pub raster_pixels: u64,
}

impl PipelineDiagnostics {
    /// Stage diagnostics in pipeline order, each with its stage index
    /// and name.
    #[must_use]
    pub fn stages(&self) -> [(usize, &'static str, &StageDiagnostics); 4] {
        [
            (Decoded::INDEX, Decoded::NAME, &self.decode),
            (Planned::INDEX, Planned::NAME, &self.layout),
            (Shaped::INDEX, Shaped::NAME, &self.shapes),
            (Rasterized::INDEX, Rasterized::NAME, &self.rasterize),
        ]
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Puzzle Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}  |  Pieces: {}  |  Raster pixels: {}",
            self.summary.image_width,
            self.summary.image_height,
            self.summary.piece_count,
            self.summary.raster_pixels,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (index, name, diag) in self.stages() {
            let label = format!("{index}. {name}");
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{label:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Layout {
            puzzle_width,
            puzzle_height,
            rows,
            cols,
            piece_width,
            piece_height,
            tab_size,
        } => format!(
            "{puzzle_width:.1}x{puzzle_height:.1}, {cols}x{rows} grid, piece {piece_width:.1}x{piece_height:.1}, tab {tab_size:.1}",
        ),
        StageMetrics::Shapes {
            seed,
            tab_edges,
            slot_edges,
            flat_edges,
            ..
        } => {
            let seed = seed.map_or_else(|| "injected".to_string(), |s| s.to_string());
            format!("seed={seed} tabs={tab_edges} slots={slot_edges} flat={flat_edges}")
        }
        StageMetrics::Rasterize {
            piece_count,
            canvas_width,
            canvas_height,
            total_pixels,
        } => format!(
            "{piece_count} pieces at {canvas_width:.1}x{canvas_height:.1}, {total_pixels} px"
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> PipelineDiagnostics {
        PipelineDiagnostics {
            decode: StageDiagnostics {
                duration: Duration::from_millis(10),
                metrics: StageMetrics::Decode {
                    input_bytes: 1000,
                    width: 100,
                    height: 100,
                    pixel_count: 10000,
                },
            },
            layout: StageDiagnostics {
                duration: Duration::from_millis(0),
                metrics: StageMetrics::Layout {
                    puzzle_width: 300.0,
                    puzzle_height: 300.0,
                    rows: 3,
                    cols: 3,
                    piece_width: 100.0,
                    piece_height: 100.0,
                    tab_size: 20.0,
                },
            },
            shapes: StageDiagnostics {
                duration: Duration::from_millis(1),
                metrics: StageMetrics::Shapes {
                    rows: 3,
                    cols: 3,
                    seed: Some(42),
                    tab_edges: 12,
                    slot_edges: 12,
                    flat_edges: 12,
                },
            },
            rasterize: StageDiagnostics {
                duration: Duration::from_millis(89),
                metrics: StageMetrics::Rasterize {
                    piece_count: 9,
                    canvas_width: 140.0,
                    canvas_height: 140.0,
                    total_pixels: 176_400,
                },
            },
            total_duration: Duration::from_millis(100),
            summary: PipelineSummary {
                image_width: 100,
                image_height: 100,
                piece_count: 9,
                raster_pixels: 176_400,
            },
        }
    }

    #[test]
    fn stages_follow_pipeline_order() {
        let diagnostics = sample();
        let stages = diagnostics.stages();
        let indices: Vec<usize> = stages.iter().map(|(index, ..)| *index).collect();
        assert_eq!(indices, [1, 2, 3, 4]);
        let (_, name, diag) = stages[3];
        assert_eq!(name, "rasterize");
        assert_eq!(diag.duration, Duration::from_millis(89));
        let report = diagnostics.report();
        let decode = report.find("1. decode").unwrap();
        let rasterize = report.find("4. rasterize").unwrap();
        assert!(decode < rasterize);
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn report_lists_every_stage() {
        let report = sample().report();
        assert!(report.contains("Puzzle Diagnostics Report"));
        for stage in ["1. decode", "2. layout", "3. shapes", "4. rasterize"] {
            assert!(report.contains(stage), "missing {stage}");
        }
        assert!(report.contains("seed=42"));
        assert!(report.contains("89.0%"));
    }

    #[test]
    fn serializes_durations_as_seconds() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!((json["total_duration"].as_f64().unwrap() - 0.1).abs() < 1e-12);
        let back: PipelineDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.rasterize.metrics, sample().rasterize.metrics);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["total_duration"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<PipelineDiagnostics>(json).is_err());
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let start = clock.now();
        assert!(clock.elapsed(start) < Duration::from_secs(60));
    }
}
