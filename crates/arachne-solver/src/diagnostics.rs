//! Run diagnostics: timing, counts, and metrics for each pipeline
//! stage.
//!
//! These diagnostics are permanent instrumentation for parameter
//! experimentation — pin count and image size trade quality against
//! cache footprint and solve time, and the per-stage numbers make the
//! trade visible. Every call to
//! [`generate_with_diagnostics`](crate::generate_with_diagnostics)
//! collects them alongside the plan.
//!
//! Durations use [`std::time::Duration`] captured through the
//! [`Clock`] trait, so a WASM host can substitute
//! `performance.now()`-based timing for [`SystemClock`]. They are
//! serialized as fractional seconds (`f64`) for JSON compatibility,
//! since `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

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

/// Source of wall-clock measurements.
///
/// Abstracted so hosts without a monotonic `std` clock (browsers,
/// some embedded targets) can supply their own.
pub trait Clock {
    /// An opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn elapsed(&self, since: &Self::Instant) -> Duration {
        since.elapsed()
    }
}

/// Diagnostics collected from a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDiagnostics {
    /// Stage 0: decode + crop + luminance + mask.
    pub canonicalise: StageDiagnostics,
    /// Stage 1: pin placement.
    pub pin_placement: StageDiagnostics,
    /// Stage 2: chord cache construction.
    pub chord_cache: StageDiagnostics,
    /// Stage 3: the greedy loop.
    pub solve: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PlanSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Canonicalisation metrics.
    Canonicalise {
        /// Decoded source width in pixels.
        source_width: u32,
        /// Decoded source height in pixels.
        source_height: u32,
        /// Working image side after crop + scale.
        target_size: u32,
        /// Pixels inside the hoop disc.
        disc_pixel_count: usize,
    },
    /// Pin placement metrics.
    PinPlacement {
        /// Number of pins placed.
        pin_count: u32,
    },
    /// Chord cache metrics.
    ChordCache {
        /// Admissible unordered pin pairs.
        pair_count: usize,
        /// Total pixel samples across all pairs.
        pixel_count: usize,
        /// Bytes held by the materialised chord data.
        footprint_bytes: usize,
    },
    /// Greedy solve metrics.
    Solve {
        /// Lines the parameters asked for.
        lines_requested: u32,
        /// Lines actually placed.
        lines_drawn: u32,
        /// Final thread length in `hoop_diameter` units.
        thread_length: f64,
        /// `false` when the run stopped early (candidates exhausted
        /// or cancelled).
        completed: bool,
    },
}

/// High-level summary counts for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Working image side in pixels.
    pub img_size: u32,
    /// Number of pins.
    pub pin_count: u32,
    /// Lines placed.
    pub lines_drawn: u32,
    /// Final thread length in `hoop_diameter` units.
    pub thread_length: f64,
}

impl PlanDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Thread Plan Diagnostics\n{}", "=".repeat(60)));
        lines.push(format!(
            "Raster: {0}x{0}  |  Pins: {1}",
            self.summary.img_size, self.summary.pin_count,
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
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages: [(&str, &StageDiagnostics); 4] = [
            ("Canonicalise", &self.canonicalise),
            ("Pin Placement", &self.pin_placement),
            ("Chord Cache", &self.chord_cache),
            ("Solve", &self.solve),
        ];

        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Lines: {}  |  Thread length: {:.3}",
            self.summary.lines_drawn, self.summary.thread_length,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
#[must_use]
pub(crate) fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
#[allow(clippy::cast_precision_loss)]
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Canonicalise {
            source_width,
            source_height,
            target_size,
            disc_pixel_count,
        } => {
            format!(
                "{source_width}x{source_height} -> {target_size}x{target_size}, \
                 {disc_pixel_count} disc px",
            )
        }
        StageMetrics::PinPlacement { pin_count } => format!("{pin_count} pins"),
        StageMetrics::ChordCache {
            pair_count,
            pixel_count,
            footprint_bytes,
        } => {
            format!(
                "{pair_count} pairs, {pixel_count} px, {:.1} MiB",
                *footprint_bytes as f64 / (1024.0 * 1024.0),
            )
        }
        StageMetrics::Solve {
            lines_requested,
            lines_drawn,
            thread_length,
            completed,
        } => {
            let status = if *completed { "complete" } else { "truncated" };
            format!("{lines_drawn}/{lines_requested} lines ({status}), length {thread_length:.3}")
        }
    }
}
