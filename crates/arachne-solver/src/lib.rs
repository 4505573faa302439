//! arachne-solver: greedy string-art thread-path solver (sans-IO).
//!
//! Transforms a raster photograph into a thread-art plan — an ordered
//! walk over pins on a circle whose straight thread segments, laid on
//! top of each other, approximate the image's tonal distribution.
//! The pipeline runs in four stages:
//! canonicalise (square crop -> luminance -> circular mask) ->
//! place pins -> build chord cache -> greedy solve.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Rendering, file handling
//! and UI concerns live in host crates.

pub mod canonical;
pub mod chords;
pub mod diagnostics;
pub mod pins;
pub mod pipeline;
pub mod residual;
pub mod solver;
pub mod types;
pub mod validate;

pub use canonical::CanonicalImage;
pub use chords::{ring_distance, ChordCache};
pub use diagnostics::{Clock, PlanDiagnostics, StageDiagnostics, StageMetrics, SystemClock};
pub use pipeline::Pending;
pub use residual::ResidualField;
pub use solver::{valid_target_pins, ProgressSink, SolveOutcome, PROGRESS_INTERVAL, RECENT_WINDOW};
pub use types::{Pin, PlanError, Progress, SolverParams, ThreadPlan};
pub use validate::{check_image_dimensions, check_params, check_values, ValidationReport};

use diagnostics::{duration_ms, PlanSummary};

/// Run the full pipeline: image bytes + parameters in, thread plan
/// out.
///
/// Progress is published to `sink` every
/// [`PROGRESS_INTERVAL`](solver::PROGRESS_INTERVAL) placed lines; pass
/// `&mut ()` to run silently. A run the sink cancels, or one that
/// exhausts its candidates early, still returns `Ok` with a truncated
/// sequence (see [`ThreadPlan::completed`]).
///
/// # Errors
///
/// Returns [`PlanError::InvalidParameters`] for out-of-range
/// parameters (before any allocation), [`PlanError::EmptyInput`] /
/// [`PlanError::ImageDecode`] for undecodable bytes, the shape errors
/// of [`canonical::canonicalise`] for unusable source dimensions, and
/// [`PlanError::ResourceExhaustion`] when the chord cache would
/// exceed its budget.
pub fn generate(
    image_bytes: &[u8],
    params: &SolverParams,
    sink: &mut dyn ProgressSink,
) -> Result<ThreadPlan, PlanError> {
    generate_with_diagnostics(image_bytes, params, sink, &SystemClock)
        .map(|(plan, _diagnostics)| plan)
}

/// Run the full pipeline and collect per-stage diagnostics.
///
/// Identical to [`generate`] but measures each stage through `clock`
/// and returns the timings and counts alongside the plan.
///
/// # Errors
///
/// Same as [`generate`].
// The sequence is never longer than n_lines + 1, so the length cast
// back to u32 is exact.
#[allow(clippy::cast_possible_truncation)]
pub fn generate_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    params: &SolverParams,
    sink: &mut dyn ProgressSink,
    clock: &C,
) -> Result<(ThreadPlan, PlanDiagnostics), PlanError> {
    let run_start = clock.now();

    let stage_start = clock.now();
    let canonicalised = Pending::new(image_bytes.to_vec(), params.clone()).canonicalise()?;
    let canonicalise_diag = StageDiagnostics {
        duration: clock.elapsed(&stage_start),
        metrics: StageMetrics::Canonicalise {
            source_width: canonicalised.image().source_width(),
            source_height: canonicalised.image().source_height(),
            target_size: canonicalised.image().size(),
            disc_pixel_count: canonicalised.image().disc_pixel_count(),
        },
    };

    let stage_start = clock.now();
    let placed = canonicalised.place_pins()?;
    let pin_placement_diag = StageDiagnostics {
        duration: clock.elapsed(&stage_start),
        metrics: StageMetrics::PinPlacement {
            pin_count: params.n_pins,
        },
    };

    let stage_start = clock.now();
    let built = placed.build_chords()?;
    let chord_cache_diag = StageDiagnostics {
        duration: clock.elapsed(&stage_start),
        metrics: StageMetrics::ChordCache {
            pair_count: built.chords().pair_count(),
            pixel_count: built.chords().pixel_count(),
            footprint_bytes: built.chords().footprint_bytes(),
        },
    };

    let stage_start = clock.now();
    let solved = built.solve(sink);
    let lines_drawn = (solved.outcome().sequence.len() - 1) as u32;
    let solve_diag = StageDiagnostics {
        duration: clock.elapsed(&stage_start),
        metrics: StageMetrics::Solve {
            lines_requested: params.n_lines,
            lines_drawn,
            thread_length: solved.outcome().thread_length,
            completed: lines_drawn == params.n_lines,
        },
    };

    let total_duration = clock.elapsed(&run_start);
    let diagnostics = PlanDiagnostics {
        canonicalise: canonicalise_diag,
        pin_placement: pin_placement_diag,
        chord_cache: chord_cache_diag,
        solve: solve_diag,
        total_duration,
        summary: PlanSummary {
            img_size: params.img_size,
            pin_count: params.n_pins,
            lines_drawn,
            thread_length: solved.outcome().thread_length,
        },
    };
    let plan = solved.into_plan(duration_ms(total_duration));
    Ok((plan, diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn radial_png(side: u32) -> Vec<u8> {
        // Dark centre fading to white at the rim: gives the greedy
        // loop an actual tonal structure to chase.
        let c = f64::from(side) / 2.0;
        let img = image::RgbaImage::from_fn(side, side, |x, y| {
            let dx = f64::from(x) - c;
            let dy = f64::from(y) - c;
            let v = (dx.hypot(dy) / c * 255.0).min(255.0) as u8;
            image::Rgba([v, v, v, 255])
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn small_params() -> SolverParams {
        SolverParams {
            n_pins: 40,
            n_lines: 60,
            line_weight: 30,
            min_distance: 5,
            img_size: 120,
            hoop_diameter: 1.0,
        }
    }

    #[test]
    fn generate_produces_a_complete_plan() {
        let plan = generate(&radial_png(160), &small_params(), &mut ()).unwrap();
        assert!(plan.completed());
        assert_eq!(plan.line_sequence.len(), 61);
        assert_eq!(plan.line_sequence[0], 0);
        assert_eq!(plan.pin_coordinates.len(), 40);
        assert!(plan.total_thread_length > 0.0);
        assert!(plan.processing_time_ms >= 0.0);
        assert_eq!(plan.parameters, small_params());
    }

    #[test]
    fn generate_rejects_invalid_parameters_before_decoding() {
        let params = SolverParams {
            img_size: 50,
            ..small_params()
        };
        // Bytes are garbage; the parameter error must win.
        let result = generate(&[0x00, 0x01], &params, &mut ());
        assert!(matches!(result, Err(PlanError::InvalidParameters(_))));
    }

    #[test]
    fn generate_rejects_empty_input() {
        let result = generate(&[], &small_params(), &mut ());
        assert!(matches!(result, Err(PlanError::EmptyInput)));
    }

    #[test]
    fn diagnostics_cover_all_stages() {
        let (plan, diagnostics) =
            generate_with_diagnostics(&radial_png(160), &small_params(), &mut (), &SystemClock)
                .unwrap();
        assert!(matches!(
            diagnostics.canonicalise.metrics,
            StageMetrics::Canonicalise {
                source_width: 160,
                source_height: 160,
                target_size: 120,
                ..
            },
        ));
        assert!(matches!(
            diagnostics.pin_placement.metrics,
            StageMetrics::PinPlacement { pin_count: 40 },
        ));
        assert!(matches!(
            diagnostics.chord_cache.metrics,
            StageMetrics::ChordCache { pair_count, .. } if pair_count > 0,
        ));
        assert!(matches!(
            diagnostics.solve.metrics,
            StageMetrics::Solve {
                lines_requested: 60,
                lines_drawn: 60,
                completed: true,
                ..
            },
        ));
        assert_eq!(diagnostics.summary.lines_drawn, 60);
        assert!(
            (diagnostics.summary.thread_length - plan.total_thread_length).abs() < f64::EPSILON,
        );
        assert!(diagnostics.total_duration >= diagnostics.solve.duration);
    }

    #[test]
    fn generate_is_deterministic_across_runs() {
        let png = radial_png(160);
        let a = generate(&png, &small_params(), &mut ()).unwrap();
        let b = generate(&png, &small_params(), &mut ()).unwrap();
        assert_eq!(a.line_sequence, b.line_sequence);
        assert!((a.total_thread_length - b.total_thread_length).abs() < f64::EPSILON);
    }
}
