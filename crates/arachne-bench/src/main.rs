//! arachne-bench: CLI tool for solver parameter experimentation and
//! diagnostics.
//!
//! Runs the thread-path solver on a given image file with
//! configurable parameters, printing detailed per-stage diagnostics.
//! Useful for:
//!
//! - Tuning pin count, line count, and line weight against a real
//!   photograph
//! - Measuring chord-cache footprint and per-stage durations
//! - Exporting a finished plan as JSON for a renderer to consume
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin arachne-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use arachne_solver::{PlanDiagnostics, SolverParams, SystemClock, ThreadPlan};

/// Solver parameter experimentation and diagnostics for arachne.
///
/// Runs the thread-path pipeline on a given image with configurable
/// parameters and prints per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "arachne-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Number of pins around the hoop.
    #[arg(long, default_value_t = SolverParams::DEFAULT_N_PINS)]
    pins: u32,

    /// Number of thread lines to place.
    #[arg(long, default_value_t = SolverParams::DEFAULT_N_LINES)]
    lines: u32,

    /// Darkness removed per line-pixel (1-255).
    #[arg(long, default_value_t = SolverParams::DEFAULT_LINE_WEIGHT)]
    line_weight: u8,

    /// Minimum ring distance between consecutive pins.
    #[arg(long, default_value_t = SolverParams::DEFAULT_MIN_DISTANCE)]
    min_distance: u32,

    /// Working image side in pixels.
    #[arg(long, default_value_t = SolverParams::DEFAULT_IMG_SIZE)]
    size: u32,

    /// Physical hoop diameter (any unit; scales the thread length).
    #[arg(long, default_value_t = SolverParams::DEFAULT_HOOP_DIAMETER)]
    hoop_diameter: f64,

    /// Number of runs for duration averaging.
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Write the finished plan as JSON to this path.
    #[arg(long)]
    plan: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.runs == 0 {
        eprintln!("Error: --runs must be at least 1");
        return ExitCode::FAILURE;
    }

    let params = SolverParams {
        n_pins: cli.pins,
        n_lines: cli.lines,
        line_weight: cli.line_weight,
        min_distance: cli.min_distance,
        img_size: cli.size,
        hoop_diameter: cli.hoop_diameter,
    };

    let report = params.validate();
    if !report.is_valid() {
        for error in report.errors() {
            eprintln!("Error: {error}");
        }
        return ExitCode::FAILURE;
    }

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );
    eprintln!(
        "Parameters: {} pins, {} lines, weight {}, min distance {}, {}px",
        params.n_pins, params.n_lines, params.line_weight, params.min_distance, params.img_size,
    );

    let mut last: Option<(ThreadPlan, PlanDiagnostics)> = None;
    for run in 1..=cli.runs {
        match arachne_solver::generate_with_diagnostics(
            &image_bytes,
            &params,
            &mut (),
            &SystemClock,
        ) {
            Ok(result) => {
                if cli.runs > 1 {
                    eprintln!(
                        "Run {run}/{}: {:.3}ms",
                        cli.runs, result.0.processing_time_ms,
                    );
                }
                last = Some(result);
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    // runs >= 1 was checked above, so at least one result exists.
    let Some((plan, diagnostics)) = last else {
        return ExitCode::FAILURE;
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
        if !plan.completed() {
            println!(
                "\nNote: run stopped after {} of {} lines (candidates exhausted)",
                plan.line_sequence.len() - 1,
                plan.parameters.n_lines,
            );
        }
    }

    if let Some(path) = &cli.plan {
        let json = match serde_json::to_string_pretty(&plan) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing plan: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            eprintln!("Error writing {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        eprintln!("Plan written to {}", path.display());
    }

    ExitCode::SUCCESS
}
