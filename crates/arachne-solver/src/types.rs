//! Shared types for the arachne thread-path solver.

use serde::{Deserialize, Serialize};

use crate::validate::ValidationReport;

/// A pin coordinate on the hoop's inscribed circle, in pixel units.
///
/// Pin positions are integer pixel indices into the canonicalised
/// image raster: `0 <= x, y < img_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// Horizontal position (pixels from left edge).
    pub x: u32,
    /// Vertical position (pixels from top edge).
    pub y: u32,
}

impl Pin {
    /// Create a new pin coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another pin.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another pin.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Parameters for a thread-path solver run.
///
/// All parameters have defaults matching the reference output; a run
/// with default parameters on the same image reproduces the reference
/// sequence exactly.
///
/// Deserialization fills missing fields from the defaults so
/// parameter records saved by older hosts keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Number of pins spaced evenly around the hoop. Must be in
    /// `[3, 1000]`.
    pub n_pins: u32,

    /// Number of thread lines to place. Must be at least 1.
    pub n_lines: u32,

    /// Darkness removed from the residual field per line-pixel, in
    /// `[1, 255]`. Models one thread's partial opacity.
    pub line_weight: u8,

    /// Chord-index exclusion around the current pin: candidate pins
    /// closer than this many positions on the ring (in either
    /// direction) are never targeted. Must be in `[1, n_pins / 2)`.
    pub min_distance: u32,

    /// Side length of the canonicalised working image in pixels.
    /// Must be in `[100, 2000]`.
    pub img_size: u32,

    /// Physical hoop diameter, used only to scale the reported thread
    /// length. Any positive unit; with the default of `1.0` the thread
    /// length comes back in multiples of the hoop diameter.
    pub hoop_diameter: f64,
}

impl SolverParams {
    /// Default pin count.
    pub const DEFAULT_N_PINS: u32 = 300;
    /// Default line count.
    pub const DEFAULT_N_LINES: u32 = 4000;
    /// Default per-line darkness weight.
    pub const DEFAULT_LINE_WEIGHT: u8 = 20;
    /// Default minimum ring distance between consecutive pins.
    pub const DEFAULT_MIN_DISTANCE: u32 = 20;
    /// Default working image side in pixels.
    pub const DEFAULT_IMG_SIZE: u32 = 500;
    /// Default hoop diameter (thread length in hoop-diameter units).
    pub const DEFAULT_HOOP_DIAMETER: f64 = 1.0;

    /// Validate all fields against their documented ranges.
    ///
    /// Returns the full list of violations, not just the first, so a
    /// host can surface every problem at once.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        crate::validate::check_params(self)
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            n_pins: Self::DEFAULT_N_PINS,
            n_lines: Self::DEFAULT_N_LINES,
            line_weight: Self::DEFAULT_LINE_WEIGHT,
            min_distance: Self::DEFAULT_MIN_DISTANCE,
            img_size: Self::DEFAULT_IMG_SIZE,
            hoop_diameter: Self::DEFAULT_HOOP_DIAMETER,
        }
    }
}

/// A progress record published while the solver runs.
///
/// `current_pin` and `next_pin` are the departure and arrival pins of
/// the most recently applied segment, so a renderer can paint "the
/// line just placed" without diffing sequence snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Lines applied so far.
    pub lines_drawn: u32,
    /// Lines requested for the whole run.
    pub total_lines: u32,
    /// `lines_drawn / total_lines` as a percentage in `[0, 100]`.
    pub percent_complete: f64,
    /// Pin the most recent segment departed from.
    pub current_pin: u32,
    /// Pin the most recent segment arrived at.
    pub next_pin: u32,
    /// Cumulative thread length in `hoop_diameter` units.
    pub thread_length: f64,
}

/// Result of a thread-path solver run.
///
/// This is the stable contract consumed by hosts: renderers walk
/// `line_sequence` over `pin_coordinates`, and export layers write the
/// record out as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadPlan {
    /// Echo of the parameters the run was started with.
    pub parameters: SolverParams,

    /// Pin coordinates, length `n_pins`.
    pub pin_coordinates: Vec<Pin>,

    /// Ordered pin indices. Starts at pin 0. Length is `n_lines + 1`
    /// for a complete run; shorter when the solver ran out of
    /// admissible candidates or was cancelled.
    pub line_sequence: Vec<u32>,

    /// Cumulative thread length in `hoop_diameter` units.
    pub total_thread_length: f64,

    /// Wall-clock duration of the run in milliseconds.
    pub processing_time_ms: f64,
}

impl ThreadPlan {
    /// Whether the run placed every requested line.
    ///
    /// `false` means the candidate set was exhausted early or the run
    /// was cancelled; the sequence built so far is still valid.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.line_sequence.len() == self.parameters.n_lines as usize + 1
    }
}

/// Errors that can occur while producing a thread plan.
///
/// Running out of admissible candidates mid-solve is deliberately
/// *not* an error: the solver returns a truncated
/// [`ThreadPlan`] and callers detect it via
/// [`ThreadPlan::completed`].
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// One or more solver parameters are outside their documented
    /// ranges. Reported before any allocation.
    #[error("invalid solver parameters: {0}")]
    InvalidParameters(ValidationReport),

    /// The source image's shorter side is below 100 pixels.
    #[error("source image is too small: shorter side is {side}px, minimum is 100px")]
    InputTooSmall {
        /// The shorter side of the source image.
        side: u32,
    },

    /// The source image's longer side is above 4000 pixels.
    #[error("source image is too large: longer side is {side}px, maximum is 4000px")]
    InputTooLarge {
        /// The longer side of the source image.
        side: u32,
    },

    /// The source image's aspect ratio is outside `[1/3, 3]`.
    #[error("source image aspect ratio {ratio:.2} is outside the supported range [1/3, 3]")]
    InputAspectExtreme {
        /// Width divided by height.
        ratio: f64,
    },

    /// Pin count outside `[3, 1000]`.
    #[error("pin count {0} is outside the supported range [3, 1000]")]
    InvalidPinCount(u32),

    /// Image size outside `[100, 2000]`.
    #[error("image size {0} is outside the supported range [100, 2000]")]
    InvalidImageSize(u32),

    /// The chord cache would exceed the memory budget; treat as a
    /// parameter problem (fewer pins or a smaller image).
    #[error("chord cache would need {required_bytes} bytes, over the {limit_bytes} byte budget")]
    ResourceExhaustion {
        /// Exact footprint the requested parameters would allocate.
        required_bytes: usize,
        /// The configured budget the footprint was checked against.
        limit_bytes: usize,
    },
}
