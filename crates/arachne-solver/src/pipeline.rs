//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::generate`] which runs everything in one call, the
//! staged API lets a host drive execution one step at a time:
//!
//! ```rust
//! # use arachne_solver::pipeline::Pending;
//! # use arachne_solver::types::{PlanError, SolverParams};
//! # fn run(png: Vec<u8>) -> Result<(), PlanError> {
//! let params = SolverParams::default();
//! let solved = Pending::new(png, params)
//!     .canonicalise()?
//!     .place_pins()?
//!     .build_chords()?
//!     .solve(&mut ());
//!
//! let plan = solved.into_plan(0.0);
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next stage (or
//! `Result` for fallible transitions), carrying previously computed
//! intermediates forward. Accessors expose the current stage's output
//! so a host can render previews between steps — the canonicalised
//! disc after decoding, the pin layout before the solve starts.

use crate::canonical::{self, CanonicalImage};
use crate::chords::ChordCache;
use crate::pins;
use crate::residual::ResidualField;
use crate::solver::{self, ProgressSink, SolveOutcome};
use crate::types::{Pin, PlanError, SolverParams, ThreadPlan};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// The source image bytes and parameters are stored but not yet
/// touched.
#[must_use = "pipeline stages are consumed by advancing — call .canonicalise() to continue"]
pub struct Pending {
    params: SolverParams,
    source: Vec<u8>,
}

impl Pending {
    /// Store source bytes and parameters for a run.
    pub const fn new(source: Vec<u8>, params: SolverParams) -> Self {
        Self { params, source }
    }

    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Validate parameters, decode the source and produce the masked
    /// luminance buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidParameters`] before touching the
    /// image, then any decode or shape error from
    /// [`canonical::canonicalise`].
    pub fn canonicalise(self) -> Result<Canonicalised, PlanError> {
        let report = self.params.validate();
        if !report.is_valid() {
            return Err(PlanError::InvalidParameters(report));
        }
        let image = canonical::canonicalise(&self.source, self.params.img_size)?;
        Ok(Canonicalised {
            params: self.params,
            image,
        })
    }
}

// ──────────────────────── Stage 1: Canonicalised ─────────────────────

/// Pipeline state after image canonicalisation.
#[must_use = "pipeline stages are consumed by advancing — call .place_pins() to continue"]
pub struct Canonicalised {
    params: SolverParams,
    image: CanonicalImage,
}

impl Canonicalised {
    /// The canonicalised luminance buffer.
    #[must_use]
    pub const fn image(&self) -> &CanonicalImage {
        &self.image
    }

    /// Compute the pin layout.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidPinCount`] or
    /// [`PlanError::InvalidImageSize`]; unreachable after
    /// [`Pending::canonicalise`] validated the same ranges.
    pub fn place_pins(self) -> Result<PinsPlaced, PlanError> {
        let pins = pins::place_pins(self.params.n_pins, self.params.img_size)?;
        Ok(PinsPlaced {
            params: self.params,
            image: self.image,
            pins,
        })
    }
}

// ───────────────────────── Stage 2: PinsPlaced ───────────────────────

/// Pipeline state after pin placement.
#[must_use = "pipeline stages are consumed by advancing — call .build_chords() to continue"]
pub struct PinsPlaced {
    params: SolverParams,
    image: CanonicalImage,
    pins: Vec<Pin>,
}

impl PinsPlaced {
    /// The canonicalised luminance buffer.
    #[must_use]
    pub const fn image(&self) -> &CanonicalImage {
        &self.image
    }

    /// The pin layout.
    #[must_use]
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Materialise the chord pixel cache.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::ResourceExhaustion`] when the cache would
    /// exceed its memory budget; nothing is allocated in that case.
    pub fn build_chords(self) -> Result<ChordsBuilt, PlanError> {
        let chords = ChordCache::build(&self.pins, self.params.img_size, self.params.min_distance)?;
        Ok(ChordsBuilt {
            params: self.params,
            image: self.image,
            pins: self.pins,
            chords,
        })
    }
}

// ───────────────────────── Stage 3: ChordsBuilt ──────────────────────

/// Pipeline state after chord cache construction. Everything the
/// greedy loop needs is now in place.
#[must_use = "pipeline stages are consumed by advancing — call .solve() to continue"]
pub struct ChordsBuilt {
    params: SolverParams,
    image: CanonicalImage,
    pins: Vec<Pin>,
    chords: ChordCache,
}

impl ChordsBuilt {
    /// The chord pixel cache.
    #[must_use]
    pub const fn chords(&self) -> &ChordCache {
        &self.chords
    }

    /// The pin layout.
    #[must_use]
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Run the greedy loop to completion (or cancellation), consuming
    /// the image into the residual field.
    ///
    /// This transition is infallible: running out of candidates early
    /// produces a truncated sequence, not an error.
    pub fn solve(self, sink: &mut dyn ProgressSink) -> Solved {
        let mut field = ResidualField::from_canonical(&self.image);
        let outcome = solver::solve(&self.params, &self.pins, &self.chords, &mut field, sink);
        Solved {
            params: self.params,
            pins: self.pins,
            field,
            outcome,
        }
    }
}

// ─────────────────────────── Stage 4: Solved ─────────────────────────

/// Final pipeline state: the sequence has been built.
///
/// Retains the spent residual field so diagnostics and tests can
/// inspect what darkness the plan left unexplained.
#[must_use = "call .into_plan() to obtain the ThreadPlan"]
pub struct Solved {
    params: SolverParams,
    pins: Vec<Pin>,
    field: ResidualField,
    outcome: SolveOutcome,
}

impl Solved {
    /// What the solver produced.
    #[must_use]
    pub const fn outcome(&self) -> &SolveOutcome {
        &self.outcome
    }

    /// The pin layout.
    #[must_use]
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// The residual field after all subtractions.
    #[must_use]
    pub const fn residual(&self) -> &ResidualField {
        &self.field
    }

    /// Assemble the result record. The caller supplies the wall-clock
    /// duration since it owns the timing of the whole run (including
    /// stages outside this pipeline).
    #[must_use]
    pub fn into_plan(self, processing_time_ms: f64) -> ThreadPlan {
        ThreadPlan {
            parameters: self.params,
            pin_coordinates: self.pins,
            line_sequence: self.outcome.sequence,
            total_thread_length: self.outcome.thread_length,
            processing_time_ms,
        }
    }
}
