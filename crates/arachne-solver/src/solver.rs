//! Greedy thread-path solver operating on the residual darkness
//! field.
//!
//! Each step scores every admissible candidate pin by the residual
//! darkness its chord from the current pin would cover, picks the
//! best, subtracts the thread's weight along that chord, and moves
//! on. The pick is covariance-maximising: the chosen line is the one
//! most correlated with the darkness not yet explained by earlier
//! threads.
//!
//! Two guards shape the output. The ring-distance exclusion
//! (`min_distance`) drops near-chords too short to cover useful
//! pixels, and the recent-pin window stops the degenerate A-B-A-B
//! cycles the raw greedy rule falls into whenever two pins share a
//! very dark neighbourhood.

use std::collections::VecDeque;
use std::ops::Range;

use crate::chords::ChordCache;
use crate::residual::ResidualField;
use crate::types::{Pin, Progress, SolverParams};

/// Pin every sequence starts from.
pub const START_PIN: u32 = 0;

/// How many of the most recent pins are excluded from candidacy.
pub const RECENT_WINDOW: usize = 20;

/// Progress is published every this many applied lines (and always on
/// the final line). Bounded and independent of the line count so
/// short and long runs both report visibly.
pub const PROGRESS_INTERVAL: u32 = 10;

/// Receiver for solver progress, and the solver's cancellation
/// authority.
///
/// `publish` fires every [`PROGRESS_INTERVAL`] applied lines and once
/// on the final line; the sequence snapshot at `lines_drawn = t` holds
/// exactly `t + 1` pin indices. Ticks arrive in `lines_drawn` order.
/// `cancelled` is polled immediately after each tick — between ticks
/// the solver never suspends, so a pick-and-apply step is atomic from
/// the sink's point of view.
pub trait ProgressSink {
    /// Receive a progress record with the sequence so far and the pin
    /// table. The slices are borrowed solver state; copy what you
    /// keep.
    fn publish(&mut self, progress: &Progress, sequence: &[u32], pins: &[Pin]);

    /// Return `true` to stop the run at this tick. A cancelled run
    /// yields the partial sequence as a successful outcome.
    fn cancelled(&self) -> bool {
        false
    }
}

/// The silent sink: ignores progress, never cancels.
impl ProgressSink for () {
    fn publish(&mut self, _progress: &Progress, _sequence: &[u32], _pins: &[Pin]) {}
}

/// What a solver run produced.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Ordered pin indices, starting at [`START_PIN`]. Length is
    /// `n_lines + 1` unless the run stopped early.
    pub sequence: Vec<u32>,
    /// Cumulative thread length in `hoop_diameter` units.
    pub thread_length: f64,
    /// Whether the sink requested cancellation.
    pub cancelled: bool,
}

/// Ring offsets the candidate walk visits.
///
/// The walk covers `[min_distance, n_pins - min_distance)`; the
/// offset `n_pins - min_distance` sits at exactly the exclusion
/// radius and is admissible by ring distance, but the reference walk
/// never visits it, and the sequence contract follows the walk.
pub(crate) fn candidate_offsets(n_pins: u32, min_distance: u32) -> Range<u32> {
    min_distance..n_pins.saturating_sub(min_distance)
}

/// Enumerate the pins reachable from `current` in one step:
/// every ring offset in the candidate walk whose pin is not excluded.
///
/// This is the same enumeration the solver's hot loop performs, with
/// the recent-window check generalised to an arbitrary exclusion
/// list. Hosts use it to preview admissible moves.
#[must_use]
pub fn valid_target_pins(
    current: u32,
    min_distance: u32,
    n_pins: u32,
    exclude: &[u32],
) -> Vec<u32> {
    candidate_offsets(n_pins, min_distance)
        .map(|offset| (current + offset) % n_pins)
        .filter(|cand| !exclude.contains(cand))
        .collect()
}

/// Run the greedy loop to completion, mutating `field` in place.
///
/// Terminates after `n_lines` applied segments, when no admissible
/// candidate remains (every walkable pin is in the recent window), or
/// when the sink cancels at a progress tick. All three are successful
/// outcomes; the first is the only one that fills the sequence.
pub(crate) fn solve(
    params: &SolverParams,
    pins: &[Pin],
    chords: &ChordCache,
    field: &mut ResidualField,
    sink: &mut dyn ProgressSink,
) -> SolveOutcome {
    let n_pins = params.n_pins;
    let length_scale = params.hoop_diameter / f64::from(params.img_size);

    let mut sequence = Vec::with_capacity(params.n_lines as usize + 1);
    sequence.push(START_PIN);
    let mut recent: VecDeque<u32> = VecDeque::with_capacity(RECENT_WINDOW + 1);
    let mut current = START_PIN;
    let mut thread_length = 0.0f64;
    let mut cancelled = false;

    for line in 1..=params.n_lines {
        // Strict `>` scan from the smallest offset: equal scores keep
        // the earlier candidate, making ties deterministic.
        let mut best_pin: Option<u32> = None;
        let mut best_score = f32::NEG_INFINITY;
        for offset in candidate_offsets(n_pins, params.min_distance) {
            let cand = (current + offset) % n_pins;
            if recent.contains(&cand) {
                continue;
            }
            let Some(chord) = chords.get(current, cand) else {
                continue;
            };
            let score = field.chord_score(chord);
            if score > best_score {
                best_score = score;
                best_pin = Some(cand);
            }
        }

        // Candidate set exhausted: return the truncated sequence.
        let Some(chosen) = best_pin else { break };

        if let Some(chord) = chords.get(current, chosen) {
            field.subtract(chord, params.line_weight);
        }
        sequence.push(chosen);
        recent.push_back(chosen);
        if recent.len() > RECENT_WINDOW {
            recent.pop_front();
        }
        thread_length +=
            length_scale * pins[current as usize].distance(pins[chosen as usize]);
        let departed = current;
        current = chosen;

        if line % PROGRESS_INTERVAL == 0 || line == params.n_lines {
            let progress = Progress {
                lines_drawn: line,
                total_lines: params.n_lines,
                percent_complete: f64::from(line) / f64::from(params.n_lines) * 100.0,
                current_pin: departed,
                next_pin: chosen,
                thread_length,
            };
            sink.publish(&progress, &sequence, pins);
            if sink.cancelled() {
                cancelled = true;
                break;
            }
        }
    }

    SolveOutcome {
        sequence,
        thread_length,
        cancelled,
    }
}
