//! Chord pixel cache: discretised thread segments between admissible
//! pin pairs.
//!
//! For every pin pair far enough apart on the ring, the cache holds
//! the flat pixel indices (`y * img_size + x`) of the straight
//! segment between them. The greedy loop reads these lists thousands
//! of times per placed line, so they are materialised once up front.
//!
//! Both lookup directions share one allocation: the table stores an
//! `Arc<[u32]>` under `(a, b)` and a clone of it under `(b, a)`, so
//! the hot loop never branches on index order while memory stays
//! triangular.

use std::sync::Arc;

use crate::types::{Pin, PlanError};

/// Upper bound on the materialised cache footprint.
///
/// The reference scale (360 pins on a 500px raster) needs well under
/// 100 MiB; anything above this limit is a parameter problem, not a
/// reason to swap.
pub const MAX_CACHE_BYTES: usize = 512 * 1024 * 1024;

/// Shorter of the two arc distances between pin indices `a` and `b`.
#[must_use]
pub fn ring_distance(n_pins: u32, a: u32, b: u32) -> u32 {
    let direct = a.abs_diff(b);
    direct.min(n_pins - direct)
}

/// Pixel-index lists for every admissible pin pair.
#[derive(Debug, Clone)]
pub struct ChordCache {
    n_pins: u32,
    entries: Vec<Option<Arc<[u32]>>>,
    pair_count: usize,
    pixel_count: usize,
}

impl ChordCache {
    /// Materialise the cache for `pins` with the given ring-distance
    /// exclusion.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::ResourceExhaustion`] when the exact
    /// footprint would exceed [`MAX_CACHE_BYTES`]; nothing is
    /// allocated in that case.
    pub fn build(pins: &[Pin], img_size: u32, min_distance: u32) -> Result<Self, PlanError> {
        Self::build_with_limit(pins, img_size, min_distance, MAX_CACHE_BYTES)
    }

    // Pin counts are validated to [3, 1000] before this runs, so the
    // usize -> u32 index casts cannot truncate.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn build_with_limit(
        pins: &[Pin],
        img_size: u32,
        min_distance: u32,
        limit_bytes: usize,
    ) -> Result<Self, PlanError> {
        let n = pins.len();
        let n_pins = n as u32;

        // Exact footprint pre-check: sample counts are a pure function
        // of pin geometry, so the budget decision needs no allocation.
        let mut pixel_count = 0usize;
        let mut pair_count = 0usize;
        for a in 0..n {
            for b in (a + 1)..n {
                if ring_distance(n_pins, a as u32, b as u32) < min_distance {
                    continue;
                }
                pair_count += 1;
                pixel_count += sample_count(pins[a], pins[b]);
            }
        }
        let required_bytes = pixel_count * std::mem::size_of::<u32>();
        if required_bytes > limit_bytes {
            return Err(PlanError::ResourceExhaustion {
                required_bytes,
                limit_bytes,
            });
        }

        let mut entries: Vec<Option<Arc<[u32]>>> = vec![None; n * n];
        for a in 0..n {
            for b in (a + 1)..n {
                if ring_distance(n_pins, a as u32, b as u32) < min_distance {
                    continue;
                }
                let chord: Arc<[u32]> = chord_pixels(pins[a], pins[b], img_size).into();
                entries[a * n + b] = Some(Arc::clone(&chord));
                entries[b * n + a] = Some(chord);
            }
        }

        Ok(Self {
            n_pins,
            entries,
            pair_count,
            pixel_count,
        })
    }

    /// Number of pins the cache was built for.
    #[must_use]
    pub const fn n_pins(&self) -> u32 {
        self.n_pins
    }

    /// The pixel indices of the segment between pins `a` and `b`, or
    /// `None` when the pair is inadmissible (too close on the ring)
    /// or either index is out of range.
    #[must_use]
    pub fn get(&self, a: u32, b: u32) -> Option<&[u32]> {
        if a >= self.n_pins || b >= self.n_pins {
            return None;
        }
        let idx = (a as usize) * (self.n_pins as usize) + b as usize;
        self.entries[idx].as_deref()
    }

    /// Number of admissible unordered pin pairs.
    #[must_use]
    pub const fn pair_count(&self) -> usize {
        self.pair_count
    }

    /// Total pixel samples across all pairs, counted once per
    /// unordered pair.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Bytes held by the materialised chord data.
    #[must_use]
    pub const fn footprint_bytes(&self) -> usize {
        self.pixel_count * std::mem::size_of::<u32>()
    }
}

/// Sample count for a pin pair: the floored Euclidean distance.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_count(a: Pin, b: Pin) -> usize {
    a.distance(b).floor() as usize
}

/// Discretise the segment from `a` to `b` into flat pixel indices.
///
/// Linspace-with-floor: `d = ⌊euclid(a, b)⌋` samples at uniform
/// parameter steps, each coordinate floored independently. This exact
/// discretisation is load-bearing — the greedy ranking is sensitive
/// to which pixels a chord claims, so a Bresenham walk here would
/// change the output sequence.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn chord_pixels(a: Pin, b: Pin, img_size: u32) -> Vec<u32> {
    let d = sample_count(a, b);
    if d == 0 {
        return Vec::new();
    }
    let flat = |x: i64, y: i64| -> Option<u32> {
        let size = i64::from(img_size);
        // Boundary floor artefacts can step one pixel outside the
        // raster; those samples are dropped rather than wrapped.
        (x >= 0 && x < size && y >= 0 && y < size).then(|| (y * size + x) as u32)
    };
    if d == 1 {
        return flat(i64::from(a.x), i64::from(a.y)).into_iter().collect();
    }

    let steps = (d - 1) as f64;
    let step_x = (f64::from(b.x) - f64::from(a.x)) / steps;
    let step_y = (f64::from(b.y) - f64::from(a.y)) / steps;
    (0..d)
        .filter_map(|i| {
            let t = i as f64;
            let x = step_x.mul_add(t, f64::from(a.x)).floor() as i64;
            let y = step_y.mul_add(t, f64::from(a.y)).floor() as i64;
            flat(x, y)
        })
        .collect()
}
