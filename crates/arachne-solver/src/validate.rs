//! Pure parameter validation.
//!
//! Hosts run these predicates against raw slider/form values before
//! constructing a [`SolverParams`](crate::types::SolverParams), so the
//! raw entry points take `f64` and report non-integer values with
//! their own message. Nothing here allocates buffers or touches the
//! image; validation always runs to completion and collects every
//! violation, not just the first.
//!
//! The message strings are part of the host contract — UIs display
//! them verbatim — so they are fixed here as constants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::SolverParams;

/// Pin count below 3 cannot form a chord fan.
pub const MSG_PINS_MIN: &str = "Number of pins must be at least 3";
/// Pin count above 1000 makes the chord cache quadratic-expensive.
pub const MSG_PINS_MAX: &str = "Number of pins should not exceed 1000 for performance reasons";
/// Fractional pin counts are rejected rather than rounded.
pub const MSG_PINS_INT: &str = "Number of pins must be an integer";
/// Working image below 100 pixels loses all tonal detail.
pub const MSG_SIZE_MIN: &str = "Image size must be at least 100 pixels";
/// Working image above 2000 pixels makes chords prohibitively long.
pub const MSG_SIZE_MAX: &str = "Image size should not exceed 2000 pixels for performance reasons";
/// Fractional image sizes are rejected rather than rounded.
pub const MSG_SIZE_INT: &str = "Image size must be an integer";

const MSG_LINES_MIN: &str = "Number of lines must be at least 1";
const MSG_WEIGHT_MIN: &str = "Line weight must be at least 1";
const MSG_MIN_DISTANCE_MIN: &str = "Minimum pin distance must be at least 1";
const MSG_MIN_DISTANCE_MAX: &str = "Minimum pin distance must be less than half the number of pins";
const MSG_HOOP_POSITIVE: &str = "Hoop diameter must be a positive number";

const MSG_IMAGE_MIN: &str = "Image must be at least 100 pixels on its shorter side";
const MSG_IMAGE_MAX: &str = "Image should not exceed 4000 pixels for performance reasons";
const MSG_IMAGE_ASPECT: &str = "Image aspect ratio must be between 1:3 and 3:1";

/// Outcome of a validation pass: valid iff no messages were collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    /// `true` when no violations were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The collected violation messages, in check order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn push(&mut self, message: &str) {
        self.errors.push(message.to_owned());
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.errors.join("; "))
    }
}

/// Validate raw (pre-coercion) pin count and image size values.
///
/// Takes `f64` so values straight from a UI control can be checked
/// before being cast: a fractional value fails with its "must be an
/// integer" message instead of being silently truncated.
#[must_use]
pub fn check_values(n_pins: f64, img_size: f64) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_pin_count(n_pins, &mut report);
    check_image_size(img_size, &mut report);
    report
}

/// Validate decoded source image dimensions.
///
/// Advisory for callers: the canonicaliser enforces the same bounds
/// and refuses to commit on violation.
#[must_use]
pub fn check_image_dimensions(width: u32, height: u32) -> ValidationReport {
    let mut report = ValidationReport::default();
    if width.min(height) < crate::canonical::MIN_SOURCE_SIDE {
        report.push(MSG_IMAGE_MIN);
    }
    if width.max(height) > crate::canonical::MAX_SOURCE_SIDE {
        report.push(MSG_IMAGE_MAX);
    }
    if width > 0 && height > 0 {
        let ratio = f64::from(width) / f64::from(height);
        if !(crate::canonical::MAX_ASPECT_RATIO.recip()..=crate::canonical::MAX_ASPECT_RATIO)
            .contains(&ratio)
        {
            report.push(MSG_IMAGE_ASPECT);
        }
    }
    report
}

/// Validate a typed parameter record.
///
/// The "must be an integer" checks cannot fire here — the fields are
/// already integers — but every range rule of [`check_values`] is
/// applied identically, plus the rules for the fields raw UI values
/// never carry (line count, weight, ring distance, hoop diameter).
#[must_use]
pub fn check_params(params: &SolverParams) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_pin_count(f64::from(params.n_pins), &mut report);
    check_image_size(f64::from(params.img_size), &mut report);

    if params.n_lines < 1 {
        report.push(MSG_LINES_MIN);
    }
    if params.line_weight < 1 {
        report.push(MSG_WEIGHT_MIN);
    }
    if params.min_distance < 1 {
        report.push(MSG_MIN_DISTANCE_MIN);
    }
    // Half-open bound: at exactly n_pins / 2 the candidate walk
    // collapses to at most one offset.
    if 2 * params.min_distance >= params.n_pins {
        report.push(MSG_MIN_DISTANCE_MAX);
    }
    if !(params.hoop_diameter > 0.0 && params.hoop_diameter.is_finite()) {
        report.push(MSG_HOOP_POSITIVE);
    }
    report
}

fn check_pin_count(n_pins: f64, report: &mut ValidationReport) {
    if n_pins < 3.0 {
        report.push(MSG_PINS_MIN);
    }
    if n_pins > 1000.0 {
        report.push(MSG_PINS_MAX);
    }
    if n_pins.fract() != 0.0 {
        report.push(MSG_PINS_INT);
    }
}

fn check_image_size(img_size: f64, report: &mut ValidationReport) {
    if img_size < 100.0 {
        report.push(MSG_SIZE_MIN);
    }
    if img_size > 2000.0 {
        report.push(MSG_SIZE_MAX);
    }
    if img_size.fract() != 0.0 {
        report.push(MSG_SIZE_INT);
    }
}
