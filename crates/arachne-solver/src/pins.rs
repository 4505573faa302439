//! Pin placement on the hoop's inscribed circle.
//!
//! Pin 0 sits on the positive-x axis; indices increase
//! counter-clockwise in image coordinates (the y-axis points down, so
//! the progression looks clockwise on screen). The radius is inset by
//! half a pixel so every floored coordinate stays inside the raster.

use std::f64::consts::TAU;

use crate::types::{Pin, PlanError};

/// Compute `n_pins` evenly spaced pin coordinates for an
/// `img_size × img_size` raster.
///
/// Deterministic and pure. Each angle is computed directly from the
/// pin index — never by accumulating a step — so there is no drift
/// for large pin counts.
///
/// # Errors
///
/// Returns [`PlanError::InvalidPinCount`] when `n_pins` is outside
/// `[3, 1000]` and [`PlanError::InvalidImageSize`] when `img_size` is
/// outside `[100, 2000]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn place_pins(n_pins: u32, img_size: u32) -> Result<Vec<Pin>, PlanError> {
    if !(3..=1000).contains(&n_pins) {
        return Err(PlanError::InvalidPinCount(n_pins));
    }
    if !(100..=2000).contains(&img_size) {
        return Err(PlanError::InvalidImageSize(img_size));
    }

    let centre = f64::from(img_size) / 2.0;
    let radius = centre - 0.5;
    let pins = (0..n_pins)
        .map(|i| {
            let angle = TAU * f64::from(i) / f64::from(n_pins);
            // radius <= centre - 0.5 keeps both coordinates within
            // [0, img_size) after flooring, so the casts are exact.
            let x = radius.mul_add(angle.cos(), centre).floor();
            let y = radius.mul_add(angle.sin(), centre).floor();
            Pin::new(x as u32, y as u32)
        })
        .collect();
    Ok(pins)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_few_pins() {
        assert!(matches!(
            place_pins(2, 200),
            Err(PlanError::InvalidPinCount(2)),
        ));
    }

    #[test]
    fn rejects_too_many_pins() {
        assert!(matches!(
            place_pins(1001, 200),
            Err(PlanError::InvalidPinCount(1001)),
        ));
    }

    #[test]
    fn rejects_image_size_out_of_range() {
        assert!(matches!(
            place_pins(100, 99),
            Err(PlanError::InvalidImageSize(99)),
        ));
        assert!(matches!(
            place_pins(100, 2001),
            Err(PlanError::InvalidImageSize(2001)),
        ));
    }

    #[test]
    fn returns_requested_count() {
        let pins = place_pins(360, 500).unwrap();
        assert_eq!(pins.len(), 360);
    }

    #[test]
    fn four_pins_land_on_the_axes() {
        // Reference positions for n_pins=4, img_size=200 are
        // approximately (199,100), (100,199), (0,100), (100,0);
        // flooring may shave one pixel.
        let pins = place_pins(4, 200).unwrap();
        let ideal = [(199.0, 100.0), (100.0, 199.0), (0.0, 100.0), (100.0, 0.0)];
        for (pin, (ix, iy)) in pins.iter().zip(ideal) {
            assert!(
                (f64::from(pin.x) - ix).abs() <= 1.0 && (f64::from(pin.y) - iy).abs() <= 1.0,
                "pin ({}, {}) too far from ideal ({ix}, {iy})",
                pin.x,
                pin.y,
            );
        }
    }

    #[test]
    fn pin_zero_is_on_the_positive_x_axis() {
        let pins = place_pins(360, 500).unwrap();
        assert_eq!(pins[0], Pin::new(499, 250));
    }

    #[test]
    fn all_pins_inside_raster_and_on_the_rim() {
        for (n_pins, img_size) in [(3, 100), (36, 250), (360, 500), (1000, 2000)] {
            let pins = place_pins(n_pins, img_size).unwrap();
            let c = f64::from(img_size) / 2.0;
            for (i, pin) in pins.iter().enumerate() {
                assert!(pin.x < img_size && pin.y < img_size, "pin {i} outside raster");
                // Flooring moves each coordinate by less than one
                // pixel, so the distance to the centre stays within
                // √2 of the ideal inset radius c - 0.5.
                let dx = f64::from(pin.x) - c;
                let dy = f64::from(pin.y) - c;
                let dist = dx.hypot(dy);
                assert!(
                    (dist - (c - 0.5)).abs() <= std::f64::consts::SQRT_2,
                    "pin {i} at ({}, {}) has rim distance {dist}, ideal {}",
                    pin.x,
                    pin.y,
                    c - 0.5,
                );
            }
        }
    }

    #[test]
    fn placement_is_rotationally_regular() {
        // Rotating pin[i] by -2πk/n around the centre lands within one
        // pixel of pin[(i+k) % n] on each axis (flooring noise).
        let n = 36;
        let pins = place_pins(n, 300).unwrap();
        let c = 150.0;
        for k in [1, 5, 17] {
            let theta = -TAU * f64::from(k) / f64::from(n);
            let (sin, cos) = theta.sin_cos();
            for i in 0..n {
                let dx = f64::from(pins[i as usize].x) - c;
                let dy = f64::from(pins[i as usize].y) - c;
                let rx = dx.mul_add(cos, dy * sin) + c;
                let ry = dy.mul_add(cos, -(dx * sin)) + c;
                let target = pins[((i + k) % n) as usize];
                // Source and target are independently floored, so the
                // rotated coordinate can be off by a little more than
                // one pixel in the worst case.
                assert!(
                    (rx - f64::from(target.x)).abs() <= 1.5
                        && (ry - f64::from(target.y)).abs() <= 1.5,
                    "pin {i} rotated by {k} steps lands at ({rx:.2}, {ry:.2}), \
                     expected near ({}, {})",
                    target.x,
                    target.y,
                );
            }
        }
    }

    #[test]
    fn determinism_across_calls() {
        assert_eq!(place_pins(97, 333).unwrap(), place_pins(97, 333).unwrap());
    }
}
