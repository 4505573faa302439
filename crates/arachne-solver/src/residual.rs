//! Residual darkness field: the unexplained darkness the solver
//! consumes.
//!
//! A contiguous single-precision buffer in row-major layout, flat
//! index `y * size + x`. Each element starts at `255 - luminance`
//! inside the hoop disc and `0` outside, and decreases as threads
//! pass over it. The field is the solver's only mutable state.

use crate::canonical::CanonicalImage;

/// Owned single-channel f32 field over the canonicalised raster.
#[derive(Debug, Clone)]
pub struct ResidualField {
    size: u32,
    data: Vec<f32>,
}

impl ResidualField {
    /// Initialise the field from a canonicalised image.
    ///
    /// Masked-out pixels carry no darkness to explain, so they start
    /// (and stay) at zero regardless of their luminance.
    #[must_use]
    pub fn from_canonical(image: &CanonicalImage) -> Self {
        let data = image
            .luma()
            .iter()
            .zip(image.mask())
            .map(|(&luma, &mask)| {
                if mask == 1 {
                    f32::from(255 - luma)
                } else {
                    0.0
                }
            })
            .collect();
        Self {
            size: image.size(),
            data,
        }
    }

    /// Side length in pixels.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// The backing buffer, length `size * size`.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Sum of residual darkness over a chord's pixel indices.
    ///
    /// Indices past the end of the field are skipped silently; floor
    /// artefacts on the disc boundary may produce them and they must
    /// not derail a run.
    #[must_use]
    pub fn chord_score(&self, chord: &[u32]) -> f32 {
        let mut sum = 0.0f32;
        for &p in chord {
            if let Some(&value) = self.data.get(p as usize) {
                sum += value;
            }
        }
        sum
    }

    /// Subtract one thread's weight along a chord, clamping every
    /// element to `[0, 255]`.
    ///
    /// The upper clamp is unreachable under pure subtraction from a
    /// `[0, 255]` start; it is kept so alternative weight schemes
    /// (additive or negative) stay well-defined.
    pub fn subtract(&mut self, chord: &[u32], weight: u8) {
        let w = f32::from(weight);
        for &p in chord {
            if let Some(value) = self.data.get_mut(p as usize) {
                *value = (*value - w).clamp(0.0, 255.0);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::canonical::canonicalise;

    fn solid_png(side: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(
            side,
            side,
            image::Rgba([rgb[0], rgb[1], rgb[2], 255]),
        );
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

    #[test]
    fn black_disc_starts_at_full_darkness_inside_zero_outside() {
        let canonical = canonicalise(&solid_png(200, [0, 0, 0]), 100).unwrap();
        let field = ResidualField::from_canonical(&canonical);
        for y in 0..100 {
            for x in 0..100 {
                let value = field.as_slice()[(y * 100 + x) as usize];
                let expected = if canonical.is_inside(x, y) { 255.0 } else { 0.0 };
                assert!(
                    (value - expected).abs() < f32::EPSILON,
                    "unexpected residual {value} at ({x}, {y})",
                );
            }
        }
    }

    #[test]
    fn white_image_starts_all_zero() {
        let canonical = canonicalise(&solid_png(200, [255, 255, 255]), 100).unwrap();
        let field = ResidualField::from_canonical(&canonical);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn chord_score_sums_the_touched_pixels() {
        let canonical = canonicalise(&solid_png(200, [0, 0, 0]), 100).unwrap();
        let field = ResidualField::from_canonical(&canonical);
        // Three pixels on the centre row, all inside the disc.
        let chord = [50 * 100 + 49, 50 * 100 + 50, 50 * 100 + 51];
        assert!((field.chord_score(&chord) - 3.0 * 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn chord_score_skips_out_of_range_indices() {
        let canonical = canonicalise(&solid_png(200, [0, 0, 0]), 100).unwrap();
        let field = ResidualField::from_canonical(&canonical);
        let in_range = [50 * 100 + 50];
        let with_overflow = [50 * 100 + 50, 100 * 100, u32::MAX];
        assert!(
            (field.chord_score(&with_overflow) - field.chord_score(&in_range)).abs()
                < f32::EPSILON,
        );
    }

    #[test]
    fn subtract_reduces_by_weight_and_floors_at_zero() {
        let canonical = canonicalise(&solid_png(200, [0, 0, 0]), 100).unwrap();
        let mut field = ResidualField::from_canonical(&canonical);
        let chord = [50 * 100 + 50];

        field.subtract(&chord, 100);
        assert!((field.as_slice()[chord[0] as usize] - 155.0).abs() < f32::EPSILON);

        field.subtract(&chord, 200);
        assert!(field.as_slice()[chord[0] as usize] == 0.0);

        // Repeated subtraction stays clamped at zero.
        field.subtract(&chord, 200);
        assert!(field.as_slice()[chord[0] as usize] == 0.0);
    }

    #[test]
    fn subtract_ignores_out_of_range_indices() {
        let canonical = canonicalise(&solid_png(200, [0, 0, 0]), 100).unwrap();
        let mut field = ResidualField::from_canonical(&canonical);
        field.subtract(&[u32::MAX], 255);
        // No panic and nothing changed.
        assert!((field.chord_score(&[50 * 100 + 50]) - 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn all_values_stay_in_range_after_many_writes() {
        let canonical = canonicalise(&solid_png(200, [60, 60, 60]), 100).unwrap();
        let mut field = ResidualField::from_canonical(&canonical);
        let chord: Vec<u32> = (0..100u32).map(|x| 50 * 100 + x).collect();
        for _ in 0..40 {
            field.subtract(&chord, 20);
        }
        assert!(field
            .as_slice()
            .iter()
            .all(|&v| (0.0..=255.0).contains(&v)));
    }
}
