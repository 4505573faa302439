//! Image canonicalisation: centre square crop, luminance, circular mask.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! square single-channel luminance buffer the solver consumes, with
//! everything outside the hoop's inscribed disc zeroed.
//!
//! This is the first stage of the pipeline: raw bytes in,
//! [`CanonicalImage`] out.

use image::imageops::FilterType;

use crate::types::PlanError;

/// Minimum shorter side of an acceptable source image, in pixels.
pub const MIN_SOURCE_SIDE: u32 = 100;
/// Maximum longer side of an acceptable source image, in pixels.
pub const MAX_SOURCE_SIDE: u32 = 4000;
/// Maximum width:height (or height:width) ratio of a source image.
pub const MAX_ASPECT_RATIO: f64 = 3.0;

/// A square, single-channel, circularly-masked luminance image.
///
/// Both buffers are contiguous row-major with flat index
/// `y * size + x`. The mask is `1` inside the inscribed disc and `0`
/// outside; luminance outside the disc is always `0`.
#[derive(Debug, Clone)]
pub struct CanonicalImage {
    size: u32,
    source_width: u32,
    source_height: u32,
    luma: Vec<u8>,
    mask: Vec<u8>,
}

impl CanonicalImage {
    /// Side length in pixels.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Width of the source image before cropping.
    #[must_use]
    pub const fn source_width(&self) -> u32 {
        self.source_width
    }

    /// Height of the source image before cropping.
    #[must_use]
    pub const fn source_height(&self) -> u32 {
        self.source_height
    }

    /// The luminance buffer, length `size * size`.
    #[must_use]
    pub fn luma(&self) -> &[u8] {
        &self.luma
    }

    /// The 0/1 disc mask, length `size * size`.
    #[must_use]
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Luminance at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when `x` or `y` is outside `[0, size)`.
    #[must_use]
    pub fn luma_at(&self, x: u32, y: u32) -> u8 {
        assert!(x < self.size && y < self.size, "pixel out of range");
        self.luma[(y * self.size + x) as usize]
    }

    /// Whether `(x, y)` lies inside the inscribed disc.
    ///
    /// # Panics
    ///
    /// Panics when `x` or `y` is outside `[0, size)`.
    #[must_use]
    pub fn is_inside(&self, x: u32, y: u32) -> bool {
        assert!(x < self.size && y < self.size, "pixel out of range");
        self.mask[(y * self.size + x) as usize] == 1
    }

    /// Number of pixels inside the disc.
    #[must_use]
    pub fn disc_pixel_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m == 1).count()
    }
}

/// Decode, crop, scale, convert and mask raw image bytes into the
/// solver's working buffer.
///
/// Steps, in order: centre square crop of the decoded image, bilinear
/// scale to `img_size × img_size`, Rec.601 luminance
/// (`⌊0.299R + 0.587G + 0.114B⌋`, alpha ignored), then zero every
/// pixel outside the inscribed disc.
///
/// # Errors
///
/// Returns [`PlanError::EmptyInput`] if `bytes` is empty and
/// [`PlanError::ImageDecode`] if the format is unrecognized. Shape
/// violations ([`PlanError::InputTooSmall`] below 100px,
/// [`PlanError::InputTooLarge`] above 4000px,
/// [`PlanError::InputAspectExtreme`] outside 1:3..3:1) are reported
/// before any pixel work commits.
pub fn canonicalise(bytes: &[u8], img_size: u32) -> Result<CanonicalImage, PlanError> {
    if bytes.is_empty() {
        return Err(PlanError::EmptyInput);
    }
    let decoded = image::load_from_memory(bytes)?;
    let (source_width, source_height) = (decoded.width(), decoded.height());
    check_source_shape(source_width, source_height)?;

    // Centre square crop, then scale-blit to the working resolution.
    let side = source_width.min(source_height);
    let x_off = (source_width - side) / 2;
    let y_off = (source_height - side) / 2;
    let square = decoded
        .crop_imm(x_off, y_off, side, side)
        .resize_exact(img_size, img_size, FilterType::Triangle)
        .to_rgba8();

    let len = (img_size as usize) * (img_size as usize);
    let mut luma = vec![0u8; len];
    let mut mask = vec![0u8; len];
    for y in 0..img_size {
        for x in 0..img_size {
            if disc_contains(img_size, x, y) {
                let k = (y * img_size + x) as usize;
                let [r, g, b, _a] = square.get_pixel(x, y).0;
                luma[k] = luminance(r, g, b);
                mask[k] = 1;
            }
        }
    }

    Ok(CanonicalImage {
        size: img_size,
        source_width,
        source_height,
        luma,
        mask,
    })
}

/// Check decoded source dimensions against the documented bounds.
///
/// # Errors
///
/// Returns the matching [`PlanError`] shape variant on violation.
pub fn check_source_shape(width: u32, height: u32) -> Result<(), PlanError> {
    let short = width.min(height);
    let long = width.max(height);
    if short < MIN_SOURCE_SIDE {
        return Err(PlanError::InputTooSmall { side: short });
    }
    if long > MAX_SOURCE_SIDE {
        return Err(PlanError::InputTooLarge { side: long });
    }
    let ratio = f64::from(width) / f64::from(height);
    if !(MAX_ASPECT_RATIO.recip()..=MAX_ASPECT_RATIO).contains(&ratio) {
        return Err(PlanError::InputAspectExtreme { ratio });
    }
    Ok(())
}

/// Rec.601 luminance with the reference's floor semantics.
///
/// Evaluated as plain `a*R + b*G + c*B` left to right — fusing the
/// multiply-adds changes the rounding on knife-edge sums (pure white
/// must floor to 255, not 254).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::suboptimal_flops)]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.floor().clamp(0.0, 255.0) as u8
}

/// Whether the pixel centre of `(x, y)` lies within the inscribed
/// disc of a `size × size` raster.
fn disc_contains(size: u32, x: u32, y: u32) -> bool {
    let c = f64::from(size) / 2.0;
    let dx = f64::from(x) + 0.5 - c;
    let dy = f64::from(y) + 0.5 - c;
    dx.mul_add(dx, dy * dy) <= c * c
}
