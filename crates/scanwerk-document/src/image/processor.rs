// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decoding, orientation, rectangular and bounding-box
// crops, and JPEG encoding. Operates on in-memory images using the `image`
// crate.

use image::{DynamicImage, RgbaImage};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{Quadrilateral, Rect};
use tracing::{debug, instrument};

use super::orientation::{ExifOrientation, OrientationNormalizer};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`
/// wrapping the result, enabling method chaining.
///
/// ```ignore
/// let upright = ImageProcessor::from_bytes(&bytes)?
///     .orient(ExifOrientation::Rotate90Cw)
///     .into_rgba8();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| {
            ScanwerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Consume the processor and return 8-bit RGBA pixels.
    pub fn into_rgba8(self) -> RgbaImage {
        self.image.into_rgba8()
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Undo a camera orientation.
    pub fn orient(self, orientation: ExifOrientation) -> Self {
        if orientation == ExifOrientation::Normal {
            return self;
        }
        Self {
            image: OrientationNormalizer::apply(&self.image, orientation),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        encode_jpeg(&self.image, quality)
    }
}

// -- Crops ------------------------------------------------------------------

/// Crop `image` to `rect` (logical pixels), rounding each edge to the
/// nearest pixel. The result is clamped to the image and at least 1x1 when
/// the image is non-empty.
pub fn crop_rect(image: &RgbaImage, rect: &Rect) -> RgbaImage {
    let (x, width) = pixel_span(rect.x.round(), rect.right().round(), image.width());
    let (y, height) = pixel_span(rect.y.round(), rect.bottom().round(), image.height());
    debug!(x, y, width, height, "Rectangular crop");
    image::imageops::crop_imm(image, x, y, width, height).to_image()
}

/// Crop `image` to the axis-aligned bounding box of `quad`, expanded outward
/// to whole pixels, clamped to the image and at least 1x1.
pub fn crop_to_bounding_box(image: &RgbaImage, quad: &Quadrilateral) -> RgbaImage {
    let bounds = quad.bounding_box();
    let (x, width) = pixel_span(bounds.x.floor(), bounds.right().ceil(), image.width());
    let (y, height) = pixel_span(bounds.y.floor(), bounds.bottom().ceil(), image.height());
    debug!(x, y, width, height, "Bounding-box crop");
    image::imageops::crop_imm(image, x, y, width, height).to_image()
}

/// Whole-pixel `[lo, hi)` clamped to `[0, limit]`, returned as
/// `(start, len)` with `len >= 1` whenever `limit > 0`.
fn pixel_span(lo: f64, hi: f64, limit: u32) -> (u32, u32) {
    let max = limit as f64;
    let lo = if lo.is_finite() { lo.clamp(0.0, max) } else { 0.0 };
    let hi = if hi.is_finite() { hi.clamp(0.0, max) } else { max };
    let start = (lo as u32).min(limit.saturating_sub(1));
    let end = (hi as u32).max(start + 1).min(limit);
    (start, end.saturating_sub(start))
}

// -- Encoding ---------------------------------------------------------------

/// Encode an image as baseline JPEG at `quality` (1-100).
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| ScanwerkError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}
