// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Luminance conversion — weighted RGB to gray, replicated into all three
// colour channels with alpha left untouched.

use image::{GrayImage, Luma, RgbaImage};
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, instrument};

const RED_WEIGHT: f64 = 0.299;
const GREEN_WEIGHT: f64 = 0.587;
const BLUE_WEIGHT: f64 = 0.114;

/// Converts colour pixels to luminance.
pub struct LuminanceConverter;

impl LuminanceConverter {
    /// Gray value of one pixel, rounded to nearest (ties to even) and clamped.
    pub fn luma(r: u8, g: u8, b: u8) -> u8 {
        let value = RED_WEIGHT * r as f64 + GREEN_WEIGHT * g as f64 + BLUE_WEIGHT * b as f64;
        value.round_ties_even().clamp(0.0, 255.0) as u8
    }

    /// Grayscale copy of `image` with R = G = B and the original alpha.
    #[instrument(skip(image), fields(width = image.width(), height = image.height()))]
    pub fn convert(image: &RgbaImage) -> Result<RgbaImage> {
        check_readable(image)?;
        let mut output = image.clone();
        for pixel in output.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let gray = Self::luma(r, g, b);
            pixel.0 = [gray, gray, gray, a];
        }
        debug!("Luminance conversion complete");
        Ok(output)
    }

    /// Single-channel luminance plane of `image`.
    pub fn to_gray(image: &RgbaImage) -> Result<GrayImage> {
        check_readable(image)?;
        Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            Luma([Self::luma(r, g, b)])
        }))
    }
}

fn check_readable(image: &RgbaImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ScanwerkError::ProcessingFailure(
            "cannot convert an empty pixel buffer".into(),
        ));
    }
    Ok(())
}
