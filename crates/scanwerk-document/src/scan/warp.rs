// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective correction — map a user-outlined quadrilateral onto an upright
// rectangle, falling back to a bounding-box crop when the quad is degenerate.

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{Point, Quadrilateral};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::crop_to_bounding_box;

/// Quads with less area than this (square pixels) are not warped.
const MIN_QUAD_AREA: f64 = 1.0;

/// Something that can resample a source quadrilateral into a rectangle.
pub trait WarpProvider {
    /// Map `src` (TL, TR, BR, BL) onto `dst` in a `width` x `height` output.
    /// Degenerate input must be reported as an error, never a panic.
    fn warp(
        &self,
        source: &RgbaImage,
        src: [Point; 4],
        dst: [Point; 4],
        width: u32,
        height: u32,
    ) -> Result<RgbaImage>;
}

/// Projective warp via `imageproc`, bilinear sampling, white fill.
#[derive(Debug, Clone, Copy)]
pub struct ImageprocWarp {
    pub interpolation: Interpolation,
}

impl Default for ImageprocWarp {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Bilinear,
        }
    }
}

impl WarpProvider for ImageprocWarp {
    fn warp(
        &self,
        source: &RgbaImage,
        src: [Point; 4],
        dst: [Point; 4],
        width: u32,
        height: u32,
    ) -> Result<RgbaImage> {
        if width == 0 || height == 0 {
            return Err(ScanwerkError::GeometryDegenerate(format!(
                "output size {width}x{height}"
            )));
        }
        let [tl, tr, br, bl] = src;
        let area = Quadrilateral::new(tl, tr, br, bl).area();
        if !area.is_finite() || area < MIN_QUAD_AREA {
            return Err(ScanwerkError::GeometryDegenerate(format!(
                "quadrilateral area {area:.3}"
            )));
        }

        let projection = Projection::from_control_points(to_control(src), to_control(dst))
            .ok_or_else(|| {
                ScanwerkError::GeometryDegenerate("projective transform has no solution".into())
            })?;

        let default_pixel = Rgba([255u8, 255, 255, 255]);
        let mut output = RgbaImage::new(width, height);
        warp_into(source, &projection, self.interpolation, default_pixel, &mut output);
        Ok(output)
    }
}

fn to_control(points: [Point; 4]) -> [(f32, f32); 4] {
    points.map(|p| (p.x as f32, p.y as f32))
}

/// Output size for warping `quad`: rounded averages of the top/bottom edge
/// lengths (width) and the left/right edge lengths (height).
pub fn perspective_output_size(quad: &Quadrilateral) -> (u32, u32) {
    let width = ((quad.top_length() + quad.bottom_length()) / 2.0).round();
    let height = ((quad.left_length() + quad.right_length()) / 2.0).round();
    (to_pixels(width), to_pixels(height))
}

fn to_pixels(length: f64) -> u32 {
    if length.is_finite() && length > 0.0 {
        length.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// How a [`Correction`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionMethod {
    Warped,
    /// The warp failed and the bounding box of the corners was cropped instead.
    BoundingBox,
}

/// Result of perspective correction.
#[derive(Debug, Clone)]
pub struct Correction {
    pub image: RgbaImage,
    pub method: CorrectionMethod,
}

/// Warp `quad` to an upright rectangle. Corners are first clamped to the
/// image. Never fails: a degenerate quad yields the bounding-box crop of the
/// same corners.
#[instrument(skip(image, provider), fields(width = image.width(), height = image.height()))]
pub fn correct_perspective(
    image: &RgbaImage,
    quad: &Quadrilateral,
    provider: &dyn WarpProvider,
) -> Correction {
    let quad = &quad.clamped(image.width() as f64, image.height() as f64);
    let (out_w, out_h) = perspective_output_size(quad);
    let (w, h) = (out_w as f64, out_h as f64);
    let dst = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];
    debug!(out_w, out_h, corners = ?quad.points(), "Warping quadrilateral");

    match provider.warp(image, quad.points(), dst, out_w, out_h) {
        Ok(warped) => {
            info!(out_w, out_h, "Perspective correction applied");
            Correction {
                image: warped,
                method: CorrectionMethod::Warped,
            }
        }
        Err(err) => {
            warn!(error = %err, "Perspective warp failed; using bounding-box crop");
            Correction {
                image: crop_to_bounding_box(image, quad),
                method: CorrectionMethod::BoundingBox,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn split_image() -> RgbaImage {
        RgbaImage::from_fn(200, 200, |x, _| if x < 100 { RED } else { BLUE })
    }

    fn quad(points: [(f64, f64); 4]) -> Quadrilateral {
        let [tl, tr, br, bl] = points.map(|(x, y)| Point::new(x, y));
        Quadrilateral::new(tl, tr, br, bl)
    }

    /// Bilinear sampling of a flat region may be off by a rounding step.
    fn assert_close(actual: &Rgba<u8>, expected: &Rgba<u8>) {
        for (a, e) in actual.0.iter().zip(expected.0.iter()) {
            assert!(a.abs_diff(*e) <= 1, "{actual:?} vs {expected:?}");
        }
    }

    /// Records the requested size and always fails.
    struct FailingWarp {
        requested: Cell<Option<(u32, u32)>>,
    }

    impl WarpProvider for FailingWarp {
        fn warp(
            &self,
            _source: &RgbaImage,
            _src: [Point; 4],
            _dst: [Point; 4],
            width: u32,
            height: u32,
        ) -> Result<RgbaImage> {
            self.requested.set(Some((width, height)));
            Err(ScanwerkError::GeometryDegenerate("test".into()))
        }
    }

    /// Width averages top and bottom, height averages left and right.
    #[test]
    fn output_size_averages_opposite_sides() {
        let q = quad([(0.0, 0.0), (100.0, 0.0), (90.0, 50.0), (10.0, 50.0)]);
        // left = right = sqrt(10^2 + 50^2) ~ 50.99.
        assert_eq!(perspective_output_size(&q), (90, 51));
    }

    /// An axis-aligned quad is resampled without distortion.
    #[test]
    fn axis_aligned_warp_preserves_content() {
        let q = quad([(50.0, 50.0), (150.0, 50.0), (150.0, 150.0), (50.0, 150.0)]);
        let correction = correct_perspective(&split_image(), &q, &ImageprocWarp::default());
        assert_eq!(correction.method, CorrectionMethod::Warped);
        assert_eq!(correction.image.dimensions(), (100, 100));
        assert_close(correction.image.get_pixel(20, 50), &RED);
        assert_close(correction.image.get_pixel(80, 50), &BLUE);
    }

    /// A quad with collapsed top and bottom edges falls back to its
    /// bounding box instead of failing.
    #[test]
    fn collapsed_quad_falls_back_to_bounding_box() {
        let q = quad([(10.0, 10.0), (10.0, 10.0), (100.0, 90.0), (100.0, 90.0)]);
        assert_eq!(q.top_length(), 0.0);
        assert_eq!(q.bottom_length(), 0.0);

        let correction = correct_perspective(&split_image(), &q, &ImageprocWarp::default());
        assert_eq!(correction.method, CorrectionMethod::BoundingBox);
        assert_eq!(correction.image.dimensions(), (90, 80));
        assert_eq!(correction.image.get_pixel(0, 0), &RED);
    }

    /// Collinear corners have zero area and are reported as degenerate.
    #[test]
    fn zero_area_is_degenerate() {
        let q = quad([(0.0, 0.0), (50.0, 50.0), (100.0, 100.0), (150.0, 150.0)]);
        let result = ImageprocWarp::default().warp(
            &split_image(),
            q.points(),
            [
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            10,
            10,
        );
        assert!(matches!(result, Err(ScanwerkError::GeometryDegenerate(_))));
    }

    /// Corners far outside the image are pulled back to its edges before the
    /// output size is chosen.
    #[test]
    fn far_out_corners_are_clamped() {
        let image = RgbaImage::from_pixel(100, 100, RED);
        let q = quad([(0.0, 0.0), (1e9, 0.0), (1e9, 1e9), (0.0, 1e9)]);
        let correction = correct_perspective(&image, &q, &ImageprocWarp::default());
        assert_eq!(correction.method, CorrectionMethod::Warped);
        assert_eq!(correction.image.dimensions(), (100, 100));
        assert_close(correction.image.get_pixel(50, 50), &RED);

        let provider = FailingWarp {
            requested: Cell::new(None),
        };
        let negative = quad([(-5e8, -5e8), (60.0, -1.0), (60.0, 40.0), (-3.0, 40.0)]);
        let fallback = correct_perspective(&image, &negative, &provider);
        assert_eq!(provider.requested.get(), Some((60, 40)));
        assert_eq!(fallback.image.dimensions(), (60, 40));
    }

    /// The provider receives the size computed from the corners, and any
    /// provider failure routes to the fallback.
    #[test]
    fn provider_failure_uses_fallback() {
        let provider = FailingWarp {
            requested: Cell::new(None),
        };
        let q = quad([(20.0, 20.0), (120.0, 20.0), (120.0, 80.0), (20.0, 80.0)]);
        let correction = correct_perspective(&split_image(), &q, &provider);
        assert_eq!(provider.requested.get(), Some((100, 60)));
        assert_eq!(correction.method, CorrectionMethod::BoundingBox);
        assert_eq!(correction.image.dimensions(), (100, 60));
    }
}
