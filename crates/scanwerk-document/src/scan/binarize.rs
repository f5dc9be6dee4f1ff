// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local-mean adaptive binarization.
//
// Each pixel is compared to the mean of a square window around it (clamped
// to the image) minus a constant bias. Window sums come from a summed-area
// table, so the pass costs O(width * height) whatever the block size.

use image::{GrayImage, Luma, RgbaImage};
use scanwerk_core::error::{Result, ScanwerkError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Smallest usable window edge.
pub const MIN_BLOCK_SIZE: u32 = 3;

/// Threshold parameters. `block_size` is normalised on use: even values are
/// bumped to the next odd value and anything below 3 becomes 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinarizeParams {
    pub block_size: u32,
    pub constant_c: i32,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            block_size: 11,
            constant_c: 2,
        }
    }
}

impl BinarizeParams {
    pub fn new(block_size: u32, constant_c: i32) -> Self {
        Self {
            block_size,
            constant_c,
        }
    }

    /// The odd window edge actually used.
    pub fn effective_block_size(&self) -> u32 {
        normalize_block_size(self.block_size)
    }

    /// Half-extent of the window, `floor(block / 2)`.
    pub fn half_block(&self) -> u32 {
        self.effective_block_size() / 2
    }
}

/// Bump even sizes to odd and raise tiny ones to [`MIN_BLOCK_SIZE`].
pub fn normalize_block_size(block_size: u32) -> u32 {
    let odd = if block_size % 2 == 0 {
        block_size.saturating_add(1)
    } else {
        block_size
    };
    odd.max(MIN_BLOCK_SIZE)
}

// -- Integral image ---------------------------------------------------------

/// Summed-area table: `at(x, y)` is the sum of every gray value with
/// `x' <= x` and `y' <= y`.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: u32,
    height: u32,
    table: Vec<u64>,
}

impl IntegralImage {
    /// Build the table in one row-major pass:
    /// `S[y][x] = row_running_sum + S[y-1][x]`.
    pub fn new(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let stride = width as usize;
        let mut table = vec![0u64; stride * height as usize];

        for y in 0..height as usize {
            let mut row_sum = 0u64;
            for x in 0..stride {
                row_sum += gray.get_pixel(x as u32, y as u32).0[0] as u64;
                let above = if y > 0 { table[(y - 1) * stride + x] } else { 0 };
                table[y * stride + x] = row_sum + above;
            }
        }

        Self {
            width,
            height,
            table,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Inclusive prefix sum at `(x, y)`.
    pub fn at(&self, x: u32, y: u32) -> u64 {
        self.table[y as usize * self.width as usize + x as usize]
    }

    /// Sum over the inclusive window `[x1, x2] x [y1, y2]` via `D - B - C + A`,
    /// with corners left of or above the image counted as 0. The caller keeps
    /// `x1 <= x2 < width` and `y1 <= y2 < height`.
    pub fn region_sum(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> u64 {
        let d = self.at(x2, y2);
        let b = if y1 > 0 { self.at(x2, y1 - 1) } else { 0 };
        let c = if x1 > 0 { self.at(x1 - 1, y2) } else { 0 };
        let a = if x1 > 0 && y1 > 0 {
            self.at(x1 - 1, y1 - 1)
        } else {
            0
        };
        d + a - b - c
    }
}

// -- Binarizer --------------------------------------------------------------

/// Produces a black-and-white image from luminance by local-mean thresholding.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveBinarizer {
    params: BinarizeParams,
}

impl AdaptiveBinarizer {
    pub fn new(params: BinarizeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> BinarizeParams {
        self.params
    }

    /// Threshold a gray plane. White (255) where `gray > mean - c`, else 0.
    #[instrument(skip(self, gray), fields(width = gray.width(), height = gray.height()))]
    pub fn binarize_gray(&self, gray: &GrayImage) -> Result<GrayImage> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(ScanwerkError::ProcessingFailure(
                "cannot binarize an empty pixel buffer".into(),
            ));
        }

        let half = self.params.half_block();
        let bias = self.params.constant_c as f64;
        info!(
            block_size = self.params.effective_block_size(),
            constant_c = self.params.constant_c,
            "Applying adaptive binarization"
        );

        let integral = IntegralImage::new(gray);
        let mut output = GrayImage::new(width, height);

        for y in 0..height {
            let y1 = y.saturating_sub(half);
            let y2 = y.saturating_add(half).min(height - 1);
            for x in 0..width {
                let x1 = x.saturating_sub(half);
                let x2 = x.saturating_add(half).min(width - 1);

                let count = ((x2 - x1 + 1) as u64) * ((y2 - y1 + 1) as u64);
                let mean = integral.region_sum(x1, y1, x2, y2) as f64 / count as f64;

                let value = gray.get_pixel(x, y).0[0] as f64;
                let binary = if value > mean - bias { 255u8 } else { 0u8 };
                output.put_pixel(x, y, Luma([binary]));
            }
        }

        debug!("Binarization complete");
        Ok(output)
    }

    /// Threshold an RGBA luminance image, reading gray from the red channel
    /// and writing R = G = B with alpha unchanged.
    pub fn binarize(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let gray = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            Luma([image.get_pixel(x, y).0[0]])
        });
        let binary = self.binarize_gray(&gray)?;

        let mut output = image.clone();
        for (x, y, pixel) in output.enumerate_pixels_mut() {
            let v = binary.get_pixel(x, y).0[0];
            pixel.0 = [v, v, v, pixel.0[3]];
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Tiny deterministic LCG for reproducible noise.
    struct Lcg(u64);

    impl Lcg {
        fn next_u8(&mut self) -> u8 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) as u8
        }
    }

    fn noise(width: u32, height: u32, seed: u64) -> GrayImage {
        let mut rng = Lcg(seed);
        GrayImage::from_fn(width, height, |_, _| Luma([rng.next_u8()]))
    }

    /// Reference implementation: sum every window pixel directly.
    fn naive(gray: &GrayImage, params: BinarizeParams) -> GrayImage {
        let (w, h) = gray.dimensions();
        let half = params.half_block() as i64;
        GrayImage::from_fn(w, h, |x, y| {
            let (x, y) = (x as i64, y as i64);
            let mut sum = 0u64;
            let mut count = 0u64;
            for wy in (y - half).max(0)..=(y + half).min(h as i64 - 1) {
                for wx in (x - half).max(0)..=(x + half).min(w as i64 - 1) {
                    sum += gray.get_pixel(wx as u32, wy as u32).0[0] as u64;
                    count += 1;
                }
            }
            let mean = sum as f64 / count as f64;
            let value = gray.get_pixel(x as u32, y as u32).0[0] as f64;
            Luma([if value > mean - params.constant_c as f64 { 255 } else { 0 }])
        })
    }

    /// Even block sizes are bumped; tiny ones are raised to 3.
    #[test]
    fn block_size_normalisation() {
        assert_eq!(normalize_block_size(11), 11);
        assert_eq!(normalize_block_size(10), 11);
        assert_eq!(normalize_block_size(2), 3);
        assert_eq!(normalize_block_size(1), 3);
        assert_eq!(normalize_block_size(0), 3);
        assert_eq!(BinarizeParams::new(10, 0).half_block(), 5);
    }

    /// Region sums match direct summation on every window of a small image.
    #[test]
    fn integral_region_sums() {
        let gray = noise(7, 5, 42);
        let integral = IntegralImage::new(&gray);
        for y1 in 0..5 {
            for y2 in y1..5 {
                for x1 in 0..7 {
                    for x2 in x1..7 {
                        let mut expected = 0u64;
                        for y in y1..=y2 {
                            for x in x1..=x2 {
                                expected += gray.get_pixel(x, y).0[0] as u64;
                            }
                        }
                        assert_eq!(integral.region_sum(x1, y1, x2, y2), expected);
                    }
                }
            }
        }
    }

    /// The integral-image pass equals the naive windowed mean exactly for
    /// block sizes up to 51, odd and even, with positive and negative bias.
    #[test]
    fn matches_naive_threshold() {
        let gray = noise(40, 30, 7);
        let mut block_sizes: Vec<u32> = (3..=51).step_by(2).collect();
        block_sizes.extend([0, 4, 16, 50]);
        for constant_c in [-5, 0, 2, 7] {
            for &block_size in &block_sizes {
                let params = BinarizeParams::new(block_size, constant_c);
                let fast = AdaptiveBinarizer::new(params)
                    .binarize_gray(&gray)
                    .expect("binarize");
                assert_eq!(fast, naive(&gray, params), "block {block_size}, c {constant_c}");
            }
        }
    }

    /// Flat regions with small bumps: mean 130, C = 2, threshold 128.
    #[test]
    fn scenario_threshold_at_mean_minus_c() {
        let mut gray = GrayImage::from_pixel(800, 600, Luma([130]));
        // Window around (400, 300) has 121 pixels; 131 + 129 + 119*130 = 15730 = 121*130.
        gray.put_pixel(400, 300, Luma([131]));
        gray.put_pixel(401, 300, Luma([129]));
        // Around (100, 100): 127 + 133 + 119*130 = 15730.
        gray.put_pixel(100, 100, Luma([127]));
        gray.put_pixel(101, 100, Luma([133]));

        let out = AdaptiveBinarizer::new(BinarizeParams::new(11, 2))
            .binarize_gray(&gray)
            .expect("binarize");
        assert_eq!(out.get_pixel(400, 300).0[0], 255);
        assert_eq!(out.get_pixel(100, 100).0[0], 0);
        // Flat background: 130 > 128.
        assert_eq!(out.get_pixel(700, 500).0[0], 255);
    }

    /// A negative bias raises the threshold above the mean.
    #[test]
    fn negative_bias_darkens_flat_regions() {
        let gray = GrayImage::from_pixel(20, 20, Luma([100]));
        let out = AdaptiveBinarizer::new(BinarizeParams::new(5, -1))
            .binarize_gray(&gray)
            .expect("binarize");
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }

    /// RGBA input reads red, writes R = G = B and keeps alpha.
    #[test]
    fn rgba_channels() {
        let img = RgbaImage::from_fn(9, 9, |x, _| {
            if x < 4 {
                Rgba([20, 0, 0, 200])
            } else {
                Rgba([220, 0, 0, 100])
            }
        });
        let out = AdaptiveBinarizer::new(BinarizeParams::new(3, 2))
            .binarize(&img)
            .expect("binarize");
        assert_eq!(out.get_pixel(3, 4).0, [0, 0, 0, 200]);
        assert_eq!(out.get_pixel(4, 4).0, [255, 255, 255, 100]);
    }

    /// Empty input is a processing failure.
    #[test]
    fn empty_input_fails() {
        let err = AdaptiveBinarizer::default().binarize_gray(&GrayImage::new(0, 0)).err();
        assert!(matches!(err, Some(ScanwerkError::ProcessingFailure(_))));
    }

    /// Parameters serialise with camelCase keys.
    #[test]
    fn params_serde() {
        let json = serde_json::to_string(&BinarizeParams::new(15, -3)).expect("serialize");
        assert_eq!(json, r#"{"blockSize":15,"constantC":-3}"#);
    }
}
