// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning stages — perspective correction, luminance conversion, and
// local-mean adaptive binarization.

pub mod binarize;
pub mod luminance;
pub mod warp;

pub use binarize::{AdaptiveBinarizer, BinarizeParams, IntegralImage};
pub use luminance::LuminanceConverter;
pub use warp::{Correction, CorrectionMethod, ImageprocWarp, WarpProvider};
