// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Image stages of the Scanwerk document scanner.
//
// Provides orientation normalisation, bounding-box and perspective crops,
// luminance conversion, local-mean adaptive binarization, single-page PDF
// assembly, and the pipeline context that owns each stage's output.

pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod scan;

// Re-export the primary types so callers can use `scanwerk_document::PdfWriter` etc.
pub use crate::image::orientation::{
    ExifMetadataExtractor, ExifOrientation, MetadataExtractor, OrientationNormalizer,
    OrientationPlan,
};
pub use crate::image::processor::ImageProcessor;
pub use pdf::writer::{PageAssembler, PageLayout, PdfWriter};
pub use pipeline::{CornerChoice, QuadPreview, ScanPipeline};
pub use scan::binarize::{AdaptiveBinarizer, BinarizeParams};
pub use scan::luminance::LuminanceConverter;
pub use scan::warp::{Correction, CorrectionMethod, ImageprocWarp, WarpProvider};
