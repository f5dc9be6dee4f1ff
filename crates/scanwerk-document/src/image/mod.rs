// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — orientation normalisation, decoding, crops, and encoding.

pub mod orientation;
pub mod processor;

pub use orientation::{
    CanvasOp, ExifMetadataExtractor, ExifOrientation, MetadataExtractor, OrientationNormalizer,
    OrientationPlan,
};
pub use processor::ImageProcessor;
