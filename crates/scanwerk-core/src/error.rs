// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Input errors (rejected before entering the pipeline) --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("input is {size} bytes, over the {limit}-byte limit")]
    InputTooLarge { size: u64, limit: u64 },

    // -- Geometry --
    #[error("degenerate geometry: {0}")]
    GeometryDegenerate(String),

    // -- Processing --
    #[error("image processing failed: {0}")]
    ProcessingFailure(String),

    #[error("image codec error: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("pipeline stage unavailable: {0}")]
    StageUnavailable(&'static str),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
