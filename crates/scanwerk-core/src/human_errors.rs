// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// The pipeline never shows anything to the user itself; callers turn a
// `ScanwerkError` into a `HumanError` and decide how to present it.

use crate::error::ScanwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing is lost; the pipeline recovered on its own.
    Recovered,
    /// User must do something (pick another file, adjust the corners).
    ActionRequired,
    /// Cannot be fixed by retrying with the same input.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether re-running the same stage may succeed.
    pub retriable: bool,
    /// Severity level (drives presentation).
    pub severity: Severity,
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::InvalidInput(_) => HumanError {
            message: "That file isn't a photo we can read.".into(),
            suggestion: "Please select a JPEG or PNG image.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::InputTooLarge { limit, .. } => HumanError {
            message: "That photo is too large.".into(),
            suggestion: format!(
                "Use an image under {}, or take the photo at a lower resolution.",
                format_size(*limit)
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::GeometryDegenerate(_) => HumanError {
            message: "The corners don't outline a page.".into(),
            suggestion: "We used a plain crop instead. Drag the corners apart to straighten the page.".into(),
            retriable: true,
            severity: Severity::Recovered,
        },

        ScanwerkError::ProcessingFailure(_) | ScanwerkError::ImageError(_) => HumanError {
            message: "We couldn't process this image.".into(),
            suggestion: "Please try again, or try a different photo.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        ScanwerkError::StageUnavailable(stage) => HumanError {
            message: format!("The {stage} step isn't ready yet."),
            suggestion: "Finish the previous step first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::PdfError(_) => HumanError {
            message: "We couldn't create the PDF.".into(),
            suggestion: "Please try again.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        ScanwerkError::Config(_) | ScanwerkError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Default settings will be used. Check the file for typos.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Io(io) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check that the location exists and is writable ({io})."),
            retriable: true,
            severity: Severity::ActionRequired,
        },
    }
}

/// `bytes` as whole megabytes or kilobytes where exact, else plain bytes.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{} KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}
