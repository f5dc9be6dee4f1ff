// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Scanwerk output pages.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanwerkError;

/// Standard paper sizes for the assembled page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm as f32, *height_mm as f32),
        }
    }
}

impl FromStr for PaperSize {
    type Err = ScanwerkError;

    /// Parse a named size (`a4`, `a5`, `letter`, `legal`) or `WxH` in mm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            other => {
                let (w, h) = other.split_once('x').ok_or_else(|| {
                    ScanwerkError::Config(format!("unknown paper size: {s}"))
                })?;
                let parse = |v: &str| {
                    v.trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|mm| *mm > 0)
                        .ok_or_else(|| ScanwerkError::Config(format!("invalid paper size: {s}")))
                };
                Ok(Self::Custom {
                    width_mm: parse(w)?,
                    height_mm: parse(h)?,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Named sizes parse case-insensitively.
    #[test]
    fn parse_named_sizes() {
        assert_eq!("A4".parse::<PaperSize>().ok(), Some(PaperSize::A4));
        assert_eq!(" letter ".parse::<PaperSize>().ok(), Some(PaperSize::Letter));
    }

    /// Custom sizes use `WxH` in millimetres.
    #[test]
    fn parse_custom_size() {
        let size: PaperSize = "100x150".parse().expect("custom size");
        assert_eq!(size.dimensions_mm(), (100.0, 150.0));
        assert!("0x150".parse::<PaperSize>().is_err());
        assert!("tabloid".parse::<PaperSize>().is_err());
    }

    /// A4 is the default, including for settings that omit the paper size.
    #[test]
    fn default_is_a4() {
        assert_eq!(PaperSize::default(), PaperSize::A4);
        let json = serde_json::to_string(&PaperSize::default()).expect("serialize");
        assert_eq!(json, "\"a4\"");
    }

    /// US Letter keeps its exact metric dimensions.
    #[test]
    fn letter_dimensions_exact() {
        let (w, h) = PaperSize::Letter.dimensions_mm();
        assert!((w - 215.9).abs() < 1e-4);
        assert!((h - 279.4).abs() < 1e-4);
    }
}
