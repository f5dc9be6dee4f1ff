// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Persistent scan settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Paper size of the assembled page.
    pub paper_size: crate::PaperSize,
    /// Adaptive threshold window edge in pixels (odd; even values are bumped).
    pub block_size: u32,
    /// Offset subtracted from the local mean before comparison.
    pub constant_c: i32,
    /// JPEG quality used when handing the final bitmap to the page assembler.
    pub jpeg_quality: u8,
    /// Minimum crop rectangle edge, in logical pixels.
    pub min_crop_size: f64,
    /// Margin of the default crop rectangle as a fraction of each dimension.
    pub crop_margin: f64,
    /// Largest accepted input file, in bytes.
    pub max_input_bytes: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            paper_size: crate::PaperSize::A4,
            block_size: 11,
            constant_c: 2,
            jpeg_quality: 95,
            min_crop_size: 50.0,
            crop_margin: 0.1,
            max_input_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ScanConfig {
    /// Read a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&data)?;
        debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    /// Read a config, falling back to defaults if the file is missing or bad.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.as_ref().display(), error = %err, "using default config");
                Self::default()
            }
        }
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
