// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion options.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ZipperError};

/// Placeholder replaced by the folder name in [`ConversionOptions::file_naming`].
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Immutable settings for one conversion run.
///
/// Missing fields in a JSON config file fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Folder of per-issue image folders.
    pub input_folder: PathBuf,
    /// Where generated PDFs are written (flat, no subdirectories).
    pub output_folder: PathBuf,
    /// PDF filename template containing `{name}`.
    pub file_naming: String,
    /// Initial JPEG quality (1-100), also used as the oversize fallback.
    pub quality: u8,
    /// Per-image byte budget in KiB. `0` disables the quality search.
    pub max_image_size_kb: u32,
    /// Leave folders alone whose PDF already exists.
    pub skip_existing: bool,
    /// Process folders on a worker pool instead of one at a time.
    pub parallel: bool,
    /// Linear multiplier applied to both image dimensions before encoding.
    pub scale_factor: f32,
    /// Upper bound on parallel workers. `None` uses every processing unit.
    pub max_workers: Option<usize>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from("InputImages"),
            output_folder: PathBuf::from("OutputPDFs"),
            file_naming: format!("{NAME_PLACEHOLDER} - Output.pdf"),
            quality: 90,
            max_image_size_kb: 0,
            skip_existing: false,
            parallel: true,
            scale_factor: 1.0,
            max_workers: None,
        }
    }
}

impl ConversionOptions {
    /// Load options from a JSON file. Absent keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ZipperError::Config(format!("failed to read {}: {}", path.display(), err))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            ZipperError::Config(format!("failed to parse {}: {}", path.display(), err))
        })
    }

    /// Check value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(ZipperError::InvalidOptions(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(ZipperError::InvalidOptions(format!(
                "scale factor must be a positive number, got {}",
                self.scale_factor
            )));
        }
        if !self.file_naming.contains(NAME_PLACEHOLDER) {
            return Err(ZipperError::InvalidOptions(format!(
                "file naming template {:?} must contain {}",
                self.file_naming, NAME_PLACEHOLDER
            )));
        }
        if self.file_naming.contains(['/', '\\']) {
            return Err(ZipperError::InvalidOptions(format!(
                "file naming template {:?} must not contain path separators",
                self.file_naming
            )));
        }
        if self.max_workers == Some(0) {
            return Err(ZipperError::InvalidOptions(
                "max workers must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Byte budget for a single encoded image, or `None` when unconstrained.
    pub fn max_image_bytes(&self) -> Option<u64> {
        match self.max_image_size_kb {
            0 => None,
            kb => Some(u64::from(kb) * 1024),
        }
    }

    /// PDF filename for a folder, e.g. `"2017-01-03 - Output.pdf"`.
    pub fn file_name_for(&self, folder_name: &str) -> String {
        self.file_naming.replace(NAME_PLACEHOLDER, folder_name)
    }

    /// Full destination path for a folder's PDF.
    pub fn destination_for(&self, folder_name: &str) -> PathBuf {
        self.output_folder.join(self.file_name_for(folder_name))
    }
}
