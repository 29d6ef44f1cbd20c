// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for PdfZipper.

use std::path::{Path, PathBuf};

use crate::error::ZipperError;

/// One discovered issue folder, mapped to one output PDF.
///
/// `images` is sorted once at construction (byte-wise on the file name, so
/// `a_1.jpg < a_10.jpg < a_2.jpg`) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderJob {
    path: PathBuf,
    name: String,
    images: Vec<PathBuf>,
}

impl FolderJob {
    /// Build a job for `path`, ordering `images` by file name.
    pub fn new(path: impl Into<PathBuf>, mut images: Vec<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Self { path, name, images }
    }

    /// Absolute (or caller-supplied) folder path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folder name used in the PDF file name.
    ///
    /// Lossy for non-UTF-8 names, so distinct folders can share a name. Callers
    /// that map names to destinations must not assume uniqueness.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image files in page order.
    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// One image after adaptive compression, ready to become a PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedPage {
    /// Baseline JPEG bytes.
    pub data: Vec<u8>,
    /// Pixel width after any rescale.
    pub width: u32,
    /// Pixel height after any rescale.
    pub height: u32,
    /// Quality the returned `data` was encoded at.
    pub quality: u8,
    /// `false` when no quality met the byte budget and the fallback was used.
    pub within_budget: bool,
}

impl CompressedPage {
    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// What happened to a folder that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyResult {
    /// A PDF with one page per image was written to this path.
    Written(PathBuf),
    /// The destination already existed and `skip_existing` was set.
    SkippedExisting(PathBuf),
    /// The folder contained no images.
    SkippedEmpty,
}

/// Final state of one folder job within a run.
#[derive(Debug)]
pub struct FolderOutcome {
    pub job: FolderJob,
    pub result: Result<AssemblyResult, ZipperError>,
}

impl FolderOutcome {
    pub fn new(job: FolderJob, result: Result<AssemblyResult, ZipperError>) -> Self {
        Self { job, result }
    }

    pub fn is_written(&self) -> bool {
        matches!(self.result, Ok(AssemblyResult::Written(_)))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self.result,
            Ok(AssemblyResult::SkippedExisting(_) | AssemblyResult::SkippedEmpty)
        )
    }

    pub fn error(&self) -> Option<&ZipperError> {
        self.result.as_ref().err()
    }
}

/// Aggregate result of a pipeline run, one outcome per discovered folder.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<FolderOutcome>,
}

impl RunReport {
    pub fn new(outcomes: Vec<FolderOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn written(&self) -> impl Iterator<Item = &FolderOutcome> {
        self.outcomes.iter().filter(|o| o.is_written())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FolderOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FolderOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}
