// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the end-of-run summary.
//
// Every error is mapped to a one-line reason plus a suggestion, so the summary
// never has to print a raw error chain. The full chain still goes to the log.

use std::io::ErrorKind;

use crate::error::ZipperError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Re-running may succeed (interrupted run, transient I/O).
    Transient,
    /// The operator must fix something (path, permissions, flags).
    ActionRequired,
    /// The input itself is bad; re-running will fail the same way.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short reason (shown next to the folder name).
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Shown as a tag on the summary line.
    pub severity: Severity,
}

/// Convert a `ZipperError` into a `HumanError` for the summary.
pub fn humanize_error(err: &ZipperError) -> HumanError {
    match err {
        ZipperError::InputNotFound { path } => HumanError {
            message: format!("Input folder {} does not exist.", path.display()),
            suggestion: "Check the --input-folder path and try again.".into(),
            severity: Severity::ActionRequired,
        },

        ZipperError::NoFoldersFound { path } => HumanError {
            message: format!("No issue folders found in {}.", path.display()),
            suggestion: "Issue folders must be direct subfolders whose name contains a digit, e.g. 2017_01_03.".into(),
            severity: Severity::ActionRequired,
        },

        ZipperError::InvalidOptions(detail) => HumanError {
            message: "The options given are not valid.".into(),
            suggestion: format!("Fix the option and run again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ZipperError::Config(detail) => HumanError {
            message: "The config file could not be used.".into(),
            suggestion: format!("Check the file is valid JSON with known keys. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ZipperError::ImageDecode { path, .. } => HumanError {
            message: format!("Image {} could not be read.", file_label(path)),
            suggestion: "The file may be damaged or not a JPEG. Re-export or remove it, then run again.".into(),
            severity: Severity::Permanent,
        },

        ZipperError::ImageEncode { path, .. } => HumanError {
            message: format!("Image {} could not be compressed.", file_label(path)),
            suggestion: "Try a different --quality or --rescale value.".into(),
            severity: Severity::Permanent,
        },

        ZipperError::PdfWrite { path, .. } => HumanError {
            message: format!("The PDF {} could not be written.", file_label(path)),
            suggestion: "Check there is free disk space in the output folder.".into(),
            severity: Severity::Transient,
        },

        ZipperError::PdfRead { path, .. } => HumanError {
            message: format!("The PDF {} could not be read back.", file_label(path)),
            suggestion: "Delete the file and run again without --skip-existing.".into(),
            severity: Severity::Permanent,
        },

        ZipperError::FolderIo { path, source } => humanize_io(path, source),

        ZipperError::DestinationCollision { path } => HumanError {
            message: format!("Another folder already maps to {}.", file_label(path)),
            suggestion: "Rename one of the folders so their names differ as text.".into(),
            severity: Severity::ActionRequired,
        },

        ZipperError::Cancelled => HumanError {
            message: "Not processed, the run was cancelled.".into(),
            suggestion: "Run again with --skip-existing to continue where it stopped.".into(),
            severity: Severity::Transient,
        },

        ZipperError::WorkerPanic { .. } => HumanError {
            message: "An internal error stopped this folder.".into(),
            suggestion: "Run again with -vv and report the log if it happens again.".into(),
            severity: Severity::Permanent,
        },
    }
}

impl Severity {
    /// Short tag for the end-of-run summary.
    pub fn label(self) -> &'static str {
        match self {
            Self::Transient => "retry may help",
            Self::ActionRequired => "needs action",
            Self::Permanent => "bad input",
        }
    }
}

fn humanize_io(path: &std::path::Path, source: &std::io::Error) -> HumanError {
    match source.kind() {
        ErrorKind::NotFound => HumanError {
            message: format!("{} disappeared while processing.", path.display()),
            suggestion: "Make sure nothing else moves files while the conversion runs.".into(),
            severity: Severity::Transient,
        },
        ErrorKind::PermissionDenied => HumanError {
            message: format!("No permission to access {}.", path.display()),
            suggestion: "Check the folder permissions.".into(),
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: format!("A file problem occurred at {}.", path.display()),
            suggestion: "Try again. If it keeps happening the disk may be full.".into(),
            severity: Severity::Transient,
        },
    }
}

/// Last path component, falling back to the whole path.
fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
