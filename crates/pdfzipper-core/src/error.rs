// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for PdfZipper.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all PdfZipper operations.
///
/// The first group ends a whole run. Everything from `ImageDecode`
/// downwards is scoped to a single folder and ends up in that folder's
/// outcome instead of aborting the batch.
#[derive(Debug, Error)]
pub enum ZipperError {
    // -- Run-level (fatal) --
    #[error("input directory does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("no folders containing a digit found in {}", path.display())]
    NoFoldersFound { path: PathBuf },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("configuration error: {0}")]
    Config(String),

    // -- Per-folder --
    #[error("failed to decode image {}: {reason}", path.display())]
    ImageDecode { path: PathBuf, reason: String },

    #[error("failed to encode image {}: {reason}", path.display())]
    ImageEncode { path: PathBuf, reason: String },

    #[error("failed to write PDF {}: {reason}", path.display())]
    PdfWrite { path: PathBuf, reason: String },

    #[error("failed to read PDF {}: {reason}", path.display())]
    PdfRead { path: PathBuf, reason: String },

    #[error("file I/O error at {}: {source}", path.display())]
    FolderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is already the destination of another folder", path.display())]
    DestinationCollision { path: PathBuf },

    #[error("cancelled before processing started")]
    Cancelled,

    #[error("worker panicked while processing {folder}: {message}")]
    WorkerPanic { folder: String, message: String },
}

impl ZipperError {
    /// Convenience constructor for I/O failures tied to a path.
    pub fn folder_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FolderIo {
            path: path.into(),
            source,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ZipperError>;
