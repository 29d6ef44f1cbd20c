// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Issue folder discovery.
//
// Candidates are the immediate subdirectories of the input folder whose name
// contains an ASCII digit. Each candidate's JPEGs are listed up front so the
// scheduler only ever sees complete jobs.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use pdfzipper_core::FolderJob;
use pdfzipper_core::error::{Result, ZipperError};
use tracing::{debug, instrument, warn};

/// Extensions accepted as page images, compared case-insensitively.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// A candidate folder, either ready to assemble or unreadable.
#[derive(Debug)]
pub enum Discovered {
    Ready(FolderJob),
    /// Listing the folder failed; `job` carries the folder with no images.
    Unlisted { job: FolderJob, error: ZipperError },
}

impl Discovered {
    pub fn job(&self) -> &FolderJob {
        match self {
            Self::Ready(job) | Self::Unlisted { job, .. } => job,
        }
    }
}

/// Whether a folder name marks an issue folder.
pub fn is_issue_folder_name(name: &OsStr) -> bool {
    name.to_string_lossy().chars().any(|c| c.is_ascii_digit())
}

/// Whether `path` has a JPEG extension.
pub fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List issue folders under `input`, sorted by folder name.
///
/// Fails only if `input` itself cannot be read. An empty result is returned
/// as-is; the driver decides whether that is fatal.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn discover(input: &Path) -> Result<Vec<Discovered>> {
    let mut folders: Vec<PathBuf> = Vec::new();
    let entries = std::fs::read_dir(input).map_err(|err| ZipperError::folder_io(input, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| ZipperError::folder_io(input, err))?;
        let path = entry.path();
        if path.is_dir() && is_issue_folder_name(&entry.file_name()) {
            folders.push(path);
        }
    }
    folders.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(candidates = folders.len(), "Issue folders found");

    Ok(folders
        .into_iter()
        .map(|folder| match list_images(&folder) {
            Ok(images) => Discovered::Ready(FolderJob::new(folder, images)),
            Err(err) => {
                warn!(folder = %folder.display(), error = %err, "Could not list folder");
                let error = ZipperError::folder_io(&folder, err);
                Discovered::Unlisted {
                    job: FolderJob::new(folder, Vec::new()),
                    error,
                }
            }
        })
        .collect())
}

/// JPEG files directly inside `folder`, unordered.
fn list_images(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && is_page_image(&path) {
            images.push(path);
        }
    }
    Ok(images)
}
