// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folder assembly: one issue folder in, one PDF out.
//
// Images are compressed and appended strictly in the job's order. Any page
// failure aborts the folder before the destination is touched.

use std::path::Path;

use pdfzipper_core::error::{Result, ZipperError};
use pdfzipper_core::{AssemblyResult, ConversionOptions, FolderJob};
use tracing::{info, instrument};

use crate::image::compressor::{AdaptiveCompressor, ImageEncoder, JpegEncoder};
use crate::pdf::writer::PdfAssembly;

/// Receives one tick per page as a folder is assembled.
///
/// `done` counts from 1 and reaches `total` on the last page.
pub trait PageProgress {
    fn page_done(&mut self, image: &Path, done: usize, total: usize);
}

/// No-op progress.
impl PageProgress for () {
    fn page_done(&mut self, _image: &Path, _done: usize, _total: usize) {}
}

/// Turns a [`FolderJob`] into a PDF using one compressor for every page.
pub struct FolderAssembler<'a, E = JpegEncoder> {
    options: &'a ConversionOptions,
    compressor: AdaptiveCompressor<E>,
}

impl<'a> FolderAssembler<'a, JpegEncoder> {
    pub fn new(options: &'a ConversionOptions) -> Self {
        Self::with_encoder(options, JpegEncoder)
    }
}

impl<'a, E: ImageEncoder> FolderAssembler<'a, E> {
    pub fn with_encoder(options: &'a ConversionOptions, encoder: E) -> Self {
        Self {
            options,
            compressor: AdaptiveCompressor::with_encoder(options, encoder),
        }
    }

    /// Assemble `job` into `<output_folder>/<file_naming with name>`.
    ///
    /// Empty folders and (with `skip_existing`) folders whose PDF already
    /// exists return without decoding anything. On error nothing is written
    /// at the destination.
    #[instrument(skip_all, fields(folder = %job.name(), images = job.images().len()))]
    pub fn assemble(
        &self,
        job: &FolderJob,
        progress: &mut dyn PageProgress,
    ) -> Result<AssemblyResult> {
        if job.is_empty() {
            info!("No images found, skipping folder");
            return Ok(AssemblyResult::SkippedEmpty);
        }

        let destination = self.options.destination_for(job.name());
        if self.options.skip_existing {
            let exists = destination
                .try_exists()
                .map_err(|err| ZipperError::folder_io(&destination, err))?;
            if exists {
                info!(path = %destination.display(), "Skipped existing PDF");
                return Ok(AssemblyResult::SkippedExisting(destination));
            }
        }

        let total = job.images().len();
        let mut document = PdfAssembly::new(&destination).with_title(job.name());
        for (index, image) in job.images().iter().enumerate() {
            let page = self.compressor.compress(image)?;
            document.add_page(page)?;
            progress.page_done(image, index + 1, total);
        }

        let written = document.save_atomically()?;
        info!(path = %written.display(), pages = total, "Created PDF");
        Ok(AssemblyResult::Written(written))
    }
}

/// Assemble one folder with the default JPEG encoder.
pub fn assemble(
    job: &FolderJob,
    options: &ConversionOptions,
    progress: &mut dyn PageProgress,
) -> Result<AssemblyResult> {
    FolderAssembler::new(options).assemble(job, progress)
}
