// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfzipper-document: Image and PDF handling for PdfZipper.
//
// Provides the adaptive JPEG compressor (quality search under a byte budget,
// optional rescale), image-per-page PDF assembly with atomic writes, a small
// PDF reader for inspecting the results, and the folder assembler that ties
// them together for one issue folder.

pub mod assemble;
pub mod image;
pub mod pdf;

// Re-export the primary structs so callers can use `pdfzipper_document::PdfAssembly` etc.
pub use assemble::{FolderAssembler, PageProgress, assemble};
pub use image::compressor::{AdaptiveCompressor, ImageEncoder, JpegEncoder};
pub use image::processor::ImageProcessor;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfAssembly;
