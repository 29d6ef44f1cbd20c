// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive compressor: find the highest JPEG quality whose output fits the
// per-image byte budget.
//
// Pipeline: decode → (rescale) → encode at `quality`, `quality - 1`, ... 1.
// The first candidate at or under the budget wins. When even quality 1 is too
// big, the image is encoded once more at the requested quality and shipped
// oversized rather than as an unreadable quality-1 page.

use std::path::Path;

use image::{DynamicImage, ImageError};
use pdfzipper_core::error::ZipperError;
use pdfzipper_core::{CompressedPage, ConversionOptions};
use tracing::{debug, instrument, warn};

use super::processor::{self, ImageProcessor};

/// Largest width or height a baseline JPEG can carry.
pub const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

/// Upper bound on pixels per rescaled page, checked before any buffer for the
/// target size is allocated.
pub const MAX_PAGE_PIXELS: u64 = 100_000_000;

/// Encoding stage of the page pipeline.
///
/// Implementations must be deterministic for a given image and quality; the
/// quality search relies on re-encoding being repeatable.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError>;
}

/// Baseline JPEG encoder from the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
        processor::encode_jpeg(image, quality)
    }
}

/// Compresses page images under a byte budget by linear quality search.
#[derive(Debug, Clone)]
pub struct AdaptiveCompressor<E = JpegEncoder> {
    encoder: E,
    quality: u8,
    max_bytes: Option<u64>,
    scale_factor: f32,
}

impl AdaptiveCompressor<JpegEncoder> {
    /// Compressor using the JPEG encoder and the quality, budget and scale
    /// from `options`.
    pub fn new(options: &ConversionOptions) -> Self {
        Self::with_encoder(options, JpegEncoder)
    }
}

impl<E: ImageEncoder> AdaptiveCompressor<E> {
    pub fn with_encoder(options: &ConversionOptions, encoder: E) -> Self {
        Self {
            encoder,
            quality: options.quality.clamp(1, 100),
            max_bytes: options.max_image_bytes(),
            scale_factor: options.scale_factor,
        }
    }

    /// Decode `path`, rescale if configured, and encode within the budget.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn compress(&self, path: &Path) -> Result<CompressedPage, ZipperError> {
        let source = ImageProcessor::open(path)?;
        let (width, height) =
            processor::scaled_dimensions(source.width(), source.height(), self.scale_factor);
        if width > MAX_JPEG_DIMENSION
            || height > MAX_JPEG_DIMENSION
            || u64::from(width) * u64::from(height) > MAX_PAGE_PIXELS
        {
            return Err(ZipperError::ImageEncode {
                path: path.to_path_buf(),
                reason: format!(
                    "rescaled size {}x{} exceeds the page limit ({} px per side, {} px total)",
                    width, height, MAX_JPEG_DIMENSION, MAX_PAGE_PIXELS
                ),
            });
        }

        let image = source.scale(self.scale_factor).into_dynamic();
        self.compress_image(&image)
            .map_err(|err| ZipperError::ImageEncode {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
    }

    /// Run the encode stage on an already decoded (and rescaled) image.
    pub fn compress_image(&self, image: &DynamicImage) -> Result<CompressedPage, ImageError> {
        let page = |data: Vec<u8>, quality: u8, within_budget: bool| CompressedPage {
            data,
            width: image.width(),
            height: image.height(),
            quality,
            within_budget,
        };

        let Some(max_bytes) = self.max_bytes else {
            let data = self.encoder.encode(image, self.quality)?;
            return Ok(page(data, self.quality, true));
        };

        let mut quality = self.quality;
        loop {
            let data = self.encoder.encode(image, quality)?;
            debug!(quality, bytes = data.len(), max_bytes, "Encoded candidate");
            if data.len() as u64 <= max_bytes {
                return Ok(page(data, quality, true));
            }
            if quality == 1 {
                break;
            }
            quality -= 1;
        }

        warn!(
            max_bytes,
            fallback_quality = self.quality,
            "No quality fits the size budget, using requested quality"
        );
        let data = self.encoder.encode(image, self.quality)?;
        Ok(page(data, self.quality, false))
    }
}
