// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode, rescale, and JPEG-encode a single page image.
// Operates on in-memory images using the `image` crate.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageError};
use pdfzipper_core::error::ZipperError;
use tracing::{debug, info, instrument};

/// Decode/transform stage of the page pipeline.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let page = ImageProcessor::open("2017_01_03/p_001.jpg")?
///     .scale(0.5)
///     .into_dynamic();
/// let jpeg = encode_jpeg(&page, 75)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode an image file. Any failure, including a missing file, is an
    /// [`ZipperError::ImageDecode`] tagged with `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ZipperError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|err| ZipperError::ImageDecode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        debug!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Multiply both dimensions by `factor`.
    ///
    /// Each dimension is scaled on its own and truncated, with a floor of one
    /// pixel. A factor of exactly 1.0 returns the image untouched.
    #[instrument(skip(self))]
    pub fn scale(self, factor: f32) -> Self {
        let (width, height) = scaled_dimensions(self.width(), self.height(), factor);
        if (width, height) == (self.width(), self.height()) {
            return self;
        }
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            to_w = width,
            to_h = height,
            "Rescaling image"
        );
        let resized = self
            .image
            .resize_exact(width, height, FilterType::Lanczos3);
        Self { image: resized }
    }
}

/// Target dimensions for a linear rescale by `factor`.
pub fn scaled_dimensions(width: u32, height: u32, factor: f32) -> (u32, u32) {
    if (factor - 1.0).abs() <= f32::EPSILON {
        return (width, height);
    }
    let scale = |dim: u32| ((dim as f64 * f64::from(factor)) as u32).max(1);
    (scale(width), scale(height))
}

/// Encode a `DynamicImage` as JPEG with the given quality (1-100).
///
/// Alpha is dropped; the output is always three-channel so the PDF side can
/// declare `DeviceRGB` unconditionally.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(buffer)
}
