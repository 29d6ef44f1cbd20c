// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decode, rescale, and size-bounded JPEG encoding.

pub mod compressor;
pub mod processor;

pub use compressor::{AdaptiveCompressor, ImageEncoder, JpegEncoder};
pub use processor::ImageProcessor;
