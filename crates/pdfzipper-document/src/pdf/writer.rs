// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF assembly: build an image-per-page document with `lopdf`.
//
// Each page embeds one JPEG as a `DCTDecode` image XObject, byte for byte, so
// the size chosen by the adaptive compressor is the size that lands in the
// file. Page geometry is the image's pixel size with 1 pt == 1 px and the image
// drawn over the whole page.

use std::io::Write;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use pdfzipper_core::CompressedPage;
use pdfzipper_core::error::ZipperError;
use tracing::{debug, info, instrument};

/// Resource name every page uses for its single image.
const PAGE_IMAGE_NAME: &[u8] = b"Im0";

/// An in-progress document for one folder.
///
/// Owned by exactly one assembler. Nothing touches the filesystem until
/// [`PdfAssembly::save_atomically`], and an assembly without pages is never
/// written.
pub struct PdfAssembly {
    /// The lopdf document being built.
    document: Document,
    /// Reserved id for the page tree root, filled in on finish.
    pages_id: ObjectId,
    /// Page objects in insertion order.
    page_ids: Vec<ObjectId>,
    /// Final location; used for error tagging as well.
    destination: PathBuf,
    /// Title metadata embedded in the /Info dictionary.
    title: Option<String>,
}

impl PdfAssembly {
    /// Start an empty document that will be written to `destination`.
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            destination: destination.into(),
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append `page` as a new last page sized to its pixel dimensions.
    ///
    /// The page is consumed; its JPEG bytes move into the document.
    pub fn add_page(&mut self, page: CompressedPage) -> Result<(), ZipperError> {
        let width = i64::from(page.width);
        let height = i64::from(page.height);

        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
                "Filter" => "DCTDecode",
            },
            page.data,
        )
        .with_compression(false);
        let image_id = self.document.add_object(image);

        // Unit square scaled to the full page, then the image painted into it.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Integer(width),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(height),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(PAGE_IMAGE_NAME.to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|err| self.write_error(err))?;
        let content_id = self.document.add_object(Stream::new(dictionary! {}, encoded));

        let mut xobjects = lopdf::Dictionary::new();
        xobjects.set(PAGE_IMAGE_NAME.to_vec(), Object::Reference(image_id));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobjects },
        });
        self.page_ids.push(page_id);

        debug!(
            page = self.page_ids.len(),
            width,
            height,
            quality = page.quality,
            "Page appended"
        );
        Ok(())
    }

    /// Finish the page tree and serialise the document.
    pub fn to_bytes(mut self) -> Result<Vec<u8>, ZipperError> {
        if self.page_ids.is_empty() {
            return Err(ZipperError::PdfWrite {
                path: self.destination.clone(),
                reason: "document has no pages".into(),
            });
        }

        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        if let Some(title) = self.title.as_deref() {
            let info_id = self.document.add_object(dictionary! {
                "Title" => Object::string_literal(title),
                "Producer" => Object::string_literal("PdfZipper"),
            });
            self.document.trailer.set("Info", info_id);
        }

        // Content streams only; image streams opted out above.
        self.document.compress();

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|err| ZipperError::PdfWrite {
                path: self.destination.clone(),
                reason: err.to_string(),
            })?;
        debug!(bytes = output.len(), "PDF serialised");
        Ok(output)
    }

    /// Serialise and write to the destination in one step.
    ///
    /// The bytes go to a temporary file in the destination directory which is
    /// then renamed over the destination, so readers never observe a partial
    /// PDF and a failure leaves any previous file untouched.
    #[instrument(skip_all, fields(destination = %self.destination.display()))]
    pub fn save_atomically(self) -> Result<PathBuf, ZipperError> {
        let destination = self.destination.clone();
        let bytes = self.to_bytes()?;

        let dir = destination
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let io_error = |err: std::io::Error| ZipperError::PdfWrite {
            path: destination.clone(),
            reason: err.to_string(),
        };

        let mut staging = tempfile::Builder::new()
            .prefix(".pdfzipper-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_error)?;
        staging.write_all(&bytes).map_err(io_error)?;
        staging.as_file().sync_all().map_err(io_error)?;
        staging
            .persist(&destination)
            .map_err(|err| io_error(err.error))?;

        info!(path = %destination.display(), bytes = bytes.len(), "Wrote PDF");
        Ok(destination)
    }

    fn write_error(&self, err: lopdf::Error) -> ZipperError {
        ZipperError::PdfWrite {
            path: self.destination.clone(),
            reason: err.to_string(),
        }
    }
}
