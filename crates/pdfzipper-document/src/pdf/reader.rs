// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open an existing PDF and inspect its pages using `lopdf`.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use pdfzipper_core::error::ZipperError;
use tracing::{debug, instrument};

/// Read-only view of a PDF, enough to check what the assembler produced.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ZipperError> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| ZipperError::PdfRead {
            path: path_ref.to_path_buf(),
            reason: format!("not a readable PDF: {}", err),
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ZipperError> {
        let document = Document::load_mem(data).map_err(|err| ZipperError::PdfRead {
            path: "<memory>".into(),
            reason: format!("not a readable PDF: {}", err),
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// `(width, height)` of every page's MediaBox, in page order.
    pub fn page_sizes(&self) -> Result<Vec<(f64, f64)>, ZipperError> {
        self.document
            .get_pages()
            .values()
            .map(|page_id| -> Result<(f64, f64), ZipperError> {
                let media_box = self
                    .page_dictionary(*page_id)?
                    .get(b"MediaBox")
                    .and_then(Object::as_array)
                    .map_err(|err| self.error(format!("page has no MediaBox: {}", err)))?;
                let coords = media_box
                    .iter()
                    .map(number)
                    .collect::<Option<Vec<f64>>>()
                    .filter(|coords| coords.len() == 4)
                    .ok_or_else(|| self.error("malformed MediaBox".into()))?;
                Ok((coords[2] - coords[0], coords[3] - coords[1]))
            })
            .collect()
    }

    /// Raw bytes of the first image XObject on `page_number` (1-indexed).
    ///
    /// For pages written by the assembler this is the JPEG as produced by the
    /// compressor.
    pub fn page_image(&self, page_number: u32) -> Result<Vec<u8>, ZipperError> {
        let pages = self.document.get_pages();
        let page_id = *pages.get(&page_number).ok_or_else(|| {
            self.error(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })?;

        let resources = self.resolve(self.page_dictionary(page_id)?.get(b"Resources"))?;
        let xobjects = resources
            .as_dict()
            .and_then(|dict| dict.get(b"XObject"))
            .map_err(|err| self.error(format!("page has no XObject resources: {}", err)))?;
        let xobjects = self
            .resolve(Ok(xobjects))?
            .as_dict()
            .map_err(|err| self.error(err.to_string()))?;

        let (_, first) = xobjects
            .iter()
            .next()
            .ok_or_else(|| self.error("page has no images".into()))?;
        let stream = self
            .resolve(Ok(first))?
            .as_stream()
            .map_err(|err| self.error(format!("XObject is not a stream: {}", err)))?;
        Ok(stream.content.clone())
    }

    /// Title from the /Info dictionary, if present.
    pub fn title(&self) -> Option<String> {
        let info = self.resolve(self.document.trailer.get(b"Info")).ok()?;
        match info.as_dict().ok()?.get(b"Title").ok()? {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn page_dictionary(&self, page_id: ObjectId) -> Result<&lopdf::Dictionary, ZipperError> {
        self.document
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|err| self.error(format!("page {:?} unreadable: {}", page_id, err)))
    }

    /// Follow a single level of indirection.
    fn resolve<'a>(
        &'a self,
        object: lopdf::Result<&'a Object>,
    ) -> Result<&'a Object, ZipperError> {
        let object = object.map_err(|err| self.error(err.to_string()))?;
        match object {
            Object::Reference(id) => self
                .document
                .get_object(*id)
                .map_err(|err| self.error(format!("dangling reference {:?}: {}", id, err))),
            other => Ok(other),
        }
    }

    fn error(&self, reason: String) -> ZipperError {
        ZipperError::PdfRead {
            path: self.source_path.as_deref().unwrap_or("<memory>").into(),
            reason,
        }
    }
}

/// Numeric value of an Integer or Real object.
fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}
