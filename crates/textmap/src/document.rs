//! Top-level PDF document type for mapping and annotating text blocks.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use textmap_core::{ExtractResult, TextBlock, TextmapError, extract_text_blocks};
use textmap_parse::{LopdfDocument, annotate_page};
use tracing::{debug, info, warn};

/// Summary of an opened document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// File name of the PDF, without its directory.
    pub name: String,
    /// Number of pages in the document.
    pub total_pages: usize,
    /// Whether the document had to be decrypted on open.
    pub encrypted: bool,
}

/// A PDF document opened from disk.
///
/// Wraps the lopdf backend together with the path it was read from, so the
/// annotated copy can be written next to the original.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    backend: LopdfDocument,
}

impl Document {
    /// Check that `path` names an existing file with a `.pdf` extension.
    ///
    /// # Errors
    ///
    /// Returns [`TextmapError::Validation`] describing the first failed check.
    pub fn validate_path(path: &Path) -> Result<(), TextmapError> {
        if !path.exists() {
            return Err(TextmapError::Validation(format!(
                "PDF file not found: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(TextmapError::Validation(format!(
                "path is not a file: {}",
                path.display()
            )));
        }
        let is_pdf = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(TextmapError::Validation(format!(
                "file is not a PDF: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "PDF path validated");
        Ok(())
    }

    /// Validate, read and open the PDF at `path`.
    ///
    /// Encrypted documents are decrypted with `password`, or with the empty
    /// user password when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`TextmapError::Validation`] for a bad path, [`TextmapError::Io`]
    /// if the file cannot be read, [`TextmapError::PasswordRequired`] or
    /// [`TextmapError::InvalidPassword`] when decryption fails, and
    /// [`TextmapError::Parse`] for malformed documents.
    pub fn open_file(path: impl AsRef<Path>, password: Option<&str>) -> Result<Self, TextmapError> {
        let path = path.as_ref();
        Self::validate_path(path)?;
        let bytes = std::fs::read(path)?;
        let backend = LopdfDocument::open(&bytes, password)?;
        info!(
            path = %path.display(),
            pages = backend.page_count(),
            "PDF opened successfully"
        );
        if backend.was_encrypted() {
            info!("PDF decrypted successfully");
        }
        Ok(Self {
            path: path.to_path_buf(),
            backend,
        })
    }

    /// The path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            name: self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            total_pages: self.backend.page_count(),
            encrypted: self.backend.was_encrypted(),
        }
    }

    /// Extract text blocks from the given 0-based pages, or from all pages.
    pub fn text_blocks(
        &self,
        pages: Option<&[usize]>,
    ) -> Result<ExtractResult<Vec<TextBlock>>, TextmapError> {
        let result = extract_text_blocks(&self.backend, pages)?;
        info!(blocks = result.value.len(), "extracted text blocks");
        Ok(result)
    }

    /// Draw a rectangle annotation around every block on its page.
    ///
    /// Returns the number of pages that received annotations. An empty
    /// `blocks` slice only logs a warning.
    ///
    /// # Errors
    ///
    /// Returns [`TextmapError::Annotation`] if a page cannot be annotated.
    pub fn annotate(&mut self, blocks: &[TextBlock]) -> Result<usize, TextmapError> {
        if blocks.is_empty() {
            warn!("No text blocks to annotate");
            return Ok(0);
        }

        let mut by_page: BTreeMap<usize, Vec<_>> = BTreeMap::new();
        for block in blocks {
            by_page.entry(block.page_number).or_default().push(block.bbox);
        }

        for (&page, boxes) in &by_page {
            annotate_page(&mut self.backend, page, boxes).map_err(|e| {
                TextmapError::Annotation(format!("failed to annotate page {page}: {e}"))
            })?;
            debug!(page, boxes = boxes.len(), "annotated page");
        }

        info!("Drew rectangles on {} page(s)", by_page.len());
        Ok(by_page.len())
    }

    /// `{dir}/{stem}_annotated{ext}` next to the source file.
    pub fn default_annotated_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match self.path.extension() {
            Some(ext) => format!("{stem}_annotated.{}", ext.to_string_lossy()),
            None => format!("{stem}_annotated"),
        };
        self.path.with_file_name(name)
    }

    /// Write the (possibly annotated) document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TextmapError::Annotation`] if the file cannot be written.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), TextmapError> {
        let path = path.as_ref();
        self.backend
            .save(path)
            .map_err(|e| TextmapError::Annotation(format!("failed to save PDF: {e}")))?;
        info!(path = %path.display(), "PDF saved successfully");
        Ok(())
    }
}
