//! lopdf-based document access.
//!
//! Opens (and if needed decrypts) a PDF with [lopdf](https://crates.io/crates/lopdf),
//! resolves page geometry and runs the content stream interpreter to produce
//! the per-page words consumed by [`textmap_core::extract_text_blocks`].

use std::io::Write;
use std::path::Path;

use textmap_core::{
    DocumentSource, ExtractResult, PageContent, TextmapError, Warning, WarningCode,
};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::interpreter;
use crate::page_geometry::PageGeometry;

/// MediaBox assumed when a page and its ancestors have none (US Letter).
const FALLBACK_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Page object ids indexed by 0-based page number.
    page_ids: Vec<lopdf::ObjectId>,
    encrypted: bool,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .field("encrypted", &self.encrypted)
            .finish_non_exhaustive()
    }
}

impl LopdfDocument {
    /// Parse a PDF from memory, decrypting it when it is encrypted.
    ///
    /// Without a password the empty user password is tried. Fails with
    /// [`TextmapError::PasswordRequired`] when that is not enough, and with
    /// [`TextmapError::InvalidPassword`] when a given password is rejected.
    pub fn open(bytes: &[u8], password: Option<&str>) -> Result<Self, BackendError> {
        let parsed = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        // Decrypting after load_mem leaves the page tree unresolved, so
        // encrypted files are reloaded with the password instead.
        let (inner, encrypted) = if parsed.is_encrypted() {
            debug!("document is encrypted, attempting decryption");
            let attempt = password.unwrap_or("");
            let decrypted = lopdf::Document::load_mem_with_password(bytes, attempt).map_err(|e| {
                debug!("decryption failed: {e}");
                match password {
                    None => BackendError::Core(TextmapError::PasswordRequired),
                    Some(_) => BackendError::Core(TextmapError::InvalidPassword),
                }
            })?;
            (decrypted, true)
        } else {
            (parsed, false)
        };

        // get_pages returns BTreeMap<u32, ObjectId> keyed by 1-based page number
        let page_ids: Vec<lopdf::ObjectId> = inner.get_pages().values().copied().collect();
        debug!(pages = page_ids.len(), encrypted, "opened PDF");

        Ok(Self {
            inner,
            page_ids,
            encrypted,
        })
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    pub(crate) fn inner_mut(&mut self) -> &mut lopdf::Document {
        &mut self.inner
    }

    /// Whether the document had to be decrypted on open.
    pub fn was_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object id of the page at 0-based `index`.
    pub fn page_id(&self, index: usize) -> Result<lopdf::ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                self.page_ids.len()
            ))
        })
    }

    /// Page frame from the inherited `/MediaBox` and `/Rotate`.
    ///
    /// A missing or malformed MediaBox falls back to US Letter and is
    /// reported in the returned warnings.
    pub fn page_geometry(&self, index: usize) -> Result<ExtractResult<PageGeometry>, BackendError> {
        let page_id = self.page_id(index)?;
        let mut warnings = Vec::new();

        let media_box = resolve_inherited(&self.inner, page_id, b"MediaBox")?
            .map(|o| resolve_object(&self.inner, o))
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| extract_box_from_array(arr).ok());
        let media_box = media_box.unwrap_or_else(|| {
            warnings.push(
                Warning::new(
                    WarningCode::MalformedContent,
                    "missing or invalid /MediaBox, assuming US Letter",
                )
                .on_page(index),
            );
            FALLBACK_MEDIA_BOX
        });

        let rotation = resolve_inherited(&self.inner, page_id, b"Rotate")?
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        if rotation % 360 != 0 {
            debug!(page = index, rotation, "rotated page reported in unrotated frame");
        }

        Ok(ExtractResult::with_warnings(
            PageGeometry::new(media_box, rotation as i32),
            warnings,
        ))
    }

    /// Interpret the page at `index` and return its words and dimensions.
    pub fn page_words(&self, index: usize) -> Result<ExtractResult<PageContent>, BackendError> {
        let page_id = self.page_id(index)?;
        let ExtractResult {
            value: geometry,
            mut warnings,
        } = self.page_geometry(index)?;

        let page_dict = self
            .inner
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        let content = page_content_bytes(&self.inner, page_dict)?;
        let resources = page_resources(&self.inner, page_id)?;

        let words = interpreter::extract_words(&self.inner, geometry, index, &content, resources);
        warnings.extend(words.warnings);
        debug!(page = index, words = words.value.len(), "interpreted page");

        Ok(ExtractResult::with_warnings(
            PageContent {
                page_number: index,
                width: geometry.width(),
                height: geometry.height(),
                words: words.value,
            },
            warnings,
        ))
    }

    /// Write the document to `path`.
    pub fn save(&mut self, path: &Path) -> Result<(), BackendError> {
        let mut file = std::fs::File::create(path)?;
        self.save_to(&mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Write the document to any writer.
    pub fn save_to<W: Write>(&mut self, target: &mut W) -> Result<(), BackendError> {
        self.inner.save_to(target).map_err(|e| {
            warn!("failed to serialize PDF: {e}");
            BackendError::Io(std::io::Error::other(e.to_string()))
        })
    }
}

impl DocumentSource for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_content(&self, index: usize) -> Result<ExtractResult<PageContent>, TextmapError> {
        Ok(self.page_words(index)?)
    }
}

/// Extract `[x0, y0, x1, y1]` from a 4-number lopdf array.
fn extract_box_from_array(array: &[lopdf::Object]) -> Result<[f64; 4], BackendError> {
    if array.len() != 4 {
        return Err(BackendError::Parse(format!(
            "expected 4-element array for box, got {}",
            array.len()
        )));
    }
    Ok([
        object_to_f64(&array[0])?,
        object_to_f64(&array[1])?,
        object_to_f64(&array[2])?,
        object_to_f64(&array[3])?,
    ])
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &lopdf::Object) -> Result<f64, BackendError> {
    match obj {
        lopdf::Object::Integer(i) => Ok(*i as f64),
        lopdf::Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Follow an indirect reference; anything else is returned as is.
pub(crate) fn resolve_object<'a>(
    doc: &'a lopdf::Document,
    obj: &'a lopdf::Object,
) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, BackendError> {
    let mut current_id = page_id;
    // Bounded walk: a cyclic /Parent chain must not hang.
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent) => {
                current_id = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Err(BackendError::Parse("page tree /Parent chain too deep".to_string()))
}

/// Stream content, decompressed when it carries a `/Filter`.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Concatenated content stream bytes of a page (single stream or array).
fn page_content_bytes(
    doc: &lopdf::Document,
    page_dict: &lopdf::Dictionary,
) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let stream_of = |obj: &lopdf::Object| -> Result<Vec<u8>, BackendError> {
        let stream = resolve_object(doc, obj)
            .as_stream()
            .map_err(|e| BackendError::Parse(format!("/Contents entry is not a stream: {e}")))?;
        stream_bytes(stream)
    };

    match resolve_object(doc, contents) {
        lopdf::Object::Array(items) => {
            let mut content = Vec::new();
            for item in items {
                let bytes = stream_of(item)?;
                if !content.is_empty() {
                    content.push(b' ');
                }
                content.extend_from_slice(&bytes);
            }
            Ok(content)
        }
        other => stream_of(other),
    }
}

/// Resources dictionary of a page, honoring inheritance.
fn page_resources(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<&lopdf::Dictionary, BackendError> {
    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => resolve_object(doc, obj)
            .as_dict()
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
        None => {
            static EMPTY_DICT: std::sync::LazyLock<lopdf::Dictionary> =
                std::sync::LazyLock::new(lopdf::Dictionary::new);
            Ok(&EMPTY_DICT)
        }
    }
}
