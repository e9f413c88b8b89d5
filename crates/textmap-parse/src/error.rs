//! Error types for the lopdf backend.
//!
//! Uses [`thiserror`] for derivation. [`BackendError`] converts into
//! [`TextmapError`] at the crate boundary.

use textmap_core::TextmapError;
use thiserror::Error;

/// Error type for backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading or writing PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while adding annotations to a page.
    #[error("annotation error: {0}")]
    Annotation(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] TextmapError),
}

impl From<BackendError> for TextmapError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => TextmapError::Parse(msg),
            BackendError::Io(e) => TextmapError::Io(e.to_string()),
            BackendError::Annotation(msg) => TextmapError::Annotation(msg),
            BackendError::Core(e) => e,
        }
    }
}
