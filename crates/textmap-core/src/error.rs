//! Error types for pdf-textmap.
//!
//! [`TextmapError`] covers everything that aborts an operation: configuration
//! mistakes (caught before any work starts) and upstream document failures.
//! [`GeometryError`] describes an invalid rectangle; the overlap engine
//! recovers from it locally and never propagates it.

use std::fmt;

use crate::geometry::BBox;

/// Fatal error types for text mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum TextmapError {
    /// Overlap threshold outside `[0.0, 1.0]`.
    InvalidThreshold(f64),
    /// A resolution policy tag that is not recognized.
    UnknownPolicy(String),
    /// Malformed page range selection.
    InvalidPageRange(String),
    /// Any other invalid user-supplied argument.
    InvalidArgument(String),
    /// The input path failed validation (missing, not a file, not a PDF).
    Validation(String),
    /// I/O error reading or writing a file.
    Io(String),
    /// Error parsing PDF structure or content.
    Parse(String),
    /// The PDF is encrypted and requires a password to open.
    PasswordRequired,
    /// The supplied password is incorrect for this encrypted PDF.
    InvalidPassword,
    /// Failure while drawing or saving annotations.
    Annotation(String),
    /// Failure while exporting results.
    Export(String),
}

impl TextmapError {
    /// Whether this error stems from configuration rather than the document.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TextmapError::InvalidThreshold(_)
                | TextmapError::UnknownPolicy(_)
                | TextmapError::InvalidPageRange(_)
                | TextmapError::InvalidArgument(_)
        )
    }
}

impl fmt::Display for TextmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextmapError::InvalidThreshold(value) => {
                write!(f, "overlap threshold must be between 0.0 and 1.0, got {value}")
            }
            TextmapError::UnknownPolicy(tag) => write!(
                f,
                "unsupported overlap strategy: '{tag}' (expected keep_largest or keep_first)"
            ),
            TextmapError::InvalidPageRange(msg) => write!(f, "invalid page range: {msg}"),
            TextmapError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            TextmapError::Validation(msg) => write!(f, "{msg}"),
            TextmapError::Io(msg) => write!(f, "I/O error: {msg}"),
            TextmapError::Parse(msg) => write!(f, "parse error: {msg}"),
            TextmapError::PasswordRequired => {
                write!(f, "PDF is encrypted and requires a password")
            }
            TextmapError::InvalidPassword => write!(f, "PDF decryption failed: invalid password"),
            TextmapError::Annotation(msg) => write!(f, "annotation error: {msg}"),
            TextmapError::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for TextmapError {}

impl From<std::io::Error> for TextmapError {
    fn from(err: std::io::Error) -> Self {
        TextmapError::Io(err.to_string())
    }
}

/// Why a bounding box cannot take part in overlap detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// At least one coordinate is NaN or infinite.
    NonFinite(BBox),
    /// Width or height is zero or negative.
    Degenerate { width: f64, height: f64 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::NonFinite(b) => write!(
                f,
                "non-finite bbox ({}, {}, {}, {})",
                b.x0, b.top, b.x1, b.bottom
            ),
            GeometryError::Degenerate { width, height } => write!(
                f,
                "degenerate bbox (width {width}, height {height}; both must be positive)"
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_threshold_message() {
        let err = TextmapError::InvalidThreshold(1.5);
        assert_eq!(
            err.to_string(),
            "overlap threshold must be between 0.0 and 1.0, got 1.5"
        );
    }

    #[test]
    fn unknown_policy_message_names_tag() {
        let err = TextmapError::UnknownPolicy("keep_smallest".to_string());
        assert!(err.to_string().contains("keep_smallest"));
    }

    #[test]
    fn configuration_classification() {
        assert!(TextmapError::InvalidThreshold(-0.1).is_configuration());
        assert!(TextmapError::UnknownPolicy("x".into()).is_configuration());
        assert!(TextmapError::InvalidPageRange("0".into()).is_configuration());
        assert!(TextmapError::InvalidArgument("x".into()).is_configuration());
        assert!(!TextmapError::PasswordRequired.is_configuration());
        assert!(!TextmapError::Parse("bad xref".into()).is_configuration());
    }

    #[test]
    fn password_errors_display() {
        assert_eq!(
            TextmapError::PasswordRequired.to_string(),
            "PDF is encrypted and requires a password"
        );
        assert_eq!(
            TextmapError::InvalidPassword.to_string(),
            "PDF decryption failed: invalid password"
        );
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TextmapError = io_err.into();
        assert!(matches!(err, TextmapError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn geometry_error_display() {
        let err = GeometryError::Degenerate {
            width: 0.0,
            height: 0.0,
        };
        assert!(err.to_string().starts_with("degenerate bbox"));
        let err = GeometryError::NonFinite(BBox::new(f64::NAN, 0.0, 1.0, 1.0));
        assert!(err.to_string().contains("NaN"));
    }

    #[test]
    fn errors_implement_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(TextmapError::Export("disk full".into()));
        assert_eq!(err.to_string(), "export error: disk full");
    }
}
