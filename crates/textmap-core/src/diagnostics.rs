//! Warning types and the diagnostics sink.
//!
//! The core never writes to a global logger. Callers pass a [`Diagnostics`]
//! implementation into the operations that report progress or recoverable
//! problems: [`Silent`] to drop everything, a `Vec<Warning>` to collect
//! warnings, or (with the `tracing` feature) [`TracingDiagnostics`] to forward
//! to `tracing`.

use std::fmt;

/// Machine-readable warning code for categorizing non-fatal issues.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum WarningCode {
    /// A rectangle with non-finite coordinates or non-positive extent.
    InvalidGeometry,
    /// A rectangle extends past the page bounds.
    OutOfPageBounds,
    /// A requested page does not exist in the document.
    PageOutOfRange,
    /// A referenced font was not found in page resources.
    MissingFont,
    /// A font type whose text cannot be decoded.
    UnsupportedFont,
    /// A content stream or object with unexpected structure.
    MalformedContent,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl WarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            WarningCode::InvalidGeometry => "INVALID_GEOMETRY",
            WarningCode::OutOfPageBounds => "OUT_OF_PAGE_BOUNDS",
            WarningCode::PageOutOfRange => "PAGE_OUT_OF_RANGE",
            WarningCode::MissingFont => "MISSING_FONT",
            WarningCode::UnsupportedFont => "UNSUPPORTED_FONT",
            WarningCode::MalformedContent => "MALFORMED_CONTENT",
            WarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue encountered during extraction or filtering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    /// Machine-readable warning code.
    pub code: WarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Page number where the warning occurred (0-indexed), if applicable.
    pub page: Option<usize>,
    /// Position of the offending item in its input sequence, if applicable.
    pub index: Option<usize>,
}

impl Warning {
    /// Create a warning with a specific code and description.
    pub fn new(code: WarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            index: None,
        }
    }

    /// Attach a page number (builder pattern).
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach an input index (builder pattern).
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        if let Some(index) = self.index {
            write!(f, " [index {index}]")?;
        }
        Ok(())
    }
}

/// Sink for warnings and progress messages.
pub trait Diagnostics {
    /// Report a recoverable problem.
    fn warning(&mut self, warning: Warning);

    /// Report a progress message. Ignored by default.
    fn info(&mut self, _message: &str) {}

    /// Report a detail message. Ignored by default.
    fn debug(&mut self, _message: &str) {}
}

/// Diagnostics sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Diagnostics for Silent {
    fn warning(&mut self, _warning: Warning) {}
}

impl Diagnostics for Vec<Warning> {
    fn warning(&mut self, warning: Warning) {
        self.push(warning);
    }
}

/// Diagnostics sink forwarding to the `tracing` macros.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

#[cfg(feature = "tracing")]
impl Diagnostics for TracingDiagnostics {
    fn warning(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
    }

    fn info(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn debug(&mut self, message: &str) {
        tracing::debug!("{message}");
    }
}

/// Result wrapper that pairs a value with collected warnings.
///
/// Used when extraction can partially succeed with non-fatal issues.
#[derive(Debug, Clone)]
pub struct ExtractResult<T> {
    /// The extracted value.
    pub value: T,
    /// Warnings collected during extraction.
    pub warnings: Vec<Warning>,
}

impl<T> ExtractResult<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractResult<U> {
        ExtractResult {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Hand every collected warning to `diagnostics` and return the value.
    pub fn emit_to(self, diagnostics: &mut dyn Diagnostics) -> T {
        for warning in self.warnings {
            diagnostics.warning(warning);
        }
        self.value
    }
}
