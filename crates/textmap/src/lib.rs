//! textmap: map the text blocks of PDF documents.
//!
//! This is the public API facade crate for pdf-textmap. It re-exports types
//! from textmap-core and uses textmap-parse for reading, decrypting and
//! annotating documents.
//!
//! # Architecture
//!
//! - **textmap-core**: backend-independent types and the overlap filtering engine
//! - **textmap-parse**: lopdf backend (content stream words, annotations)
//! - **textmap** (this crate): [`Document`], tying everything together
//!
//! ```no_run
//! use textmap::{Document, FilterOptions, OverlapFilter, TracingDiagnostics};
//!
//! # fn main() -> Result<(), textmap::TextmapError> {
//! let mut doc = Document::open_file("report.pdf", None)?;
//! let blocks = doc.text_blocks(None)?.emit_to(&mut TracingDiagnostics);
//! let filter = OverlapFilter::new(FilterOptions::default())?;
//! let outcome = filter.filter_with(blocks, &mut TracingDiagnostics);
//! doc.annotate(&outcome.survivors)?;
//! let out = doc.default_annotated_path();
//! doc.save(&out)?;
//! # Ok(())
//! # }
//! ```

mod document;

pub use document::{Document, DocumentInfo};
pub use textmap_core;
pub use textmap_core::{
    BBox, Diagnostics, ExtractResult, FilterOptions, FilterOutcome, FilterReport, OverlapDetector,
    OverlapFilter, OverlapPair, PageRect, ResolutionPolicy, Silent, TextBlock, TextmapError,
    TracingDiagnostics, Warning, WarningCode,
};
pub use textmap_parse;
