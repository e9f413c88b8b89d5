//! textmap-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types ([`BBox`], [`TextBlock`],
//! [`RawWord`]) and the overlap filtering engine used by pdf-textmap:
//!
//! - [`geometry`]: axis-aligned rectangle kernel (area, intersection, coverage ratio)
//! - [`overlap`]: per-page pairwise overlap detection
//! - [`resolve`]: resolution policies deciding which member of a pair is dropped
//! - [`filter`]: the orchestrator tying detection and resolution together
//!
//! It has no PDF dependency. Document access is abstracted behind
//! [`DocumentSource`], implemented by `textmap-parse`.

pub mod block;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod overlap;
pub mod resolve;
pub mod source;

pub use block::{PageRect, RawWord, TextBlock};
#[cfg(feature = "tracing")]
pub use diagnostics::TracingDiagnostics;
pub use diagnostics::{Diagnostics, ExtractResult, Silent, Warning, WarningCode};
pub use error::{GeometryError, TextmapError};
pub use filter::{FilterOptions, FilterOutcome, FilterReport, OverlapFilter};
pub use geometry::{AREA_EPSILON, BBox};
pub use overlap::{OverlapDetector, OverlapPair};
pub use resolve::ResolutionPolicy;
pub use source::{DocumentSource, PageContent, assemble_blocks, extract_text_blocks};
