//! textmap-parse: lopdf backend for pdf-textmap.
//!
//! This crate opens and decrypts PDF documents, interprets page content
//! streams into positioned words, and writes rectangle annotations back.
//! It depends on textmap-core for shared data types and implements its
//! [`textmap_core::DocumentSource`] trait.
//!
//! - [`lopdf_backend`]: document loading, page geometry, saving
//! - [`interpreter`]: content stream operators to words
//! - [`annotate`]: `/Square` annotations around text blocks

pub mod annotate;
pub mod error;
pub mod fonts;
pub mod interpreter;
pub mod lopdf_backend;
pub mod matrix;
pub mod page_geometry;
pub mod standard_fonts;
pub mod text_state;
pub mod words;

pub use annotate::annotate_page;
pub use error::BackendError;
pub use lopdf_backend::LopdfDocument;
pub use page_geometry::PageGeometry;
pub use textmap_core;
