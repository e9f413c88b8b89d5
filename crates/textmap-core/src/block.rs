//! Text blocks and the words they are assembled from.

use crate::geometry::BBox;

/// A rectangle tagged with the page it belongs to.
///
/// The overlap engine is generic over this trait, so it can run on anything
/// that carries a bounding box and a page index.
pub trait PageRect {
    /// The rectangle in top-left origin page coordinates.
    fn rect(&self) -> &BBox;

    /// 0-based index of the page the rectangle lives on.
    fn page(&self) -> usize;
}

/// A word as produced by a document source, before grouping into blocks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawWord {
    /// The text content of this word.
    pub text: String,
    /// Bounding box of the word.
    pub bbox: BBox,
    /// Block grouping identifier; words sharing it form one [`TextBlock`].
    pub block: u32,
    /// Line number within the block.
    pub line: u32,
    /// Word number within the line.
    pub word: u32,
}

/// A block of words on one page with the box enclosing all of them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextBlock {
    /// Constituent words joined by single spaces, in extraction order.
    pub text: String,
    /// Box enclosing every constituent word.
    pub bbox: BBox,
    /// 0-based page index.
    pub page_number: usize,
    /// Number of constituent words.
    pub word_count: usize,
    /// Width of the page the block was extracted from.
    pub page_width: f64,
    /// Height of the page the block was extracted from.
    pub page_height: f64,
}

impl TextBlock {
    /// Whether the block lies fully inside its page.
    pub fn within_page(&self) -> bool {
        self.bbox.is_within(self.page_width, self.page_height)
    }
}

impl PageRect for TextBlock {
    fn rect(&self) -> &BBox {
        &self.bbox
    }

    fn page(&self) -> usize {
        self.page_number
    }
}

impl PageRect for (usize, BBox) {
    fn rect(&self) -> &BBox {
        &self.1
    }

    fn page(&self) -> usize {
        self.0
    }
}
