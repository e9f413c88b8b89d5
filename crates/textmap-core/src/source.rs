//! Document sources and assembly of words into text blocks.

use crate::block::{RawWord, TextBlock};
use crate::diagnostics::{ExtractResult, Warning, WarningCode};
use crate::error::TextmapError;
use crate::geometry::BBox;

/// Words and dimensions of a single page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageContent {
    /// 0-based page index.
    pub page_number: usize,
    pub width: f64,
    pub height: f64,
    /// Words in content stream order.
    pub words: Vec<RawWord>,
}

/// A document that can produce per-page words.
pub trait DocumentSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Words and dimensions of the page at 0-based `index`.
    fn page_content(&self, index: usize) -> Result<ExtractResult<PageContent>, TextmapError>;
}

/// Merge the words of a page into one block per block id.
///
/// Blocks appear in the order their first word appears. A block reaching
/// past the page edges is kept and reported as [`WarningCode::OutOfPageBounds`].
pub fn assemble_blocks(page: &PageContent) -> ExtractResult<Vec<TextBlock>> {
    let mut groups: Vec<(u32, Vec<&RawWord>)> = Vec::new();
    for word in &page.words {
        match groups.iter_mut().find(|(id, _)| *id == word.block) {
            Some((_, members)) => members.push(word),
            None => groups.push((word.block, vec![word])),
        }
    }

    let mut warnings = Vec::new();
    let mut blocks = Vec::with_capacity(groups.len());
    for (id, members) in groups {
        let bbox = members
            .iter()
            .skip(1)
            .fold(members[0].bbox, |acc: BBox, w| acc.union(&w.bbox));
        let text = members
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let block = TextBlock {
            text,
            bbox,
            page_number: page.page_number,
            word_count: members.len(),
            page_width: page.width,
            page_height: page.height,
        };
        if !block.within_page() {
            warnings.push(
                Warning::new(
                    WarningCode::OutOfPageBounds,
                    format!(
                        "block {id} extends outside the {}x{} page",
                        page.width, page.height
                    ),
                )
                .on_page(page.page_number)
                .at_index(blocks.len()),
            );
        }
        blocks.push(block);
    }

    ExtractResult::with_warnings(blocks, warnings)
}

/// Extract text blocks from the selected pages, or from every page.
///
/// Requested pages beyond the document are skipped with a
/// [`WarningCode::PageOutOfRange`] warning. Blocks come back grouped by page
/// in the order the pages were requested.
pub fn extract_text_blocks(
    source: &dyn DocumentSource,
    pages: Option<&[usize]>,
) -> Result<ExtractResult<Vec<TextBlock>>, TextmapError> {
    let page_count = source.page_count();
    let selected: Vec<usize> = match pages {
        Some(pages) => pages.to_vec(),
        None => (0..page_count).collect(),
    };

    let mut blocks = Vec::new();
    let mut warnings = Vec::new();
    for index in selected {
        if index >= page_count {
            warnings.push(
                Warning::new(
                    WarningCode::PageOutOfRange,
                    format!(
                        "page {} is out of range (document has {page_count} pages), skipping",
                        index + 1
                    ),
                )
                .on_page(index),
            );
            continue;
        }
        let content = source.page_content(index)?;
        warnings.extend(content.warnings);
        let assembled = assemble_blocks(&content.value);
        warnings.extend(assembled.warnings);
        blocks.extend(assembled.value);
    }

    Ok(ExtractResult::with_warnings(blocks, warnings))
}
