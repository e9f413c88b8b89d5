//! JSON export of extracted text blocks.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use textmap::{TextBlock, TextmapError};
use tracing::info;

/// Top-level shape of the exported file.
#[derive(Debug, Serialize)]
pub struct TextmapExport<'a> {
    pub pdf_name: String,
    pub total_pages: usize,
    /// 1-indexed, sorted, unique.
    pub pages_processed: Vec<usize>,
    pub text_blocks: Vec<BlockRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BlockRecord<'a> {
    pub text: &'a str,
    /// `[x0, top, x1, bottom]`
    pub bbox: [f64; 4],
    /// 1-indexed.
    pub page_number: usize,
    pub word_count: usize,
    pub pdf_width: f64,
    pub pdf_height: f64,
}

/// Where the export for `pdf_path` goes.
///
/// Defaults to `{stem}_textmap.json`; a given file name is used as is, with
/// `.json` appended when missing. Either way the file lands in the PDF's
/// directory.
pub fn output_path(pdf_path: &Path, filename: Option<&str>) -> PathBuf {
    let name = match filename {
        Some(name) if name.ends_with(".json") => name.to_string(),
        Some(name) => format!("{name}.json"),
        None => {
            let stem = pdf_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{stem}_textmap.json")
        }
    };
    pdf_path.with_file_name(name)
}

/// Build the export document.
///
/// When `total_pages` is unknown, the highest processed page stands in for it.
pub fn build<'a>(
    pdf_path: &Path,
    blocks: &'a [TextBlock],
    total_pages: Option<usize>,
) -> TextmapExport<'a> {
    let pages_processed: Vec<usize> = blocks
        .iter()
        .map(|b| b.page_number + 1)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let total_pages =
        total_pages.unwrap_or_else(|| pages_processed.last().copied().unwrap_or(0));

    TextmapExport {
        pdf_name: pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        total_pages,
        pages_processed,
        text_blocks: blocks
            .iter()
            .map(|b| BlockRecord {
                text: &b.text,
                bbox: [b.bbox.x0, b.bbox.top, b.bbox.x1, b.bbox.bottom],
                page_number: b.page_number + 1,
                word_count: b.word_count,
                pdf_width: b.page_width,
                pdf_height: b.page_height,
            })
            .collect(),
    }
}

/// Write `blocks` as pretty-printed JSON and return the path written.
pub fn export(
    pdf_path: &Path,
    blocks: &[TextBlock],
    filename: Option<&str>,
    total_pages: Option<usize>,
) -> Result<PathBuf, TextmapError> {
    let path = output_path(pdf_path, filename);
    let data = build(pdf_path, blocks, total_pages);
    let json = serde_json::to_string_pretty(&data)
        .map_err(|e| TextmapError::Export(format!("failed to export JSON: {e}")))?;
    std::fs::write(&path, json).map_err(|e| {
        TextmapError::Export(format!("failed to write {}: {e}", path.display()))
    })?;
    info!(path = %path.display(), blocks = blocks.len(), "JSON exported successfully");
    Ok(path)
}
