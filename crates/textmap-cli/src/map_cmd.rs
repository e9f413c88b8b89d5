//! The end-to-end pipeline: extract, filter, annotate, export.

use std::path::Path;

use textmap::{Document, FilterOptions, OverlapFilter, TextmapError, TracingDiagnostics};
use tracing::info;

use crate::cli::Cli;
use crate::json_export;
use crate::page_range::parse_page_range;
use crate::shared::{fail, open_document};

/// Arguments checked before any document work starts.
#[derive(Debug)]
struct Validated<'a> {
    pages: Option<Vec<usize>>,
    filter: Option<FilterOptions>,
    /// `Some(None)` means the default export name.
    json: Option<Option<&'a str>>,
}

fn validate(cli: &Cli) -> Result<Validated<'_>, TextmapError> {
    Document::validate_path(&cli.pdf_path)?;

    let options = FilterOptions {
        threshold: cli.overlap_threshold,
        policy: cli.overlap_strategy.into(),
    };
    options.validate()?;

    let pages = cli.pages.as_deref().map(parse_page_range).transpose()?;

    let json = match &cli.save_json {
        None => None,
        Some(None) => Some(None),
        Some(Some(name)) if name.trim().is_empty() => {
            return Err(TextmapError::InvalidArgument(
                "--save-json filename cannot be empty".to_string(),
            ));
        }
        Some(Some(name)) => Some(Some(name.as_str())),
    };

    Ok(Validated {
        pages,
        filter: cli.filter_overlapping.then_some(options),
        json,
    })
}

pub fn run(cli: &Cli) -> Result<(), i32> {
    let args = validate(cli).map_err(fail)?;
    let pdf_path: &Path = &cli.pdf_path;
    info!("Processing PDF: {}", pdf_path.display());
    if let Some(pages) = &args.pages {
        let one_based: Vec<usize> = pages.iter().map(|p| p + 1).collect();
        info!("Processing pages: {one_based:?} (1-indexed)");
    }

    let mut doc = open_document(pdf_path, cli.encryption_password.as_deref())?;

    let mut blocks = doc
        .text_blocks(args.pages.as_deref())
        .map_err(fail)?
        .emit_to(&mut TracingDiagnostics);

    if let Some(options) = args.filter {
        info!(
            "Filtering overlapping bounding boxes using strategy: {}",
            options.policy
        );
        let filter = OverlapFilter::new(options).map_err(fail)?;
        blocks = filter
            .filter_with(blocks, &mut TracingDiagnostics)
            .survivors;
        info!("After filtering: {} text blocks", blocks.len());
    }

    doc.annotate(&blocks).map_err(fail)?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| doc.default_annotated_path());
    doc.save(&output).map_err(fail)?;

    if let Some(filename) = args.json {
        let total_pages = doc.info().total_pages;
        let path =
            json_export::export(pdf_path, &blocks, filename, Some(total_pages)).map_err(fail)?;
        info!("JSON exported to: {}", path.display());
    }

    info!("PDF processing completed successfully");
    Ok(())
}
