use std::collections::BTreeSet;

use textmap::TextmapError;

/// Highest page number accepted in a selection.
pub const MAX_PAGE_NUMBER: usize = 100_000;

/// Parse a page range string like "1,3-5" into a sorted list of 0-indexed page numbers.
///
/// Input is 1-indexed (user-facing). Output is 0-indexed (internal).
/// Pages are not checked against the document here; pages past its end are
/// skipped with a warning during extraction. Page numbers above
/// [`MAX_PAGE_NUMBER`] are rejected.
pub fn parse_page_range(input: &str) -> Result<Vec<usize>, TextmapError> {
    let invalid = |msg: String| TextmapError::InvalidPageRange(msg);
    let parse_page = |s: &str| -> Result<usize, TextmapError> {
        let page: usize = s
            .trim()
            .parse()
            .map_err(|_| invalid(format!("invalid page number: '{}'", s.trim())))?;
        if page == 0 {
            return Err(invalid("page 0 is invalid (pages start at 1)".to_string()));
        }
        if page > MAX_PAGE_NUMBER {
            return Err(invalid(format!(
                "page {page} exceeds the maximum of {MAX_PAGE_NUMBER}"
            )));
        }
        Ok(page)
    };

    let mut pages = BTreeSet::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start_str, end_str)) = part.split_once('-') {
            let start = parse_page(start_str)?;
            let end = parse_page(end_str)?;
            if start > end {
                return Err(invalid(format!(
                    "start page must be <= end page: '{part}'"
                )));
            }
            pages.extend((start..=end).map(|p| p - 1));
        } else {
            pages.insert(parse_page(part)? - 1);
        }
    }

    if pages.is_empty() {
        return Err(invalid(format!("no pages selected: '{input}'")));
    }

    Ok(pages.into_iter().collect())
}
