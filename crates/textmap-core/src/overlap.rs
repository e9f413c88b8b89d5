//! Overlapping rectangle detection.
//!
//! Rectangles are partitioned by page and compared pairwise within each page
//! using the coverage ratio (intersection over the smaller area). Pages are
//! independent, so the quadratic cost is bounded by the busiest page rather
//! than the whole document.

use std::collections::BTreeMap;

use crate::block::PageRect;
use crate::diagnostics::{Diagnostics, Warning, WarningCode};
use crate::error::TextmapError;
use crate::geometry::BBox;

/// Two same-page rectangles whose coverage ratio met the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlapPair {
    /// Input index of the earlier rectangle.
    pub first: usize,
    /// Input index of the later rectangle (`second > first`).
    pub second: usize,
    /// Coverage ratio of the pair.
    pub ratio: f64,
}

/// Finds overlapping rectangle pairs at or above a coverage threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapDetector {
    threshold: f64,
}

impl Default for OverlapDetector {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

/// Valid rectangles of one page, as `(input index, bbox)` in input order.
type PageMembers = Vec<(usize, BBox)>;

impl OverlapDetector {
    /// Coverage ratio used when none is configured.
    pub const DEFAULT_THRESHOLD: f64 = 0.5;

    /// Create a detector. The threshold must lie in `[0.0, 1.0]`.
    pub fn new(threshold: f64) -> Result<Self, TextmapError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(TextmapError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    /// The configured coverage threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Find every same-page pair with `coverage_ratio >= threshold`.
    ///
    /// Pairs are returned sorted by `(first, second)`. Rectangles with invalid
    /// geometry are reported to `diagnostics` and left out of all comparisons.
    pub fn detect<T: PageRect>(
        &self,
        items: &[T],
        diagnostics: &mut dyn Diagnostics,
    ) -> Vec<OverlapPair> {
        self.scan(items, diagnostics).0
    }

    /// Detection plus the indices that were skipped as invalid.
    pub(crate) fn scan<T: PageRect>(
        &self,
        items: &[T],
        diagnostics: &mut dyn Diagnostics,
    ) -> (Vec<OverlapPair>, Vec<usize>) {
        let (pages, invalid) = partition_valid(items, diagnostics);

        #[cfg(feature = "parallel")]
        let mut pairs: Vec<OverlapPair> = {
            use rayon::prelude::*;
            pages
                .par_iter()
                .flat_map_iter(|members| self.pairs_on_page(members))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let mut pairs: Vec<OverlapPair> = pages
            .iter()
            .flat_map(|members| self.pairs_on_page(members))
            .collect();

        pairs.sort_by_key(|p| (p.first, p.second));

        for pair in &pairs {
            diagnostics.debug(&format!(
                "Overlap detected: blocks {} and {} (coverage: {:.2})",
                pair.first, pair.second, pair.ratio
            ));
        }
        diagnostics.info(&format!("Detected {} overlapping pairs", pairs.len()));

        (pairs, invalid)
    }

    /// Compare every unordered pair of one page exactly once.
    fn pairs_on_page(&self, members: &[(usize, BBox)]) -> Vec<OverlapPair> {
        let mut pairs = Vec::new();
        for (pos, (first, a)) in members.iter().enumerate() {
            for (second, b) in &members[pos + 1..] {
                let ratio = a.coverage_ratio(b);
                if ratio >= self.threshold {
                    pairs.push(OverlapPair {
                        first: *first,
                        second: *second,
                        ratio,
                    });
                }
            }
        }
        pairs
    }
}

/// Group valid rectangles by page, preserving input order inside each page.
///
/// Returns the per-page groups (ascending page number) and the indices of
/// rectangles rejected for invalid geometry.
fn partition_valid<T: PageRect>(
    items: &[T],
    diagnostics: &mut dyn Diagnostics,
) -> (Vec<PageMembers>, Vec<usize>) {
    let mut pages: BTreeMap<usize, PageMembers> = BTreeMap::new();
    let mut invalid = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let rect = *item.rect();
        match rect.validate() {
            Ok(()) => pages.entry(item.page()).or_default().push((idx, rect)),
            Err(e) => {
                diagnostics.warning(
                    Warning::new(
                        WarningCode::InvalidGeometry,
                        format!("invalid bbox excluded from overlap detection: {e}"),
                    )
                    .on_page(item.page())
                    .at_index(idx),
                );
                invalid.push(idx);
            }
        }
    }

    (pages.into_values().collect(), invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Silent;

    fn rect(page: usize, x0: f64, top: f64, x1: f64, bottom: f64) -> (usize, BBox) {
        (page, BBox::new(x0, top, x1, bottom))
    }

    #[test]
    fn threshold_must_be_in_unit_interval() {
        assert!(OverlapDetector::new(0.0).is_ok());
        assert!(OverlapDetector::new(1.0).is_ok());
        assert_eq!(
            OverlapDetector::new(1.01),
            Err(TextmapError::InvalidThreshold(1.01))
        );
        assert!(OverlapDetector::new(-0.5).is_err());
        assert!(OverlapDetector::new(f64::NAN).is_err());
    }

    #[test]
    fn default_threshold_is_half() {
        assert_eq!(OverlapDetector::default().threshold(), 0.5);
    }

    #[test]
    fn nested_pair_detected() {
        let items = vec![rect(0, 0.0, 0.0, 10.0, 10.0), rect(0, 2.0, 2.0, 5.0, 5.0)];
        let pairs = OverlapDetector::default().detect(&items, &mut Silent);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].first, pairs[0].second), (0, 1));
        assert!((pairs[0].ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cross_page_pairs_never_formed() {
        let items = vec![
            rect(0, 0.0, 0.0, 10.0, 10.0),
            rect(1, 0.0, 0.0, 10.0, 10.0),
            rect(2, 0.0, 0.0, 10.0, 10.0),
        ];
        let pairs = OverlapDetector::new(0.0).unwrap().detect(&items, &mut Silent);
        assert!(pairs.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        // Coverage exactly 0.5: 10x10 vs 10x5 sharing 5x5
        let items = vec![rect(0, 0.0, 0.0, 10.0, 10.0), rect(0, 5.0, 5.0, 15.0, 10.0)];
        let at = OverlapDetector::new(0.5).unwrap().detect(&items, &mut Silent);
        assert_eq!(at.len(), 1);
        let above = OverlapDetector::new(0.500001).unwrap().detect(&items, &mut Silent);
        assert!(above.is_empty());
    }

    #[test]
    fn zero_threshold_matches_disjoint_pairs() {
        let items = vec![rect(0, 0.0, 0.0, 10.0, 10.0), rect(0, 20.0, 20.0, 30.0, 30.0)];
        let pairs = OverlapDetector::new(0.0).unwrap().detect(&items, &mut Silent);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].ratio, 0.0);
        let pairs = OverlapDetector::new(0.01).unwrap().detect(&items, &mut Silent);
        assert!(pairs.is_empty());
    }

    #[test]
    fn invalid_rect_skipped_and_reported_once() {
        let items = vec![
            rect(0, 5.0, 5.0, 5.0, 5.0),
            rect(0, 0.0, 0.0, 10.0, 10.0),
            rect(0, 1.0, 1.0, 9.0, 9.0),
        ];
        let mut warnings: Vec<Warning> = Vec::new();
        let (pairs, invalid) = OverlapDetector::default().scan(&items, &mut warnings);
        assert_eq!(invalid, vec![0]);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].first, pairs[0].second), (1, 2));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::InvalidGeometry);
        assert_eq!(warnings[0].index, Some(0));
        assert_eq!(warnings[0].page, Some(0));
    }

    #[test]
    fn pairs_sorted_across_interleaved_pages() {
        let items = vec![
            rect(1, 0.0, 0.0, 10.0, 10.0),
            rect(0, 0.0, 0.0, 10.0, 10.0),
            rect(1, 0.0, 0.0, 10.0, 10.0),
            rect(0, 0.0, 0.0, 10.0, 10.0),
        ];
        let pairs = OverlapDetector::default().detect(&items, &mut Silent);
        let ids: Vec<(usize, usize)> = pairs.iter().map(|p| (p.first, p.second)).collect();
        assert_eq!(ids, vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn single_and_empty_pages_contribute_nothing() {
        let empty: Vec<(usize, BBox)> = Vec::new();
        assert!(OverlapDetector::default().detect(&empty, &mut Silent).is_empty());
        let single = vec![rect(4, 0.0, 0.0, 1.0, 1.0)];
        assert!(OverlapDetector::default().detect(&single, &mut Silent).is_empty());
    }

    #[test]
    fn every_pair_compared_once() {
        // Three identical boxes yield exactly the three unordered pairs.
        let items = vec![
            rect(0, 0.0, 0.0, 4.0, 4.0),
            rect(0, 0.0, 0.0, 4.0, 4.0),
            rect(0, 0.0, 0.0, 4.0, 4.0),
        ];
        let pairs = OverlapDetector::default().detect(&items, &mut Silent);
        let ids: Vec<(usize, usize)> = pairs.iter().map(|p| (p.first, p.second)).collect();
        assert_eq!(ids, vec![(0, 1), (0, 2), (1, 2)]);
    }
}
