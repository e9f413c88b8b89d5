//! Overlap filtering: detect, resolve, and drop redundant rectangles.

use crate::block::PageRect;
use crate::diagnostics::{Diagnostics, Silent};
use crate::error::TextmapError;
use crate::overlap::{OverlapDetector, OverlapPair};
use crate::resolve::ResolutionPolicy;

/// Options for overlap filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterOptions {
    /// Minimum coverage ratio for a pair to count as overlapping (inclusive).
    pub threshold: f64,
    /// Which member of an overlapping pair is removed.
    pub policy: ResolutionPolicy,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            threshold: OverlapDetector::DEFAULT_THRESHOLD,
            policy: ResolutionPolicy::default(),
        }
    }
}

impl FilterOptions {
    /// Check the options without building a filter.
    pub fn validate(&self) -> Result<(), TextmapError> {
        OverlapDetector::new(self.threshold).map(|_| ())
    }
}

/// What a filter pass did.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterReport {
    pub policy: ResolutionPolicy,
    pub threshold: f64,
    /// Number of rectangles handed to the filter.
    pub input_count: usize,
    /// Detected pairs, sorted by `(first, second)`.
    pub overlap_pairs: Vec<OverlapPair>,
    /// Input indices that were removed, ascending.
    pub removed: Vec<usize>,
    /// Input indices skipped for invalid geometry. These are kept.
    pub invalid: Vec<usize>,
}

impl FilterReport {
    fn empty(options: &FilterOptions) -> Self {
        Self {
            policy: options.policy,
            threshold: options.threshold,
            input_count: 0,
            overlap_pairs: Vec::new(),
            removed: Vec::new(),
            invalid: Vec::new(),
        }
    }

    /// Number of rectangles left after the pass.
    pub fn survivor_count(&self) -> usize {
        self.input_count - self.removed.len()
    }
}

/// Survivors of a filter pass plus its report.
#[derive(Debug, Clone)]
pub struct FilterOutcome<T> {
    /// Input minus removed rectangles, in original relative order.
    pub survivors: Vec<T>,
    pub report: FilterReport,
}

/// Removes redundant overlapping rectangles from a sequence.
///
/// ```
/// use textmap_core::{BBox, FilterOptions, OverlapFilter};
///
/// let filter = OverlapFilter::new(FilterOptions::default()).unwrap();
/// let items = vec![
///     (0usize, BBox::new(0.0, 0.0, 10.0, 10.0)),
///     (0usize, BBox::new(2.0, 2.0, 5.0, 5.0)),
/// ];
/// let outcome = filter.filter(items);
/// assert_eq!(outcome.survivors.len(), 1);
/// assert_eq!(outcome.report.removed, vec![1]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OverlapFilter {
    options: FilterOptions,
    detector: OverlapDetector,
}

impl OverlapFilter {
    /// Build a filter, rejecting an out-of-range threshold before any work.
    pub fn new(options: FilterOptions) -> Result<Self, TextmapError> {
        let detector = OverlapDetector::new(options.threshold)?;
        Ok(Self { options, detector })
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Filter without reporting anything.
    pub fn filter<T: PageRect>(&self, items: Vec<T>) -> FilterOutcome<T> {
        self.filter_with(items, &mut Silent)
    }

    /// Filter, sending warnings and progress messages to `diagnostics`.
    pub fn filter_with<T: PageRect>(
        &self,
        items: Vec<T>,
        diagnostics: &mut dyn Diagnostics,
    ) -> FilterOutcome<T> {
        let mut report = FilterReport::empty(&self.options);
        if items.is_empty() {
            return FilterOutcome {
                survivors: items,
                report,
            };
        }
        report.input_count = items.len();

        let (pairs, invalid) = self.detector.scan(&items, diagnostics);
        report.invalid = invalid;

        if pairs.is_empty() {
            diagnostics.info("No overlaps detected, returning original blocks");
            return FilterOutcome {
                survivors: items,
                report,
            };
        }

        let removed = self.options.policy.resolve(&items, &pairs);
        let survivors: Vec<T> = items
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| !removed.contains(idx))
            .map(|(_, item)| item)
            .collect();

        diagnostics.info(&format!(
            "Filtered {} overlapping blocks (strategy: {}). Remaining: {} blocks",
            removed.len(),
            self.options.policy,
            survivors.len()
        ));

        report.overlap_pairs = pairs;
        report.removed = removed.into_iter().collect();
        FilterOutcome { survivors, report }
    }
}
