//! End-to-end behavior of the overlap filter on text blocks.

use textmap_core::*;

fn block(page: usize, x0: f64, top: f64, x1: f64, bottom: f64) -> TextBlock {
    TextBlock {
        text: format!("block {x0},{top}"),
        bbox: BBox::new(x0, top, x1, bottom),
        page_number: page,
        word_count: 2,
        page_width: 612.0,
        page_height: 792.0,
    }
}

fn filter(threshold: f64, policy: ResolutionPolicy) -> OverlapFilter {
    OverlapFilter::new(FilterOptions { threshold, policy }).unwrap()
}

/// A mixed page set: nested, identical, partial and cross-page rectangles.
fn mixed() -> Vec<TextBlock> {
    vec![
        block(0, 0.0, 0.0, 100.0, 50.0),
        block(0, 10.0, 10.0, 40.0, 30.0),
        block(1, 0.0, 0.0, 100.0, 50.0),
        block(0, 80.0, 0.0, 180.0, 50.0),
        block(1, 0.0, 0.0, 100.0, 50.0),
        block(0, 300.0, 300.0, 320.0, 320.0),
        block(2, 5.0, 5.0, 5.0, 5.0),
        block(0, 85.0, 5.0, 175.0, 45.0),
    ]
}

fn is_subsequence(sub: &[TextBlock], full: &[TextBlock]) -> bool {
    let mut it = full.iter();
    sub.iter().all(|s| it.any(|f| f == s))
}

#[test]
fn scenario_a_nested_pair_keeps_larger() {
    let items = vec![block(0, 0.0, 0.0, 10.0, 10.0), block(0, 2.0, 2.0, 5.0, 5.0)];
    let outcome = filter(0.5, ResolutionPolicy::KeepLargest).filter(items.clone());
    assert_eq!(outcome.report.overlap_pairs.len(), 1);
    assert!((outcome.report.overlap_pairs[0].ratio - 1.0).abs() < 1e-12);
    assert_eq!(outcome.survivors, vec![items[0].clone()]);
}

#[test]
fn scenario_b_disjoint_pair_survives() {
    let items = vec![block(0, 0.0, 0.0, 10.0, 10.0), block(0, 20.0, 20.0, 30.0, 30.0)];
    for threshold in [0.01, 0.5, 1.0] {
        for policy in ResolutionPolicy::ALL {
            let outcome = filter(threshold, policy).filter(items.clone());
            assert_eq!(outcome.survivors, items);
        }
    }
}

#[test]
fn scenario_c_keep_first_drops_duplicate() {
    let a = block(0, 0.0, 0.0, 10.0, 10.0);
    let b = block(0, 0.0, 0.0, 10.0, 10.0);
    let c = block(0, 50.0, 50.0, 60.0, 60.0);
    let outcome = filter(0.5, ResolutionPolicy::KeepFirst).filter(vec![a.clone(), b, c.clone()]);
    assert_eq!(outcome.report.removed, vec![1]);
    assert_eq!(outcome.survivors, vec![a, c]);
}

#[test]
fn scenario_d_invalid_block_is_skipped_not_fatal() {
    let invalid = block(0, 5.0, 5.0, 5.0, 5.0);
    let valid = block(0, 0.0, 0.0, 10.0, 10.0);
    let mut warnings: Vec<Warning> = Vec::new();
    let outcome = filter(0.5, ResolutionPolicy::KeepLargest)
        .filter_with(vec![invalid.clone(), valid.clone()], &mut warnings);
    assert_eq!(outcome.survivors, vec![invalid, valid]);
    assert_eq!(outcome.report.invalid, vec![0]);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, WarningCode::InvalidGeometry);
}

#[test]
fn filtering_is_idempotent() {
    for policy in ResolutionPolicy::ALL {
        let f = filter(0.5, policy);
        let once = f.filter(mixed()).survivors;
        let twice = f.filter(once.clone());
        assert!(twice.report.overlap_pairs.is_empty(), "{policy}");
        assert_eq!(twice.survivors, once);
    }
}

#[test]
fn output_is_ordered_subsequence() {
    for policy in ResolutionPolicy::ALL {
        for threshold in [0.0, 0.25, 0.5, 0.9, 1.0] {
            let input = mixed();
            let outcome = filter(threshold, policy).filter(input.clone());
            assert!(is_subsequence(&outcome.survivors, &input));
            assert_eq!(
                outcome.survivors.len(),
                outcome.report.survivor_count(),
                "{policy} at {threshold}"
            );
        }
    }
}

#[test]
fn pairs_never_cross_pages() {
    let input = mixed();
    let pairs = OverlapDetector::new(0.0).unwrap().detect(&input, &mut Silent);
    assert!(!pairs.is_empty());
    for pair in pairs {
        assert!(pair.first < pair.second);
        assert_eq!(input[pair.first].page_number, input[pair.second].page_number);
    }
}

#[test]
fn keep_largest_never_removes_strictly_larger_member() {
    let input = mixed();
    let outcome = filter(0.5, ResolutionPolicy::KeepLargest).filter(input.clone());
    for pair in &outcome.report.overlap_pairs {
        let a = input[pair.first].bbox.area();
        let b = input[pair.second].bbox.area();
        if a > b {
            assert!(!outcome.report.removed.contains(&pair.first));
        } else if b > a {
            assert!(!outcome.report.removed.contains(&pair.second));
        }
    }
}

#[test]
fn empty_input_for_every_policy() {
    for policy in ResolutionPolicy::ALL {
        let outcome = filter(0.5, policy).filter(Vec::<TextBlock>::new());
        assert!(outcome.survivors.is_empty());
        assert!(outcome.report.overlap_pairs.is_empty());
    }
}

#[test]
fn unknown_policy_fails_before_filtering() {
    let err = "largest".parse::<ResolutionPolicy>().unwrap_err();
    assert!(err.is_configuration());
    let err = OverlapFilter::new(FilterOptions {
        threshold: -0.1,
        policy: ResolutionPolicy::KeepFirst,
    })
    .unwrap_err();
    assert!(err.is_configuration());
}

#[cfg(feature = "serde")]
#[test]
fn report_serializes_policy_as_tag() {
    let outcome = filter(0.5, ResolutionPolicy::KeepFirst).filter(mixed());
    let json = serde_json::to_value(&outcome.report).unwrap();
    assert_eq!(json["policy"], "keep_first");
    assert_eq!(json["input_count"], 8);
    let policy: ResolutionPolicy = serde_json::from_str("\"keep_largest\"").unwrap();
    assert_eq!(policy, ResolutionPolicy::KeepLargest);
}
