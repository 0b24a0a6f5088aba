use crate::active_space::reorder::{detect_reorder, OrbitalSwap, DEFAULT_NEGLECT_THRESHOLD};
use crate::active_space::sorting::{sort_block, SortedOccupation};
use crate::active_space::ActiveSpaceError;

fn sorted_blocks(blocks: &[&[f64]]) -> Vec<SortedOccupation> {
    blocks.iter().map(|block| sort_block(block)).collect()
}

#[test]
fn test_reorder_pinned_swap_is_suppressed() {
    let sorted = sorted_blocks(&[&[0.0001, 1.9999]]);
    assert_eq!(sorted[0].original_indices(), vec![1, 0]);
    let reorder = detect_reorder(&sorted, DEFAULT_NEGLECT_THRESHOLD).unwrap();
    assert!(!reorder.is_needed());
    assert_eq!(reorder.counts(), vec![0]);
    assert!(reorder.flattened().is_empty());
}

#[test]
fn test_reorder_fractional_swap_is_reported() {
    let sorted = sorted_blocks(&[&[0.5, 1.5]]);
    let reorder = detect_reorder(&sorted, DEFAULT_NEGLECT_THRESHOLD).unwrap();
    assert!(reorder.is_needed());
    assert_eq!(
        reorder.for_symmetry(0).unwrap(),
        &[
            OrbitalSwap {
                sorted_index: 0,
                original_index: 1
            },
            OrbitalSwap {
                sorted_index: 1,
                original_index: 0
            },
        ]
    );
    assert_eq!(reorder.for_symmetry(0).unwrap()[0].to_string(), "1 2");
}

#[test]
fn test_reorder_counts_and_flattening() {
    let sorted = sorted_blocks(&[&[1.9999, 0.3, 1.2], &[2.0, 0.0], &[], &[0.2, 1.1]]);
    let reorder = detect_reorder(&sorted, DEFAULT_NEGLECT_THRESHOLD).unwrap();
    assert_eq!(reorder.counts(), vec![2, 0, 0, 2]);
    assert_eq!(reorder.swaps().len(), 4);
    assert!(reorder.for_symmetry(4).is_none());

    let flattened = reorder
        .flattened()
        .iter()
        .map(|swap| swap.to_string())
        .collect::<Vec<_>>();
    assert_eq!(flattened, vec!["2 3", "3 2", "1 2", "2 1"]);

    let display = reorder.to_string();
    assert!(display.contains("Sym  1: (2 3) (3 2)"));
    assert!(!display.contains("Sym  2"));
    assert!(display.contains("Sym  4: (1 2) (2 1)"));
}

#[test]
fn test_reorder_ties_need_no_swap() {
    let sorted = sorted_blocks(&[&[1.0, 1.0, 1.0]]);
    let reorder = detect_reorder(&sorted, DEFAULT_NEGLECT_THRESHOLD).unwrap();
    assert!(!reorder.is_needed());
    assert_eq!(reorder.to_string(), "No orbital reordering required.\n");
}

#[test]
fn test_reorder_neglect_threshold_controls_suppression() {
    let sorted = sorted_blocks(&[&[0.0005, 0.0008]]);
    assert!(!detect_reorder(&sorted, 1e-3).unwrap().is_needed());
    assert_eq!(detect_reorder(&sorted, 1e-4).unwrap().counts(), vec![2]);
}

#[test]
fn test_reorder_rejects_invalid_neglect_threshold() {
    let sorted = sorted_blocks(&[&[0.5, 1.5]]);
    for neglect in [0.0, 1.0, -1e-3] {
        assert!(matches!(
            detect_reorder(&sorted, neglect),
            Err(ActiveSpaceError::InvalidThreshold {
                name: "neglect threshold",
                ..
            })
        ));
    }
}

#[test]
fn test_reorder_three_cycle_pairs_follow_original_positions() {
    let sorted = sorted_blocks(&[&[0.5, 1.5, 1.0]]);
    assert_eq!(sorted[0].original_indices(), vec![1, 2, 0]);
    assert_eq!(sorted[0].sorted_positions(), vec![2, 0, 1]);
    let reorder = detect_reorder(&sorted, DEFAULT_NEGLECT_THRESHOLD).unwrap();
    let pairs = reorder
        .flattened()
        .iter()
        .map(|swap| swap.to_string())
        .collect::<Vec<_>>();
    assert_eq!(pairs, vec!["1 2", "2 3", "3 1"]);
}
