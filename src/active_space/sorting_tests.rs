use proptest::prelude::*;

use crate::active_space::occupancy::OccupancyTable;
use crate::active_space::sorting::{sort_block, sort_occupations};

#[test]
fn test_sorting_descending_with_permutation() {
    let sorted = sort_block(&[0.02, 1.98, 0.8, 1.2]);
    assert_eq!(sorted.values(), vec![1.98, 1.2, 0.8, 0.02]);
    assert_eq!(sorted.original_indices(), vec![1, 3, 2, 0]);
    assert_eq!(sorted.permutation().image(), &vec![1, 3, 2, 0]);
    assert_eq!(sorted.occupation(2), Some(0.8));
    assert_eq!(sorted.occupation(4), None);
}

#[test]
fn test_sorting_already_descending_is_identity() {
    let occupations = [1.98, 1.2, 0.8, 0.02];
    let sorted = sort_block(&occupations);
    assert_eq!(sorted.values(), occupations.to_vec());
    assert!(sorted.permutation().is_identity());
}

#[test]
fn test_sorting_is_stable_for_ties() {
    let sorted = sort_block(&[1.0, 1.5, 1.0, 1.5, 1.0]);
    assert_eq!(sorted.values(), vec![1.5, 1.5, 1.0, 1.0, 1.0]);
    assert_eq!(sorted.original_indices(), vec![1, 3, 0, 2, 4]);
}

#[test]
fn test_sorting_signed_zeros_are_ties() {
    let sorted = sort_block(&[-0.0, 0.0]);
    assert_eq!(sorted.original_indices(), vec![0, 1]);
    assert!(sorted.permutation().is_identity());

    let sorted = sort_block(&[0.0, 1.2, -0.0, 0.0]);
    assert_eq!(sorted.original_indices(), vec![1, 0, 2, 3]);
}

#[test]
fn test_sorting_sorted_positions() {
    let sorted = sort_block(&[0.02, 1.98, 0.8, 1.2]);
    assert_eq!(sorted.original_indices(), vec![1, 3, 2, 0]);
    assert_eq!(sorted.sorted_positions(), vec![3, 0, 2, 1]);
}

#[test]
fn test_sorting_empty_block() {
    let sorted = sort_block(&[]);
    assert!(sorted.is_empty());
    assert_eq!(sorted.len(), 0);
    assert!(sorted.permutation().is_identity());
}

#[test]
fn test_sorting_every_symmetry() {
    let table = OccupancyTable::builder()
        .total_electrons(4)
        .total_nuclear_charge(4)
        .occupations(&[vec![0.1, 1.9], vec![], vec![1.0]])
        .build()
        .unwrap();
    let sorted = sort_occupations(&table);
    assert_eq!(sorted.len(), 3);
    assert_eq!(sorted[0].original_indices(), vec![1, 0]);
    assert!(sorted[1].is_empty());
    assert_eq!(sorted[2].values(), vec![1.0]);
}

proptest! {
    #[test]
    fn test_sorting_permutation_is_bijection(
        occupations in prop::collection::vec(0.0f64..=2.0, 0..40)
    ) {
        let sorted = sort_block(&occupations);
        let mut indices = sorted.original_indices();
        indices.sort_unstable();
        prop_assert_eq!(indices, (0..occupations.len()).collect::<Vec<_>>());
        prop_assert!(sorted
            .original_indices()
            .iter()
            .zip(sorted.values())
            .all(|(&j, occ)| occupations[j] == occ));
        let positions = sorted.sorted_positions();
        prop_assert!(sorted
            .original_indices()
            .iter()
            .enumerate()
            .all(|(i, &j)| positions[j] == i));
        prop_assert!(sorted.values().windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sorting_is_idempotent(
        occupations in prop::collection::vec(0.0f64..=2.0, 0..40)
    ) {
        let once = sort_block(&occupations).values();
        let twice = sort_block(&once);
        prop_assert!(twice.permutation().is_identity());
        prop_assert_eq!(twice.values(), once);
    }
}
