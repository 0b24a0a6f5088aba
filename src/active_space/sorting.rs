//! Stable descending ranking of occupation numbers with permutation tracking.

use std::cmp::Ordering;

use num_traits::Inv;
use serde::{Deserialize, Serialize};

use crate::active_space::occupancy::OccupancyTable;
use crate::permutation::Permutation;

#[cfg(test)]
#[path = "sorting_tests.rs"]
mod sorting_tests;

/// An orbital paired with the index it had in the calculation-native order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedOrbital {
    /// The natural-orbital occupation number.
    pub occupation: f64,

    /// The position of this orbital in the calculation-native order.
    pub original_index: usize,
}

/// The orbitals of one symmetry block ranked by descending occupation number.
///
/// Orbitals with equal occupation numbers keep their original relative order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SortedOccupation {
    orbitals: Vec<RankedOrbital>,
}

impl SortedOccupation {
    /// The ranked orbitals, highest occupation first.
    pub fn orbitals(&self) -> &[RankedOrbital] {
        &self.orbitals
    }

    /// The number of orbitals in the block.
    pub fn len(&self) -> usize {
        self.orbitals.len()
    }

    /// Returns `true` if the block holds no orbitals.
    pub fn is_empty(&self) -> bool {
        self.orbitals.is_empty()
    }

    /// The occupation number at a sorted position.
    pub fn occupation(&self, sorted_index: usize) -> Option<f64> {
        self.orbitals.get(sorted_index).map(|orb| orb.occupation)
    }

    /// The sorted occupation numbers.
    pub fn values(&self) -> Vec<f64> {
        self.orbitals.iter().map(|orb| orb.occupation).collect()
    }

    /// The original index of the orbital at each sorted position.
    pub fn original_indices(&self) -> Vec<usize> {
        self.orbitals.iter().map(|orb| orb.original_index).collect()
    }

    /// The permutation mapping sorted positions to original positions.
    pub fn permutation(&self) -> Permutation {
        Permutation::from_image(&self.original_indices())
            .expect("Sorting always yields a bijection on orbital indices.")
    }

    /// The sorted position of each orbital, listed in calculation-native order. This is the
    /// inverse of [`Self::permutation`].
    pub fn sorted_positions(&self) -> Vec<usize> {
        self.permutation().inv().image().clone()
    }
}

/// Ranks the orbitals of a single symmetry block by descending occupation number.
pub fn sort_block(occupations: &[f64]) -> SortedOccupation {
    let mut orbitals = occupations
        .iter()
        .enumerate()
        .map(|(original_index, &occupation)| RankedOrbital {
            occupation,
            original_index,
        })
        .collect::<Vec<_>>();
    // `sort_by` is stable, so tied occupations retain their original relative order. Signed
    // zeros compare equal here; NaN is rejected when the table is built.
    orbitals.sort_by(|a, b| {
        b.occupation
            .partial_cmp(&a.occupation)
            .unwrap_or(Ordering::Equal)
    });
    SortedOccupation { orbitals }
}

/// Ranks the orbitals of every symmetry block in an occupancy table.
///
/// # Returns
///
/// One [`SortedOccupation`] per symmetry block, in symmetry order.
pub fn sort_occupations(table: &OccupancyTable) -> Vec<SortedOccupation> {
    table
        .occupations()
        .iter()
        .map(|block| sort_block(block))
        .collect()
}
