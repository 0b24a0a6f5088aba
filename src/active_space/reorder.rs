//! Detection of orbital swaps needed to bring chemically significant orbitals into the order
//! used for active-space selection.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::active_space::sorting::SortedOccupation;
use crate::active_space::{check_threshold, ActiveSpaceError, SymmetryIndex, MAX_OCCUPATION};

#[cfg(test)]
#[path = "reorder_tests.rs"]
mod reorder_tests;

/// The default neglect threshold below which an orbital is considered pinned at an occupation of
/// zero or two.
pub const DEFAULT_NEGLECT_THRESHOLD: f64 = 1.0e-3;

/// A single orbital swap, with zero-based indices within one symmetry block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrbitalSwap {
    /// The position of the orbital in occupation-sorted order.
    pub sorted_index: usize,

    /// The position of the orbital in calculation-native order.
    pub original_index: usize,
}

impl fmt::Display for OrbitalSwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sorted_index + 1, self.original_index + 1)
    }
}

/// A structure containing, for every symmetry block, the orbital swaps required before the
/// selected active space can be used by the external program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderInstructions {
    swaps: Vec<Vec<OrbitalSwap>>,
}

impl ReorderInstructions {
    /// The swaps of every symmetry block, in symmetry order.
    pub fn swaps(&self) -> &[Vec<OrbitalSwap>] {
        &self.swaps
    }

    /// The swaps of one symmetry block.
    pub fn for_symmetry(&self, sym: SymmetryIndex) -> Option<&[OrbitalSwap]> {
        self.swaps.get(sym).map(|swaps| swaps.as_slice())
    }

    /// The number of swaps in each symmetry block.
    pub fn counts(&self) -> Vec<usize> {
        self.swaps.iter().map(|swaps| swaps.len()).collect()
    }

    /// All swaps, concatenated in symmetry order.
    pub fn flattened(&self) -> Vec<OrbitalSwap> {
        self.swaps.iter().flatten().copied().collect()
    }

    /// Returns `true` if any symmetry block requires at least one swap.
    pub fn is_needed(&self) -> bool {
        self.swaps.iter().any(|swaps| !swaps.is_empty())
    }
}

impl fmt::Display for ReorderInstructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_needed() {
            return writeln!(f, "No orbital reordering required.");
        }
        writeln!(f, "Orbital swaps (sorted position ↔ original position, one-based):")?;
        for (isym, swaps) in self.swaps.iter().enumerate() {
            if swaps.is_empty() {
                continue;
            }
            writeln!(
                f,
                "  Sym {:>2}: {}",
                isym + 1,
                swaps.iter().map(|swap| format!("({swap})")).join(" ")
            )?;
        }
        Ok(())
    }
}

/// Returns `true` if the occupation lies more than `neglect` away from both zero and two.
fn is_fractional(occ: f64, neglect: f64) -> bool {
    occ > neglect && occ < MAX_OCCUPATION - neglect
}

/// Detects the orbital swaps implied by the occupation ranking.
///
/// For each sorted position $`i`$ whose orbital originally sat at $`j \ne i`$, a swap is
/// reported only when at least one of the occupations at sorted positions $`i`$ and $`j`$ is
/// fractional, *i.e.* lies more than `neglect_threshold` away from both zero and two.
/// Displacements amongst orbitals pinned at either extreme are thereby suppressed.
///
/// The partner of sorted position $`i`$ is the original position of the orbital now at $`i`$,
/// *i.e.* the image of [`SortedOccupation::permutation`], and not the sorted position that
/// orbital $`i`$ moved to ([`SortedOccupation::sorted_positions`], the inverse). The two agree
/// for transpositions but differ for cycles of three or more orbitals.
///
/// # Arguments
///
/// * `sorted` - The ranked occupations of every symmetry block.
/// * `neglect_threshold` - The neglect threshold, which must lie in $`(0, 1)`$.
///
/// # Errors
///
/// Errors with [`ActiveSpaceError::InvalidThreshold`] if `neglect_threshold` is out of range.
pub fn detect_reorder(
    sorted: &[SortedOccupation],
    neglect_threshold: f64,
) -> Result<ReorderInstructions, ActiveSpaceError> {
    check_threshold("neglect threshold", neglect_threshold, 0.0, 1.0)?;
    let swaps = sorted
        .iter()
        .map(|block| {
            let values = block.values();
            block
                .original_indices()
                .into_iter()
                .enumerate()
                .filter(|&(i, j)| {
                    i != j
                        && (is_fractional(values[i], neglect_threshold)
                            || is_fractional(values[j], neglect_threshold))
                })
                .map(|(sorted_index, original_index)| OrbitalSwap {
                    sorted_index,
                    original_index,
                })
                .collect_vec()
        })
        .collect_vec();
    Ok(ReorderInstructions { swaps })
}
