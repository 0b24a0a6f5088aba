//! Threshold-based classification of ranked orbitals into frozen and active tiers.
//!
//! Because the orbitals of each block are ranked by descending occupation, every tier is a
//! contiguous run of sorted positions. The tier boundaries are therefore found by binary search
//! over the sorted occupations rather than by testing orbitals one at a time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::active_space::sorting::{RankedOrbital, SortedOccupation};
use crate::active_space::{
    check_threshold, ActiveSpaceError, ActiveSpaceKind, DegeneratePartition, MAX_OCCUPATION,
};

#[cfg(test)]
#[path = "partition_tests.rs"]
mod partition_tests;

// ================
// Enum definitions
// ================

/// The per-symmetry orbital counts of the active tiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveTiers {
    /// A single complete-active-space tier.
    Cas {
        /// Number of CAS orbitals in each symmetry.
        cas: Vec<usize>,
    },

    /// Three restricted-active-space tiers.
    Ras {
        /// Number of RAS1 orbitals in each symmetry.
        ras1: Vec<usize>,

        /// Number of RAS2 orbitals in each symmetry, as supplied by the caller.
        ras2: Vec<usize>,

        /// Number of RAS3 orbitals in each symmetry.
        ras3: Vec<usize>,

        /// Number of orbitals in each symmetry whose occupation lies inside the active window
        /// between RAS1 and RAS3. These are the natural candidates for RAS2, but RAS2 is never
        /// assigned automatically.
        ras2_window: Vec<usize>,
    },
}

// ==================
// Struct definitions
// ==================

/// A structure containing the partitioning of every symmetry block into frozen-occupied
/// (inactive), active, and frozen-virtual (secondary) orbitals.
///
/// For every symmetry, `inactive + active + secondary` equals the number of orbitals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Number of orbitals in each symmetry.
    orbitals: Vec<usize>,

    /// Number of frozen doubly-occupied orbitals in each symmetry.
    inactive: Vec<usize>,

    /// The active tiers.
    tiers: ActiveTiers,

    /// Number of frozen virtual orbitals in each symmetry.
    secondary: Vec<usize>,
}

impl Partition {
    /// The partitioning mode.
    pub fn kind(&self) -> ActiveSpaceKind {
        match self.tiers {
            ActiveTiers::Cas { .. } => ActiveSpaceKind::Cas,
            ActiveTiers::Ras { .. } => ActiveSpaceKind::Ras,
        }
    }

    /// The number of symmetry blocks.
    pub fn n_symmetries(&self) -> usize {
        self.orbitals.len()
    }

    /// Number of orbitals in each symmetry.
    pub fn orbitals(&self) -> &[usize] {
        &self.orbitals
    }

    /// Number of frozen doubly-occupied orbitals in each symmetry.
    pub fn inactive(&self) -> &[usize] {
        &self.inactive
    }

    /// Number of frozen virtual orbitals in each symmetry.
    pub fn secondary(&self) -> &[usize] {
        &self.secondary
    }

    /// The active tiers.
    pub fn tiers(&self) -> &ActiveTiers {
        &self.tiers
    }

    /// Number of CAS orbitals in each symmetry, if this is a CAS partition.
    pub fn cas(&self) -> Option<&[usize]> {
        match &self.tiers {
            ActiveTiers::Cas { cas } => Some(cas.as_slice()),
            ActiveTiers::Ras { .. } => None,
        }
    }

    /// Number of RAS1 orbitals in each symmetry, if this is a RAS partition.
    pub fn ras1(&self) -> Option<&[usize]> {
        match &self.tiers {
            ActiveTiers::Ras { ras1, .. } => Some(ras1.as_slice()),
            ActiveTiers::Cas { .. } => None,
        }
    }

    /// Number of RAS2 orbitals in each symmetry, if this is a RAS partition.
    pub fn ras2(&self) -> Option<&[usize]> {
        match &self.tiers {
            ActiveTiers::Ras { ras2, .. } => Some(ras2.as_slice()),
            ActiveTiers::Cas { .. } => None,
        }
    }

    /// Number of RAS3 orbitals in each symmetry, if this is a RAS partition.
    pub fn ras3(&self) -> Option<&[usize]> {
        match &self.tiers {
            ActiveTiers::Ras { ras3, .. } => Some(ras3.as_slice()),
            ActiveTiers::Cas { .. } => None,
        }
    }

    /// Number of orbitals in each symmetry inside the window between RAS1 and RAS3, if this is a
    /// RAS partition.
    pub fn ras2_window(&self) -> Option<&[usize]> {
        match &self.tiers {
            ActiveTiers::Ras { ras2_window, .. } => Some(ras2_window.as_slice()),
            ActiveTiers::Cas { .. } => None,
        }
    }

    /// Number of active orbitals (summed over tiers) in each symmetry.
    pub fn active(&self) -> Vec<usize> {
        match &self.tiers {
            ActiveTiers::Cas { cas } => cas.clone(),
            ActiveTiers::Ras {
                ras1, ras2, ras3, ..
            } => ras1
                .iter()
                .zip(ras2.iter())
                .zip(ras3.iter())
                .map(|((r1, r2), r3)| r1 + r2 + r3)
                .collect(),
        }
    }

    /// Total number of active orbitals across all symmetries.
    pub fn n_active(&self) -> usize {
        self.active().iter().sum()
    }

    /// Total number of frozen doubly-occupied orbitals across all symmetries.
    pub fn n_inactive(&self) -> usize {
        self.inactive.iter().sum()
    }

    /// Checks that, for every symmetry, the frozen and active counts add up to the number of
    /// orbitals.
    pub fn is_complete(&self) -> bool {
        self.active()
            .iter()
            .zip(self.inactive.iter())
            .zip(self.secondary.iter())
            .zip(self.orbitals.iter())
            .all(|(((a, i), s), n)| a + i + s == *n)
    }

    /// Reports an active tier that is empty across all symmetries although the partitioning
    /// mode expects it to be populated.
    pub fn degeneracy(&self) -> Option<DegeneratePartition> {
        let empty_tiers = match &self.tiers {
            ActiveTiers::Cas { cas } => {
                if cas.iter().sum::<usize>() == 0 {
                    vec!["CAS".to_string()]
                } else {
                    vec![]
                }
            }
            ActiveTiers::Ras { ras1, ras2, .. } => {
                if ras1.iter().sum::<usize>() == 0 && ras2.iter().sum::<usize>() == 0 {
                    vec!["RAS1".to_string(), "RAS2".to_string()]
                } else {
                    vec![]
                }
            }
        };
        if empty_tiers.is_empty() {
            None
        } else {
            Some(DegeneratePartition {
                kind: self.kind(),
                empty_tiers,
            })
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (headers, columns): (Vec<&str>, Vec<&[usize]>) = match &self.tiers {
            ActiveTiers::Cas { cas } => (vec!["CAS"], vec![cas.as_slice()]),
            ActiveTiers::Ras {
                ras1,
                ras2,
                ras3,
                ras2_window,
            } => (
                vec!["RAS1", "RAS2", "RAS3", "(window)"],
                vec![
                    ras1.as_slice(),
                    ras2.as_slice(),
                    ras3.as_slice(),
                    ras2_window.as_slice(),
                ],
            ),
        };
        let width = 30 + 10 * headers.len() + 10;
        writeln!(f, "{}", "┈".repeat(width))?;
        write!(f, "{:>8} {:>10} {:>10}", "Sym", "Orbitals", "Inactive")?;
        for header in headers.iter() {
            write!(f, " {header:>9}")?;
        }
        writeln!(f, " {:>10}", "Secondary")?;
        writeln!(f, "{}", "┈".repeat(width))?;
        for isym in 0..self.n_symmetries() {
            write!(
                f,
                "{:>8} {:>10} {:>10}",
                isym + 1,
                self.orbitals[isym],
                self.inactive[isym]
            )?;
            for column in columns.iter() {
                write!(f, " {:>9}", column[isym])?;
            }
            writeln!(f, " {:>10}", self.secondary[isym])?;
        }
        writeln!(f, "{}", "┈".repeat(width))?;
        write!(
            f,
            "{:>8} {:>10} {:>10}",
            "Total",
            self.orbitals.iter().sum::<usize>(),
            self.n_inactive()
        )?;
        for column in columns.iter() {
            write!(f, " {:>9}", column.iter().sum::<usize>())?;
        }
        writeln!(f, " {:>10}", self.secondary.iter().sum::<usize>())?;
        writeln!(f, "{}", "┈".repeat(width))?;
        Ok(())
    }
}

// =========
// Functions
// =========

/// Number of leading orbitals whose occupation is at least `cut`.
fn count_at_least(orbitals: &[RankedOrbital], cut: f64) -> usize {
    orbitals.partition_point(|orb| orb.occupation >= cut)
}

/// Number of leading orbitals whose occupation exceeds `cut`.
fn count_above(orbitals: &[RankedOrbital], cut: f64) -> usize {
    orbitals.partition_point(|orb| orb.occupation > cut)
}

/// Partitions every symmetry block into frozen-occupied, CAS, and frozen-virtual orbitals.
///
/// An orbital is active if its occupation lies in the open window $`(t, 2 - t)`$. Leading
/// orbitals with occupation at least $`2 - t`$ are frozen doubly-occupied and trailing orbitals
/// with occupation at most $`t`$ are frozen virtual.
///
/// # Arguments
///
/// * `threshold` - The active-space threshold $`t`$, which must lie in $`(0, 1)`$.
/// * `sorted` - The ranked occupations of every symmetry block.
///
/// # Errors
///
/// Errors with [`ActiveSpaceError::InvalidThreshold`] if `threshold` is outside $`(0, 1)`$.
pub fn pick_cas(threshold: f64, sorted: &[SortedOccupation]) -> Result<Partition, ActiveSpaceError> {
    check_threshold("active-space threshold", threshold, 0.0, 1.0)?;

    let mut orbitals = Vec::with_capacity(sorted.len());
    let mut inactive = Vec::with_capacity(sorted.len());
    let mut cas = Vec::with_capacity(sorted.len());
    let mut secondary = Vec::with_capacity(sorted.len());
    for block in sorted {
        let orbs = block.orbitals();
        let head = count_at_least(orbs, MAX_OCCUPATION - threshold);
        // If the window is empty, the two cuts may cross; nothing is then active.
        let tail = count_above(orbs, threshold).max(head);
        orbitals.push(orbs.len());
        inactive.push(head);
        cas.push(tail - head);
        secondary.push(orbs.len() - tail);
    }

    Ok(Partition {
        orbitals,
        inactive,
        tiers: ActiveTiers::Cas { cas },
        secondary,
    })
}

/// Partitions every symmetry block into frozen-occupied, RAS1, RAS2, RAS3, and frozen-virtual
/// orbitals.
///
/// With active threshold $`t`$ and frozen threshold $`f < t`$:
/// - frozen doubly-occupied: occupation $`\ge 2 - f`$;
/// - RAS1: $`2 - t \le`$ occupation $`< 2 - f`$;
/// - RAS3: $`f <`$ occupation $`\le t`$;
/// - frozen virtual: everything after RAS3.
///
/// RAS2 is placed between RAS1 and RAS3 using the caller-supplied counts; orbitals of the
/// window $`(t, 2 - t)`$ not claimed by RAS2 fall through to the frozen virtual space.
///
/// # Arguments
///
/// * `threshold` - The active-space threshold $`t`$, which must lie in $`(0, 1)`$.
/// * `frozen_threshold` - The frozen threshold $`f`$, which must lie in $`(0, t)`$.
/// * `ras2` - The number of RAS2 orbitals in each symmetry.
/// * `sorted` - The ranked occupations of every symmetry block.
///
/// # Errors
///
/// Errors if either threshold is out of range, if `ras2` does not have one entry per symmetry,
/// or if the requested tiers do not fit into a symmetry block.
pub fn pick_ras(
    threshold: f64,
    frozen_threshold: f64,
    ras2: &[usize],
    sorted: &[SortedOccupation],
) -> Result<Partition, ActiveSpaceError> {
    check_threshold("active-space threshold", threshold, 0.0, 1.0)?;
    check_threshold("frozen threshold", frozen_threshold, 0.0, threshold)?;
    if ras2.len() != sorted.len() {
        return Err(ActiveSpaceError::InvalidRas2 {
            n_symmetries: sorted.len(),
            n_supplied: ras2.len(),
        });
    }

    let mut orbitals = Vec::with_capacity(sorted.len());
    let mut inactive = Vec::with_capacity(sorted.len());
    let mut ras1 = Vec::with_capacity(sorted.len());
    let mut ras3 = Vec::with_capacity(sorted.len());
    let mut ras2_window = Vec::with_capacity(sorted.len());
    let mut secondary = Vec::with_capacity(sorted.len());
    for (isym, (block, &n_ras2)) in sorted.iter().zip(ras2.iter()).enumerate() {
        let orbs = block.orbitals();
        let n_inactive = count_at_least(orbs, MAX_OCCUPATION - frozen_threshold);
        let ras1_end = count_at_least(orbs, MAX_OCCUPATION - threshold).max(n_inactive);
        let window_end = count_above(orbs, threshold).max(ras1_end);
        let ras3_end = count_above(orbs, frozen_threshold).max(window_end);

        let n_ras1 = ras1_end - n_inactive;
        let n_ras3 = ras3_end - window_end;
        let requested = n_inactive + n_ras1 + n_ras2 + n_ras3;
        let n_secondary = orbs.len().checked_sub(requested).ok_or(
            ActiveSpaceError::PartitionOverflow {
                symmetry: isym,
                requested,
                available: orbs.len(),
            },
        )?;

        orbitals.push(orbs.len());
        inactive.push(n_inactive);
        ras1.push(n_ras1);
        ras3.push(n_ras3);
        ras2_window.push(window_end - ras1_end);
        secondary.push(n_secondary);
    }

    Ok(Partition {
        orbitals,
        inactive,
        tiers: ActiveTiers::Ras {
            ras1,
            ras2: ras2.to_vec(),
            ras3,
            ras2_window,
        },
        secondary,
    })
}
