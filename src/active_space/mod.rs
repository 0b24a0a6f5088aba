//! Occupation-number ranking and active-space partitioning.
//!
//! The flow through this module is
//! [`OccupancyTable`](occupancy::OccupancyTable) → [`sort_occupations`](sorting::sort_occupations)
//! → [`pick_cas`](partition::pick_cas) / [`pick_ras`](partition::pick_ras) →
//! ([`detect_reorder`](reorder::detect_reorder), [`reconcile`](electrons::reconcile)).
//! Every stage is a pure function of its inputs and an immutable configuration value, so that
//! independent thresholds can be evaluated concurrently.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod electrons;
pub mod occupancy;
pub mod partition;
pub mod reorder;
pub mod sorting;

/// Index of a symmetry block (irreducible representation), running from zero.
pub type SymmetryIndex = usize;

/// The lowest occupation number an orbital can take.
pub const MIN_OCCUPATION: f64 = 0.0;

/// The highest occupation number a spatial orbital can take.
pub const MAX_OCCUPATION: f64 = 2.0;

// ================
// Enum definitions
// ================

/// An enumerated type for the two mutually exclusive ways of partitioning an active space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveSpaceKind {
    /// Complete active space: a single active tier.
    Cas,

    /// Restricted active space: three active tiers RAS1, RAS2, and RAS3.
    Ras,
}

impl Default for ActiveSpaceKind {
    fn default() -> Self {
        ActiveSpaceKind::Cas
    }
}

impl fmt::Display for ActiveSpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Cas => write!(f, "CAS"),
            Self::Ras => write!(f, "RAS"),
        }
    }
}

// ======
// Errors
// ======

/// An enumerated type for the kinds of electron-count inconsistencies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElectronMismatch {
    /// The active-electron count does not equal the total electron count minus the electrons in
    /// frozen-occupied orbitals.
    Inconsistent {
        /// The active-electron count implied by the frozen-occupied orbitals.
        expected: i64,

        /// The active-electron count obtained from the active-space tiers.
        actual: i64,
    },

    /// The frozen doubly-occupied orbitals hold more electrons than the calculation has.
    ExcessInactive {
        /// The number of electrons in frozen doubly-occupied orbitals.
        inactive: i64,

        /// The total number of electrons.
        total: u32,
    },

    /// The active-electron count is odd.
    OddActive(i64),

    /// The total electron count is odd.
    OddTotal(u32),
}

impl fmt::Display for ElectronMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Inconsistent { expected, actual } => write!(
                f,
                "the number of active electrons ({actual}) does not match the active/inactive space (expected {expected})"
            ),
            Self::ExcessInactive { inactive, total } => write!(
                f,
                "the frozen doubly-occupied orbitals hold {inactive} electrons, more than the {total} electrons available"
            ),
            Self::OddActive(n) => write!(f, "the number of active electrons ({n}) is uneven"),
            Self::OddTotal(n) => write!(f, "the number of total electrons ({n}) is uneven"),
        }
    }
}

/// An enumerated type for errors arising during active-space selection.
#[derive(Clone, Debug, PartialEq)]
pub enum ActiveSpaceError {
    /// A threshold lies outside its permitted open interval.
    InvalidThreshold {
        /// The name of the offending threshold.
        name: &'static str,

        /// The offending value.
        value: f64,

        /// The exclusive lower bound.
        lower: f64,

        /// The exclusive upper bound.
        upper: f64,
    },

    /// The RAS2 orbital counts do not match the number of symmetry blocks.
    InvalidRas2 {
        /// The number of symmetry blocks in the occupancy table.
        n_symmetries: usize,

        /// The number of RAS2 entries supplied.
        n_supplied: usize,
    },

    /// The requested active tiers do not fit into a symmetry block.
    PartitionOverflow {
        /// The symmetry block concerned.
        symmetry: SymmetryIndex,

        /// The number of orbitals requested across frozen-occupied and active tiers.
        requested: usize,

        /// The number of orbitals in the block.
        available: usize,
    },

    /// The active-electron count fails the parity or consistency checks.
    ElectronMismatch(ElectronMismatch),
}

impl fmt::Display for ActiveSpaceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidThreshold {
                name,
                value,
                lower,
                upper,
            } => write!(
                f,
                "Active-space error: {name} {value:.3e} lies outside the open interval ({lower:.3e}, {upper:.3e})."
            ),
            Self::InvalidRas2 {
                n_symmetries,
                n_supplied,
            } => write!(
                f,
                "Active-space error: {n_supplied} RAS2 orbital counts supplied for {n_symmetries} symmetry blocks."
            ),
            Self::PartitionOverflow {
                symmetry,
                requested,
                available,
            } => write!(
                f,
                "Active-space error: {requested} orbitals requested in symmetry {}, but only {available} are available.",
                symmetry + 1
            ),
            Self::ElectronMismatch(mismatch) => {
                write!(f, "Active-space error: {mismatch}.")
            }
        }
    }
}

impl Error for ActiveSpaceError {}

impl From<ElectronMismatch> for ActiveSpaceError {
    fn from(mismatch: ElectronMismatch) -> Self {
        ActiveSpaceError::ElectronMismatch(mismatch)
    }
}

/// Checks that a threshold lies strictly inside `(lower, upper)`.
pub(crate) fn check_threshold(
    name: &'static str,
    value: f64,
    lower: f64,
    upper: f64,
) -> Result<(), ActiveSpaceError> {
    if value > lower && value < upper {
        Ok(())
    } else {
        Err(ActiveSpaceError::InvalidThreshold {
            name,
            value,
            lower,
            upper,
        })
    }
}

// ========
// Warnings
// ========

/// A structure describing an active space with a tier that is empty although the partitioning
/// mode expects it to be populated. This is numerically valid and therefore never fatal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegeneratePartition {
    /// The partitioning mode concerned.
    pub kind: ActiveSpaceKind,

    /// The names of the empty tiers.
    pub empty_tiers: Vec<String>,
}

impl fmt::Display for DegeneratePartition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Degenerate {} partition: {} empty across all symmetries.",
            self.kind,
            self.empty_tiers.join(" and "),
        )
    }
}
