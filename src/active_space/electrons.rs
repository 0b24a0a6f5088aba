//! Reconciliation of active-electron counts against the total electron count.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::active_space::{ActiveSpaceError, ActiveSpaceKind, ElectronMismatch};

#[cfg(test)]
#[path = "electrons_tests.rs"]
mod electrons_tests;

/// An enumerated type describing where the active-electron count comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveElectronClaim {
    /// The active-electron count of a complete active space is derived from the electrons left
    /// over by the frozen-occupied orbitals. An explicitly claimed count, if given, must agree.
    Cas {
        /// An optional claimed active-electron count.
        claimed: Option<u32>,
    },

    /// The active-electron count of a restricted active space is twice the number of RAS1
    /// orbitals plus the electrons the caller places in RAS2.
    Ras {
        /// Number of RAS1 orbitals in each symmetry.
        ras1: Vec<usize>,

        /// Number of electrons in RAS2.
        ras2_electrons: u32,
    },
}

impl ActiveElectronClaim {
    /// The partitioning mode of this claim.
    pub fn kind(&self) -> ActiveSpaceKind {
        match self {
            Self::Cas { .. } => ActiveSpaceKind::Cas,
            Self::Ras { .. } => ActiveSpaceKind::Ras,
        }
    }
}

/// A structure containing a validated electron budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectronBudget {
    /// The total number of electrons.
    pub total_electrons: u32,

    /// The sum of the nuclear charges.
    pub total_nuclear_charge: u32,

    /// The number of electrons in frozen doubly-occupied orbitals.
    pub inactive_electrons: u32,

    /// The number of active electrons.
    pub active_electrons: u32,
}

impl ElectronBudget {
    /// The total molecular charge, *i.e.* nuclear charge minus electrons.
    pub fn molecular_charge(&self) -> i64 {
        i64::from(self.total_nuclear_charge) - i64::from(self.total_electrons)
    }
}

impl fmt::Display for ElectronBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total electrons: {}", self.total_electrons)?;
        writeln!(f, "Inactive electrons: {}", self.inactive_electrons)?;
        writeln!(f, "Active electrons: {}", self.active_electrons)?;
        writeln!(f, "Total molecular charge: {}", self.molecular_charge())?;
        Ok(())
    }
}

/// Reconciles the active-electron count of a partition with the total electron count.
///
/// The implied number of inactive electrons is twice the number of frozen doubly-occupied
/// orbitals. The active-electron count must be even and equal to the total electron count minus
/// the inactive electrons exactly, and the total electron count must itself be even.
///
/// # Arguments
///
/// * `claim` - The source of the active-electron count.
/// * `inactive` - Number of frozen doubly-occupied orbitals in each symmetry.
/// * `total_electrons` - The total number of electrons.
/// * `total_nuclear_charge` - The sum of the nuclear charges.
///
/// # Errors
///
/// Errors with [`ActiveSpaceError::ElectronMismatch`] on any violation, carrying the offending
/// counts.
pub fn reconcile(
    claim: &ActiveElectronClaim,
    inactive: &[usize],
    total_electrons: u32,
    total_nuclear_charge: u32,
) -> Result<ElectronBudget, ActiveSpaceError> {
    if total_electrons % 2 != 0 {
        return Err(ElectronMismatch::OddTotal(total_electrons).into());
    }

    let inactive_electrons = 2 * to_i64(inactive.iter().sum::<usize>());
    if inactive_electrons > i64::from(total_electrons) {
        return Err(ElectronMismatch::ExcessInactive {
            inactive: inactive_electrons,
            total: total_electrons,
        }
        .into());
    }
    let expected = i64::from(total_electrons) - inactive_electrons;
    let actual = match claim {
        ActiveElectronClaim::Cas { claimed } => claimed.map(i64::from).unwrap_or(expected),
        ActiveElectronClaim::Ras {
            ras1,
            ras2_electrons,
        } => 2 * to_i64(ras1.iter().sum::<usize>()) + i64::from(*ras2_electrons),
    };

    if actual % 2 != 0 {
        return Err(ElectronMismatch::OddActive(actual).into());
    }
    if actual != expected {
        return Err(ElectronMismatch::Inconsistent { expected, actual }.into());
    }

    Ok(ElectronBudget {
        total_electrons,
        total_nuclear_charge,
        inactive_electrons: u32::try_from(inactive_electrons)
            .map_err(|_| ElectronMismatch::Inconsistent { expected, actual })?,
        active_electrons: u32::try_from(actual)
            .map_err(|_| ElectronMismatch::Inconsistent { expected, actual })?,
    })
}

fn to_i64(n: usize) -> i64 {
    // Orbital counts of a single calculation are far below `i64::MAX`.
    n as i64
}
