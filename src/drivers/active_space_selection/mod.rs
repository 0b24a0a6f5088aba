//! Driver for selecting an active space from natural-orbital occupation numbers.

use std::fmt;
use std::path::PathBuf;

use anyhow::{self, ensure, format_err, Context};
use approx;
use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::active_space::electrons::{reconcile, ActiveElectronClaim, ElectronBudget};
use crate::active_space::occupancy::OccupancyTable;
use crate::active_space::partition::{pick_cas, pick_ras, Partition};
use crate::active_space::reorder::{detect_reorder, ReorderInstructions, DEFAULT_NEGLECT_THRESHOLD};
use crate::active_space::sorting::{sort_occupations, SortedOccupation};
use crate::active_space::{ActiveSpaceKind, DegeneratePartition};
use crate::drivers::CasGenDriver;
use crate::io::format::{
    casgen_error, casgen_output, casgen_warn, join_counts, log_subtitle, log_title, nice_bool,
    write_subtitle, CasGenOutput,
};
use crate::io::{write_casgen_binary, CasGenFileType};

#[cfg(test)]
#[path = "active_space_selection_tests.rs"]
mod active_space_selection_tests;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

const fn default_active_threshold() -> f64 {
    0.02
}
const fn default_neglect_threshold() -> f64 {
    DEFAULT_NEGLECT_THRESHOLD
}

/// A structure containing control parameters for active-space selection.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ActiveSpaceSelectionParams {
    /// The partitioning mode.
    #[builder(default)]
    #[serde(default)]
    pub kind: ActiveSpaceKind,

    /// The active-space threshold $`t`$. Orbitals with occupation numbers in $`(t, 2 - t)`$ are
    /// active.
    #[builder(default = "default_active_threshold()")]
    #[serde(default = "default_active_threshold")]
    pub active_threshold: f64,

    /// The threshold within which an occupation number is considered pinned at zero or two when
    /// deciding whether an orbital displacement needs an explicit reorder.
    #[builder(default = "default_neglect_threshold()")]
    #[serde(default = "default_neglect_threshold")]
    pub neglect_threshold: f64,

    /// The frozen threshold $`f`$ separating the RAS1 and RAS3 tiers from the frozen orbitals.
    /// Only used in RAS mode, and must be smaller than [`Self::active_threshold`].
    #[builder(default = "default_neglect_threshold()")]
    #[serde(default = "default_neglect_threshold")]
    pub ras_frozen_threshold: f64,

    /// The number of RAS2 orbitals in each symmetry. Required in RAS mode.
    #[builder(default = "None")]
    #[serde(default)]
    pub ras2_orbitals: Option<Vec<usize>>,

    /// The number of electrons in RAS2. Only used in RAS mode.
    #[builder(default = "0")]
    #[serde(default)]
    pub ras2_electrons: u32,

    /// An optional claimed number of active electrons in CAS mode. If given, it must agree with
    /// the number derived from the frozen doubly-occupied orbitals.
    #[builder(default = "None")]
    #[serde(default)]
    pub cas_active_electrons: Option<u32>,

    /// Optional name for saving the result as a binary file of type [`CasGenFileType::Sel`]. If
    /// `None`, the result will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<PathBuf>,
}

impl ActiveSpaceSelectionParams {
    /// Returns a builder to construct a [`ActiveSpaceSelectionParams`] structure.
    pub fn builder() -> ActiveSpaceSelectionParamsBuilder {
        ActiveSpaceSelectionParamsBuilder::default()
    }
}

impl ActiveSpaceSelectionParamsBuilder {
    fn validate(&self) -> Result<(), String> {
        let ras = matches!(self.kind, Some(ActiveSpaceKind::Ras));
        let has_ras2 = matches!(self.ras2_orbitals, Some(Some(_)));
        if ras && !has_ras2 {
            Err("RAS partitioning requires the number of RAS2 orbitals in each symmetry.".to_string())
        } else {
            Ok(())
        }
    }
}

impl Default for ActiveSpaceSelectionParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to construct a default `ActiveSpaceSelectionParams`.")
    }
}

impl fmt::Display for ActiveSpaceSelectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Partitioning mode: {}", self.kind)?;
        writeln!(f, "Active-space threshold: {:.3e}", self.active_threshold)?;
        writeln!(f, "Reorder neglect threshold: {:.3e}", self.neglect_threshold)?;
        match self.kind {
            ActiveSpaceKind::Cas => {
                writeln!(
                    f,
                    "Claimed active electrons: {}",
                    self.cas_active_electrons
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "derived".to_string())
                )?;
            }
            ActiveSpaceKind::Ras => {
                writeln!(f, "RAS frozen threshold: {:.3e}", self.ras_frozen_threshold)?;
                writeln!(
                    f,
                    "RAS2 orbitals: {}",
                    self.ras2_orbitals
                        .as_ref()
                        .map(|ras2| join_counts(ras2))
                        .unwrap_or_else(|| "--".to_string())
                )?;
                writeln!(f, "RAS2 electrons: {}", self.ras2_electrons)?;
            }
        }
        writeln!(
            f,
            "Save active-space selection results to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                format!("{}.{}", name.display(), CasGenFileType::Sel.ext())
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain active-space selection results.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveSpaceSelectionResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: ActiveSpaceSelectionParams,

    /// The ranked occupations of every symmetry block.
    pub sorted_occupations: Vec<SortedOccupation>,

    /// The partitioning of every symmetry block.
    pub partition: Partition,

    /// The orbital swaps required before the selected active space can be used.
    pub reorder: ReorderInstructions,

    /// The validated electron budget.
    pub electron_budget: ElectronBudget,

    /// A report of an unexpectedly empty active tier, if any.
    #[builder(default = "None")]
    pub degeneracy: Option<DegeneratePartition>,
}

impl ActiveSpaceSelectionResult {
    /// Returns a builder to construct a [`ActiveSpaceSelectionResult`] structure.
    fn builder() -> ActiveSpaceSelectionResultBuilder {
        ActiveSpaceSelectionResultBuilder::default()
    }
}

impl fmt::Display for ActiveSpaceSelectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, &format!("Selected {} partition", self.partition.kind()))?;
        writeln!(f)?;
        write!(f, "{}", self.partition)?;
        writeln!(f)?;
        write!(f, "{}", self.electron_budget)?;
        writeln!(f)?;
        write!(f, "{}", self.reorder)?;
        if let Some(degeneracy) = self.degeneracy.as_ref() {
            writeln!(f)?;
            writeln!(f, "{degeneracy}")?;
        }
        Ok(())
    }
}

// ------
// Driver
// ------

/// Largest tolerated difference between the summed occupations and the electron count before a
/// warning is issued.
const OCCUPATION_SUM_TOLERANCE: f64 = 1e-2;

/// A driver for active-space selection.
#[derive(Clone, Builder)]
pub struct ActiveSpaceSelectionDriver<'a> {
    /// The control parameters for active-space selection.
    parameters: &'a ActiveSpaceSelectionParams,

    /// The natural-orbital occupation numbers from which the active space is selected.
    occupancy: &'a OccupancyTable,

    /// The result of the active-space selection.
    #[builder(setter(skip), default = "None")]
    result: Option<ActiveSpaceSelectionResult>,
}

impl<'a> ActiveSpaceSelectionDriver<'a> {
    /// Returns a builder to construct a [`ActiveSpaceSelectionDriver`] structure.
    pub fn builder() -> ActiveSpaceSelectionDriverBuilder<'a> {
        ActiveSpaceSelectionDriverBuilder::default()
    }

    /// Executes active-space selection.
    fn select_active_space(&mut self) -> Result<(), anyhow::Error> {
        log_title("Active-Space Selection");
        casgen_output!("");
        let params = self.parameters;
        params.log_output_display();

        let occupancy = self.occupancy;
        occupancy.verify()?;
        occupancy.log_output_display();
        casgen_output!("");
        let n_out = occupancy.n_out_of_range();
        if n_out > 0 {
            casgen_warn!(
                "{n_out} occupation number(s) lie outside [0, 2]. They are used as given."
            );
        }
        let total_occupation = occupancy.total_occupation();
        if !approx::abs_diff_eq!(
            total_occupation,
            f64::from(occupancy.total_electrons()),
            epsilon = OCCUPATION_SUM_TOLERANCE
        ) {
            casgen_warn!(
                "The occupation numbers sum to {total_occupation:.5}, but the system has {} electrons.",
                occupancy.total_electrons()
            );
        }

        // Rank orbitals
        let sorted_occupations = sort_occupations(occupancy);
        log_subtitle("Occupation ranking");
        casgen_output!("");
        for (isym, sorted) in sorted_occupations.iter().enumerate() {
            let perm = sorted.permutation();
            if perm.is_identity() {
                casgen_output!("Sym {:>2}: already in descending order", isym + 1);
            } else {
                casgen_output!("Sym {:>2}: sorted ← original {}", isym + 1, perm);
                log::debug!(
                    "Sym {:>2}: sorted positions of the original orbitals: {}",
                    isym + 1,
                    sorted.sorted_positions().iter().map(|i| i + 1).join(" ")
                );
            }
        }
        casgen_output!("");

        // Partition
        let partition = match params.kind {
            ActiveSpaceKind::Cas => pick_cas(params.active_threshold, &sorted_occupations),
            ActiveSpaceKind::Ras => {
                let ras2 = params.ras2_orbitals.as_ref().ok_or_else(|| {
                    format_err!("RAS partitioning requires the number of RAS2 orbitals in each symmetry.")
                })?;
                pick_ras(
                    params.active_threshold,
                    params.ras_frozen_threshold,
                    ras2,
                    &sorted_occupations,
                )
            }
        }
        .map_err(|err| {
            casgen_error!("{err}");
            err
        })
        .with_context(|| format!("Unable to partition the orbitals into a {} space.", params.kind))?;
        ensure!(
            partition.is_complete(),
            "The frozen and active orbital counts do not add up to the orbital count of every symmetry."
        );
        let degeneracy = partition.degeneracy();
        if let Some(degeneracy) = degeneracy.as_ref() {
            casgen_warn!("{degeneracy}");
        }

        // Reorder
        let reorder = detect_reorder(&sorted_occupations, params.neglect_threshold)?;
        log::debug!("Reorder counts per symmetry: {}", join_counts(&reorder.counts()));

        // Electrons
        let claim = match params.kind {
            ActiveSpaceKind::Cas => ActiveElectronClaim::Cas {
                claimed: params.cas_active_electrons,
            },
            ActiveSpaceKind::Ras => ActiveElectronClaim::Ras {
                ras1: partition.ras1().unwrap_or_default().to_vec(),
                ras2_electrons: params.ras2_electrons,
            },
        };
        let electron_budget = reconcile(
            &claim,
            partition.inactive(),
            occupancy.total_electrons(),
            occupancy.total_nuclear_charge(),
        )
        .map_err(|err| {
            casgen_error!("{err}");
            err
        })?;

        self.result = ActiveSpaceSelectionResult::builder()
            .parameters(params.clone())
            .sorted_occupations(sorted_occupations)
            .partition(partition)
            .reorder(reorder)
            .electron_budget(electron_budget)
            .degeneracy(degeneracy)
            .build()
            .ok();

        // Save active-space selection result, if requested
        if let Some(sel_res) = self.result.as_ref() {
            sel_res.log_output_display();
            casgen_output!("");
            if let Some(name) = params.result_save_name.as_ref() {
                write_casgen_binary(name, CasGenFileType::Sel, sel_res)?;
                casgen_output!(
                    "Active-space selection results saved as {}.{}.",
                    name.display(),
                    CasGenFileType::Sel.ext()
                );
                casgen_output!("");
            }
        }

        Ok(())
    }
}

impl CasGenDriver for ActiveSpaceSelectionDriver<'_> {
    type Params = ActiveSpaceSelectionParams;

    type Outcome = ActiveSpaceSelectionResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No active-space selection results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.select_active_space()
    }
}
