//! Driver for scanning the active-space threshold over a set of values.

use std::fmt;
use std::path::PathBuf;

use anyhow::{self, ensure, format_err};
use derive_builder::Builder;
use indexmap::IndexSet;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::active_space::occupancy::{format_occupation_rows, OccupancyTable};
use crate::active_space::partition::pick_cas;
use crate::active_space::reorder::DEFAULT_NEGLECT_THRESHOLD;
use crate::active_space::sorting::{sort_occupations, SortedOccupation};
use crate::active_space::{check_threshold, ActiveSpaceError};
use crate::drivers::CasGenDriver;
use crate::io::format::{
    casgen_output, join_counts, log_subtitle, log_title, nice_bool, CasGenOutput,
};
use crate::io::{write_casgen_binary, CasGenFileType};


/// The largest number of thresholds a range may expand into.
const MAX_SCAN_STEPS: usize = 10_000;

// ================
// Enum definitions
// ================

/// An enumerated type for the ways of specifying the thresholds to be scanned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScanThresholds {
    /// An explicit list of thresholds.
    List(Vec<f64>),

    /// An arithmetic progression of thresholds from `start` up to and including `stop`.
    Range { start: f64, stop: f64, step: f64 },
}

impl Default for ScanThresholds {
    fn default() -> Self {
        ScanThresholds::List(vec![0.005, 0.01, 0.02, 0.05, 0.1, 0.2])
    }
}

impl ScanThresholds {
    /// Expands the thresholds into distinct values, in order of first appearance.
    ///
    /// # Errors
    ///
    /// Errors if a range has a non-positive step or ends before it starts, or if any threshold
    /// lies outside $`(0, 1)`$.
    pub fn expand(&self) -> Result<Vec<f64>, anyhow::Error> {
        let raw = match self {
            Self::List(thresholds) => thresholds.clone(),
            Self::Range { start, stop, step } => {
                ensure!(
                    *step > 0.0 && step.is_finite(),
                    "The threshold step {step:.3e} must be positive."
                );
                ensure!(
                    start <= stop,
                    "The threshold range ({start:.3e}, {stop:.3e}) ends before it starts."
                );
                // Tolerate rounding in the accumulated stop value.
                let n_steps = ((stop - start) / step + 1e-9).floor();
                ensure!(
                    n_steps < MAX_SCAN_STEPS as f64,
                    "The threshold range ({start:.3e}, {stop:.3e}) with step {step:.3e} spans more than {MAX_SCAN_STEPS} thresholds."
                );
                let n_steps = n_steps as usize;
                (0..=n_steps)
                    .map(|k| start + step * k as f64)
                    .collect_vec()
            }
        };
        let distinct = raw
            .into_iter()
            .map(OrderedFloat)
            .collect::<IndexSet<_>>()
            .into_iter()
            .map(|threshold| threshold.into_inner())
            .collect_vec();
        ensure!(!distinct.is_empty(), "No thresholds to scan.");
        for threshold in distinct.iter() {
            check_threshold("active-space threshold", *threshold, 0.0, 1.0)?;
        }
        Ok(distinct)
    }
}

impl fmt::Display for ScanThresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(thresholds) => write!(
                f,
                "{}",
                thresholds.iter().map(|t| format!("{t:.3e}")).join(", ")
            ),
            Self::Range { start, stop, step } => {
                write!(f, "{start:.3e} to {stop:.3e} in steps of {step:.3e}")
            }
        }
    }
}

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

const fn default_neglect_threshold() -> f64 {
    DEFAULT_NEGLECT_THRESHOLD
}

/// A structure containing control parameters for a CAS threshold scan.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdScanParams {
    /// The thresholds to be scanned.
    #[builder(default)]
    #[serde(default)]
    pub thresholds: ScanThresholds,

    /// Boolean indicating if the CAS counts of every symmetry are to be reported alongside the
    /// totals.
    #[builder(default = "false")]
    #[serde(default)]
    pub per_symmetry: bool,

    /// If set, the occupation numbers strictly between [`Self::neglect_threshold`] and this
    /// value are listed for every symmetry before the scan.
    #[builder(default = "None")]
    #[serde(default)]
    pub report_upper_threshold: Option<f64>,

    /// Occupation numbers at or below this value are left out of the significant-occupation
    /// report.
    #[builder(default = "default_neglect_threshold()")]
    #[serde(default = "default_neglect_threshold")]
    pub neglect_threshold: f64,

    /// Optional name for saving the result as a binary file of type [`CasGenFileType::Scn`]. If
    /// `None`, the result will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<PathBuf>,
}

impl ThresholdScanParams {
    /// Returns a builder to construct a [`ThresholdScanParams`] structure.
    pub fn builder() -> ThresholdScanParamsBuilder {
        ThresholdScanParamsBuilder::default()
    }
}

impl Default for ThresholdScanParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to construct a default `ThresholdScanParams`.")
    }
}

impl fmt::Display for ThresholdScanParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Thresholds: {}", self.thresholds)?;
        writeln!(f, "Per-symmetry counts: {}", nice_bool(self.per_symmetry))?;
        if let Some(upper) = self.report_upper_threshold {
            writeln!(
                f,
                "Significant occupations reported in: ({:.3e}, {upper:.3e})",
                self.neglect_threshold
            )?;
        }
        writeln!(
            f,
            "Save threshold-scan results to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                format!("{}.{}", name.display(), CasGenFileType::Scn.ext())
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

/// A structure containing the CAS partition summary for one threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdScanEntry {
    /// The active-space threshold.
    pub threshold: f64,

    /// The number of frozen doubly-occupied orbitals in each symmetry.
    pub inactive: Vec<usize>,

    /// The number of CAS orbitals in each symmetry.
    pub cas: Vec<usize>,

    /// The number of active electrons derived from the frozen doubly-occupied orbitals, or `None`
    /// if these hold more electrons than are available.
    pub active_electrons: Option<u32>,
}

impl ThresholdScanEntry {
    /// The total number of frozen doubly-occupied orbitals.
    pub fn n_inactive(&self) -> usize {
        self.inactive.iter().sum()
    }

    /// The total number of CAS orbitals.
    pub fn n_cas(&self) -> usize {
        self.cas.iter().sum()
    }
}

/// A structure to contain threshold-scan results.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdScanResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: ThresholdScanParams,

    /// One entry per distinct threshold, in scan order.
    pub entries: Vec<ThresholdScanEntry>,
}

impl ThresholdScanResult {
    /// Returns a builder to construct a [`ThresholdScanResult`] structure.
    fn builder() -> ThresholdScanResultBuilder {
        ThresholdScanResultBuilder::default()
    }
}

impl fmt::Display for ThresholdScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let per_symmetry = self.parameters.per_symmetry;
        let sym_width = self
            .entries
            .iter()
            .map(|entry| join_counts(&entry.cas).chars().count())
            .max()
            .unwrap_or(0)
            .max(9);
        let width = if per_symmetry { 46 + sym_width } else { 44 };
        writeln!(f, "{}", "┈".repeat(width))?;
        write!(
            f,
            "{:>11} {:>10} {:>10} {:>10}",
            "Threshold", "Inactive", "CAS", "Electrons"
        )?;
        if per_symmetry {
            write!(f, "  {:<sym_width$}", "CAS / sym")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "┈".repeat(width))?;
        for entry in self.entries.iter() {
            write!(
                f,
                "{:>11.3e} {:>10} {:>10} {:>10}",
                entry.threshold,
                entry.n_inactive(),
                entry.n_cas(),
                entry
                    .active_electrons
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "--".to_string())
            )?;
            if per_symmetry {
                write!(f, "  {:<sym_width$}", join_counts(&entry.cas))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{}", "┈".repeat(width))?;
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for scanning the CAS threshold.
#[derive(Clone, Builder)]
pub struct ThresholdScanDriver<'a> {
    /// The control parameters for the threshold scan.
    parameters: &'a ThresholdScanParams,

    /// The natural-orbital occupation numbers to be scanned.
    occupancy: &'a OccupancyTable,

    /// The result of the threshold scan.
    #[builder(setter(skip), default = "None")]
    result: Option<ThresholdScanResult>,
}

impl<'a> ThresholdScanDriver<'a> {
    /// Returns a builder to construct a [`ThresholdScanDriver`] structure.
    pub fn builder() -> ThresholdScanDriverBuilder<'a> {
        ThresholdScanDriverBuilder::default()
    }

    /// Logs the significant occupation numbers of every symmetry.
    fn log_significant_occupations(&self, upper: f64) {
        let neglect = self.parameters.neglect_threshold;
        log_subtitle(&format!(
            "Occupation numbers between {neglect:.3e} and {upper:.3e}"
        ));
        casgen_output!("");
        for (isym, values) in self
            .occupancy
            .significant_occupations(upper, neglect)
            .iter()
            .enumerate()
        {
            let rows = format_occupation_rows(values, 6);
            if rows.is_empty() {
                casgen_output!("Sym {:>2}: --", isym + 1);
            }
            for (irow, row) in rows.iter().enumerate() {
                if irow == 0 {
                    casgen_output!("Sym {:>2}: {row}", isym + 1);
                } else {
                    casgen_output!("        {row}");
                }
            }
        }
        casgen_output!("");
    }

    /// Executes the threshold scan.
    fn scan_thresholds(&mut self) -> Result<(), anyhow::Error> {
        log_title("Active-Space Threshold Scan");
        casgen_output!("");
        let params = self.parameters;
        params.log_output_display();

        let occupancy = self.occupancy;
        occupancy.verify()?;
        if let Some(upper) = params.report_upper_threshold {
            self.log_significant_occupations(upper);
        }

        let thresholds = params.thresholds.expand()?;
        log::debug!("Scanning {} distinct thresholds.", thresholds.len());
        let sorted_occupations = sort_occupations(occupancy);
        let total_electrons = i64::from(occupancy.total_electrons());
        let entries = thresholds
            .par_iter()
            .map(|&threshold| scan_entry(threshold, &sorted_occupations, total_electrons))
            .collect::<Result<Vec<_>, _>>()?;

        self.result = ThresholdScanResult::builder()
            .parameters(params.clone())
            .entries(entries)
            .build()
            .ok();

        // Save threshold-scan result, if requested
        if let Some(scan_res) = self.result.as_ref() {
            log_subtitle("CAS partitions by threshold");
            casgen_output!("");
            scan_res.log_output_display();
            casgen_output!("");
            if let Some(name) = params.result_save_name.as_ref() {
                write_casgen_binary(name, CasGenFileType::Scn, scan_res)?;
                casgen_output!(
                    "Threshold-scan results saved as {}.{}.",
                    name.display(),
                    CasGenFileType::Scn.ext()
                );
                casgen_output!("");
            }
        }

        Ok(())
    }
}

impl CasGenDriver for ThresholdScanDriver<'_> {
    type Params = ThresholdScanParams;

    type Outcome = ThresholdScanResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No threshold-scan results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.scan_thresholds()
    }
}

// =========
// Functions
// =========

/// Computes the CAS partition summary for a single threshold.
fn scan_entry(
    threshold: f64,
    sorted_occupations: &[SortedOccupation],
    total_electrons: i64,
) -> Result<ThresholdScanEntry, ActiveSpaceError> {
    let partition = pick_cas(threshold, sorted_occupations)?;
    let inactive_electrons = 2 * partition.inactive().iter().sum::<usize>() as i64;
    Ok(ThresholdScanEntry {
        threshold,
        inactive: partition.inactive().to_vec(),
        cas: partition.active(),
        active_electrons: u32::try_from(total_electrons - inactive_electrons).ok(),
    })
}
