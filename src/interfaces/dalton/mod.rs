//! Emission of Dalton control files for a selected active space.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{self, ensure, Context};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::active_space::partition::{ActiveTiers, Partition};
use crate::active_space::reorder::ReorderInstructions;
use crate::drivers::active_space_selection::ActiveSpaceSelectionResult;
use crate::io::format::{casgen_output, log_subtitle, CasGenOutput};

#[cfg(test)]
#[path = "dalton_tests.rs"]
mod dalton_tests;

// ================
// Enum definitions
// ================

/// An enumerated type for the wavefunction calculations that can be requested from Dalton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaltonWavefunction {
    /// A configuration-interaction calculation producing natural orbitals.
    Ci,

    /// A multi-configurational self-consistent-field calculation.
    Mcscf,

    /// A multi-configurational short-range density-functional-theory calculation.
    McSrDft,
}

impl Default for DaltonWavefunction {
    fn default() -> Self {
        DaltonWavefunction::Mcscf
    }
}

impl fmt::Display for DaltonWavefunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ci => write!(f, "CI"),
            Self::Mcscf => write!(f, "MCSCF"),
            Self::McSrDft => write!(f, "MC-srDFT"),
        }
    }
}

// ==================
// Struct definitions
// ==================

const fn default_one() -> u32 {
    1
}
const fn default_max_iterations() -> u32 {
    24
}
const fn default_min_max() -> [u32; 2] {
    [0, 2]
}
fn default_sr_exchange() -> String {
    "SRXPBEHSE".to_string()
}
fn default_sr_correlation() -> String {
    "SRCPBERI".to_string()
}
const fn default_range_separation() -> f64 {
    0.4
}
fn default_output_file() -> PathBuf {
    PathBuf::from("input.dal")
}

/// A structure containing control parameters for writing a Dalton input file.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaltonInputParams {
    /// The wavefunction calculation to request.
    #[builder(default)]
    #[serde(default)]
    pub wavefunction: DaltonWavefunction,

    /// The one-based spatial symmetry of the target state.
    #[builder(default = "1")]
    #[serde(default = "default_one")]
    pub symmetry: u32,

    /// The one-based index of the target state within its symmetry.
    #[builder(default = "1")]
    #[serde(default = "default_one")]
    pub state: u32,

    /// The maximum number of micro-iterations.
    #[builder(default = "24")]
    #[serde(default = "default_max_iterations")]
    pub max_micro_iterations: u32,

    /// The maximum number of macro-iterations.
    #[builder(default = "24")]
    #[serde(default = "default_max_iterations")]
    pub max_macro_iterations: u32,

    /// The minimum and maximum numbers of holes in RAS1.
    #[builder(default = "[0, 2]")]
    #[serde(default = "default_min_max")]
    pub ras1_holes: [u32; 2],

    /// The minimum and maximum numbers of electrons in RAS3.
    #[builder(default = "[0, 2]")]
    #[serde(default = "default_min_max")]
    pub ras3_electrons: [u32; 2],

    /// The short-range exchange functional for MC-srDFT.
    #[builder(default = "default_sr_exchange()")]
    #[serde(default = "default_sr_exchange")]
    pub sr_exchange_functional: String,

    /// The short-range correlation functional for MC-srDFT.
    #[builder(default = "default_sr_correlation()")]
    #[serde(default = "default_sr_correlation")]
    pub sr_correlation_functional: String,

    /// The range-separation parameter $`\mu`$ for MC-srDFT.
    #[builder(default = "0.4")]
    #[serde(default = "default_range_separation")]
    pub range_separation: f64,

    /// The path of the Dalton input file to be written.
    #[builder(default = "default_output_file()")]
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

impl DaltonInputParams {
    /// Returns a builder to construct a [`DaltonInputParams`] structure.
    pub fn builder() -> DaltonInputParamsBuilder {
        DaltonInputParamsBuilder::default()
    }
}

impl Default for DaltonInputParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to construct a default `DaltonInputParams`.")
    }
}

impl fmt::Display for DaltonInputParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wavefunction: {}", self.wavefunction)?;
        writeln!(f, "Target symmetry: {}", self.symmetry)?;
        writeln!(f, "Target state: {}", self.state)?;
        writeln!(
            f,
            "Max micro/macro iterations: {}/{}",
            self.max_micro_iterations, self.max_macro_iterations
        )?;
        if self.wavefunction == DaltonWavefunction::McSrDft {
            writeln!(
                f,
                "Short-range functionals: {} {}",
                self.sr_exchange_functional, self.sr_correlation_functional
            )?;
            writeln!(f, "Range-separation parameter: {}", self.range_separation)?;
        }
        writeln!(f, "Output file: {}", self.output_file.display())?;
        Ok(())
    }
}

// =========
// Functions
// =========

/// Writes a line holding one count per symmetry, each followed by a space.
fn write_counts<W: Write>(writer: &mut W, counts: &[usize]) -> std::io::Result<()> {
    write!(writer, " ")?;
    for count in counts {
        write!(writer, "{count} ")?;
    }
    writeln!(writer)
}

/// Writes the `*CONFIGURATION INPUT` section.
fn write_configuration<W: Write>(
    writer: &mut W,
    params: &DaltonInputParams,
    partition: &Partition,
    active_electrons: u32,
) -> std::io::Result<()> {
    writeln!(writer, "*CONFIGURATION INPUT")?;
    writeln!(writer, ".INACTIVE")?;
    write_counts(writer, partition.inactive())?;
    match partition.tiers() {
        ActiveTiers::Cas { cas } => {
            writeln!(writer, ".CAS SPACE")?;
            write_counts(writer, cas)?;
        }
        ActiveTiers::Ras {
            ras1, ras2, ras3, ..
        } => {
            writeln!(writer, ".RAS1 SPACE")?;
            write_counts(writer, ras1)?;
            writeln!(writer, ".RAS2 SPACE")?;
            write_counts(writer, ras2)?;
            writeln!(writer, ".RAS3 SPACE")?;
            write_counts(writer, ras3)?;
            writeln!(writer, ".RAS1 HOLES")?;
            writeln!(writer, " {} {}", params.ras1_holes[0], params.ras1_holes[1])?;
            writeln!(writer, ".RAS3 ELECTRONS")?;
            writeln!(
                writer,
                " {} {}",
                params.ras3_electrons[0], params.ras3_electrons[1]
            )?;
        }
    }
    writeln!(writer, ".ELECTRONS")?;
    writeln!(writer, " {active_electrons}")?;
    writeln!(writer, ".SYMMETRY")?;
    writeln!(writer, " {}", params.symmetry)
}

/// Writes the `*ORBITAL INPUT` section, including the `.REORDER` keyword when needed.
fn write_orbital_input<W: Write>(
    writer: &mut W,
    reorder: &ReorderInstructions,
) -> std::io::Result<()> {
    writeln!(writer, "*ORBITAL INPUT")?;
    writeln!(writer, ".MOSTART")?;
    writeln!(writer, " NEWORB")?;
    if reorder.is_needed() {
        writeln!(writer, ".REORDER")?;
        for count in reorder.counts() {
            write!(writer, "{count} ")?;
        }
        writeln!(writer)?;
        for swap in reorder.flattened() {
            write!(writer, "{swap} ")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Writes the `*OPTIMIZATION` section.
fn write_optimization<W: Write>(writer: &mut W, params: &DaltonInputParams) -> std::io::Result<()> {
    writeln!(writer, "*OPTIMIZATION")?;
    if params.wavefunction == DaltonWavefunction::Ci {
        writeln!(writer, ".DETERMI")?;
    } else {
        writeln!(writer, ".STATE")?;
        writeln!(writer, " {}", params.state)?;
    }
    writeln!(writer, ".MAX MICRO ITERATIONS")?;
    writeln!(writer, " {}", params.max_micro_iterations)?;
    writeln!(writer, ".MAX MACRO ITERATIONS")?;
    writeln!(writer, " {}", params.max_macro_iterations)
}

/// Writes a Dalton input file for a validated active-space selection.
///
/// The partition and the electron budget are re-checked before anything is written, since a
/// selection result may have been read back from a file.
///
/// # Arguments
///
/// * `writer` - The destination of the Dalton input.
/// * `params` - The Dalton control parameters.
/// * `selection` - The active-space selection result.
///
/// # Errors
///
/// Errors if the partition is incomplete, if the electron budget does not add up, or on any
/// I/O failure.
pub fn write_dalton_input<W: Write>(
    writer: &mut W,
    params: &DaltonInputParams,
    selection: &ActiveSpaceSelectionResult,
) -> Result<(), anyhow::Error> {
    let partition = &selection.partition;
    let budget = &selection.electron_budget;
    ensure!(
        partition.is_complete(),
        "The frozen and active orbital counts do not add up to the orbital count of every symmetry."
    );
    let n_inactive_electrons = 2 * partition.n_inactive();
    ensure!(
        budget.inactive_electrons as usize == n_inactive_electrons
            && budget.inactive_electrons + budget.active_electrons == budget.total_electrons,
        "The electron budget ({} inactive, {} active, {} total) does not match the partition ({} inactive electrons).",
        budget.inactive_electrons,
        budget.active_electrons,
        budget.total_electrons,
        n_inactive_electrons
    );

    writeln!(writer, "**DALTON INPUT")?;
    writeln!(writer, ".RUN WAVE FUNCTION")?;
    writeln!(writer, "*MOLBAS")?;
    writeln!(writer, ".SYMTHR")?;
    writeln!(writer, " 1.0D-4")?;
    writeln!(writer, "**WAVEFUNCTION")?;
    match params.wavefunction {
        DaltonWavefunction::Ci => {
            writeln!(writer, ".CI")?;
            writeln!(writer, "*CI VECTOR")?;
            writeln!(writer, ".PLUS COMBINATIONS")?;
            writeln!(writer, "*CI INPUT")?;
            writeln!(writer, ".CINO")?;
            writeln!(writer, ".STATE")?;
            writeln!(writer, " {}", params.state)?;
        }
        DaltonWavefunction::Mcscf => {
            writeln!(writer, ".MCSCF")?;
        }
        DaltonWavefunction::McSrDft => {
            writeln!(writer, ".MCSRDFT")?;
            writeln!(writer, ".SRFUN")?;
            writeln!(
                writer,
                " {} {}",
                params.sr_exchange_functional, params.sr_correlation_functional
            )?;
        }
    }
    write_configuration(writer, params, partition, budget.active_electrons)?;
    write_orbital_input(writer, &selection.reorder)?;
    write_optimization(writer, params)?;
    if params.wavefunction == DaltonWavefunction::McSrDft {
        writeln!(writer, "**INTEGRALS")?;
        writeln!(writer, "*TWOINT")?;
        writeln!(writer, ".DOSRIN")?;
        writeln!(writer, ".ERF")?;
        writeln!(writer, " {}", params.range_separation)?;
    }
    writeln!(writer, "**END OF DALTON INPUT")?;
    Ok(())
}

/// Writes a Dalton input file to the path given in the control parameters.
///
/// # Returns
///
/// The path of the written file.
pub fn write_dalton_input_file(
    params: &DaltonInputParams,
    selection: &ActiveSpaceSelectionResult,
) -> Result<PathBuf, anyhow::Error> {
    log_subtitle("Dalton input");
    casgen_output!("");
    params.log_output_display();
    casgen_output!(
        "Total molecular charge: {}",
        selection.electron_budget.molecular_charge()
    );

    let path = params.output_file.clone();
    let file = File::create(&path)
        .with_context(|| format!("Unable to create Dalton input file `{}`.", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_dalton_input(&mut writer, params, selection)?;
    writer.flush()?;
    casgen_output!("Dalton input written to {}.", path.display());
    casgen_output!("");
    Ok(path)
}
