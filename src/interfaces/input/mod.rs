//! Input specification of `CASGen` calculations from YAML files.

use std::path::PathBuf;

use anyhow::{self, bail, Context};
use serde::{Deserialize, Serialize};

use crate::active_space::occupancy::OccupancyTable;
use crate::drivers::active_space_selection::{
    ActiveSpaceSelectionDriver, ActiveSpaceSelectionParams, ActiveSpaceSelectionResult,
};
use crate::drivers::threshold_scan::{ThresholdScanDriver, ThresholdScanParams};
use crate::drivers::CasGenDriver;
use crate::interfaces::dalton::{write_dalton_input_file, DaltonInputParams};
use crate::interfaces::InputHandle;
use crate::io::format::{
    casgen_output, log_macsec_begin, log_macsec_end, log_title, CasGenOutput,
};
use crate::io::{read_casgen_binary, read_casgen_yaml, CasGenFileType};


// ================
// Enum definitions
// ================

/// An enumerated type representing possible sources of natural-orbital occupation numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OccupancySource {
    /// Variant indicating that the occupancy table is given directly in the input file.
    Inline(OccupancyTable),

    /// Variant indicating that the occupancy table will be read in from a separate YAML file. The
    /// associated path includes the file's extension.
    FromFile(PathBuf),
}

impl Default for OccupancySource {
    fn default() -> Self {
        OccupancySource::FromFile(PathBuf::from("occupations.yml"))
    }
}

impl OccupancySource {
    /// Obtains the occupancy table, reading it from file if necessary.
    pub fn load(&self) -> Result<OccupancyTable, anyhow::Error> {
        let table = match self {
            Self::Inline(table) => table.clone(),
            Self::FromFile(path) => read_casgen_yaml::<OccupancyTable, _>(path).with_context(
                || format!("Unable to read occupation numbers from `{}`.", path.display()),
            )?,
        };
        table.verify()?;
        Ok(table)
    }
}

/// An enumerated type representing possible input kinds for active-space selection from a YAML
/// input file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActiveSpaceSelectionInputKind {
    /// Variant indicating that the parameters for the active-space selection driver will be
    /// specified.
    Parameters(ActiveSpaceSelectionParams),

    /// Variant indicating that the active-space selection results will be read in from a
    /// `CASGen` [`CasGenFileType::Sel`] binary file. The associated path gives the name of the
    /// file without its `.casgen.sel` extension.
    FromFile(PathBuf),
}

impl Default for ActiveSpaceSelectionInputKind {
    fn default() -> Self {
        ActiveSpaceSelectionInputKind::Parameters(ActiveSpaceSelectionParams::default())
    }
}

// ==================
// Struct definitions
// ==================

/// A structure containing `CASGen` input parameters which can be serialised into and deserialised
/// from a YAML input file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// The source of the natural-orbital occupation numbers.
    pub occupancy: OccupancySource,

    /// Specification for a CAS threshold scan. If `None`, no scan will be performed.
    ///
    /// If not specified, this will be taken to be `None`.
    #[serde(default)]
    pub threshold_scan: Option<ThresholdScanParams>,

    /// Specification for active-space selection. If `None`, no active space will be selected.
    /// If not `None`, then this either specifies the parameters for active-space selection, or
    /// the name of a [`CasGenFileType::Sel`] binary file containing previous results.
    ///
    /// If not specified, this will be taken to be `None`.
    #[serde(default)]
    pub active_space_selection: Option<ActiveSpaceSelectionInputKind>,

    /// Parameters for writing a Dalton input file from the selected active space. If `None`, no
    /// Dalton input will be written. Requires [`Self::active_space_selection`].
    ///
    /// If not specified, this will be taken to be `None`.
    #[serde(default)]
    pub dalton: Option<DaltonInputParams>,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            occupancy: OccupancySource::default(),
            threshold_scan: Some(ThresholdScanParams::default()),
            active_space_selection: Some(ActiveSpaceSelectionInputKind::default()),
            dalton: Some(DaltonInputParams::default()),
        }
    }
}

impl Input {
    /// Obtains the active-space selection result, either by running the selection driver or by
    /// reading in a saved result.
    fn select_active_space(
        &self,
        occupancy: &OccupancyTable,
    ) -> Result<Option<ActiveSpaceSelectionResult>, anyhow::Error> {
        match self.active_space_selection.as_ref() {
            None => Ok(None),
            Some(ActiveSpaceSelectionInputKind::Parameters(params)) => {
                let mut driver = ActiveSpaceSelectionDriver::builder()
                    .parameters(params)
                    .occupancy(occupancy)
                    .build()?;
                driver.run()?;
                Ok(Some(driver.result()?.clone()))
            }
            Some(ActiveSpaceSelectionInputKind::FromFile(name)) => {
                log_title("Active-Space Selection");
                casgen_output!("");
                casgen_output!(
                    "Reading active-space selection results from {}.{}",
                    name.display(),
                    CasGenFileType::Sel.ext()
                );
                casgen_output!("");
                let result =
                    read_casgen_binary::<ActiveSpaceSelectionResult, _>(name, CasGenFileType::Sel)
                        .with_context(|| {
                            format!(
                                "Unable to read active-space selection results from `{}`.",
                                name.display()
                            )
                        })?;
                result.log_output_display();
                casgen_output!("");
                Ok(Some(result))
            }
        }
    }
}

impl InputHandle for Input {
    fn handle(&self) -> Result<(), anyhow::Error> {
        let occupancy = self.occupancy.load()?;

        if let Some(scan_params) = self.threshold_scan.as_ref() {
            log_macsec_begin("Threshold scan");
            casgen_output!("");
            let mut driver = ThresholdScanDriver::builder()
                .parameters(scan_params)
                .occupancy(&occupancy)
                .build()?;
            let res = driver.run();
            log_macsec_end("Threshold scan");
            casgen_output!("");
            res?;
        }

        log_macsec_begin("Active-space selection");
        casgen_output!("");
        let selection = self.select_active_space(&occupancy);
        log_macsec_end("Active-space selection");
        casgen_output!("");
        let selection = selection?;

        match (self.dalton.as_ref(), selection.as_ref()) {
            (Some(dalton_params), Some(selection)) => {
                log_macsec_begin("Dalton input");
                casgen_output!("");
                let res = write_dalton_input_file(dalton_params, selection);
                log_macsec_end("Dalton input");
                casgen_output!("");
                res?;
            }
            (Some(_), None) => {
                bail!("A Dalton input file requires an active-space selection.")
            }
            (None, _) => {}
        }
        Ok(())
    }
}
