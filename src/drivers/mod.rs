//! Drivers to carry out `CASGen` functionalities.

use anyhow;

pub mod active_space_selection;
pub mod threshold_scan;

// =================
// Trait definitions
// =================

/// Trait defining behaviours of `CASGen` drivers.
pub trait CasGenDriver {
    /// The type of the parameter structure controlling the driver.
    type Params;

    /// The type of the successful outcome when executing the driver.
    type Outcome;

    /// Executes the driver and stores the result internally.
    fn run(&mut self) -> Result<(), anyhow::Error>;

    /// Returns the result of the driver execution.
    fn result(&self) -> Result<&Self::Outcome, anyhow::Error>;
}
