//! Natural-orbital occupation numbers of a calculation, organised by symmetry block.

use std::fmt;

use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::active_space::sorting::sort_block;
use crate::active_space::{SymmetryIndex, MAX_OCCUPATION, MIN_OCCUPATION};
use crate::io::format::write_subtitle;

#[cfg(test)]
#[path = "occupancy_tests.rs"]
mod occupancy_tests;

/// An enumerated type for the wavefunction method of the calculation from which the occupation
/// numbers were extracted. This only records provenance; it has no bearing on active-space
/// selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavefunctionMethod {
    /// Second-order Møller–Plesset natural orbitals.
    Mp2,

    /// Configuration-interaction natural orbitals.
    Ci,

    /// Multi-configurational self-consistent-field natural orbitals.
    Mcscf,

    /// Multi-configurational short-range density-functional-theory natural orbitals.
    McSrDft,

    /// Any other method.
    Other(String),
}

impl Default for WavefunctionMethod {
    fn default() -> Self {
        WavefunctionMethod::Mp2
    }
}

impl fmt::Display for WavefunctionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp2 => write!(f, "MP2"),
            Self::Ci => write!(f, "CI"),
            Self::Mcscf => write!(f, "MCSCF"),
            Self::McSrDft => write!(f, "MC-srDFT"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A structure holding the natural-orbital occupation numbers of every symmetry block together
/// with the electron and nuclear-charge totals of the calculation.
///
/// Occupation numbers are kept in the calculation-native orbital order. The table is read-only
/// once constructed.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct OccupancyTable {
    /// The wavefunction method from which the occupation numbers were obtained.
    #[builder(default)]
    #[serde(default)]
    method: WavefunctionMethod,

    /// The total number of electrons in the calculation.
    total_electrons: u32,

    /// The sum of the nuclear charges in the calculation.
    total_nuclear_charge: u32,

    /// The occupation numbers, one vector per symmetry block.
    #[builder(setter(custom))]
    occupations: Vec<Vec<f64>>,
}

impl OccupancyTableBuilder {
    pub fn occupations(&mut self, occupations: &[Vec<f64>]) -> &mut Self {
        self.occupations = Some(occupations.to_vec());
        self
    }

    fn validate(&self) -> Result<(), String> {
        let occupations = self
            .occupations
            .as_ref()
            .ok_or_else(|| "No occupation numbers found.".to_string())?;
        check_occupations(occupations)
    }
}

/// Checks that every occupation number is a finite real number.
fn check_occupations(occupations: &[Vec<f64>]) -> Result<(), String> {
    if occupations.is_empty() {
        return Err("At least one symmetry block is required.".to_string());
    }
    for (isym, block) in occupations.iter().enumerate() {
        if let Some((iorb, occ)) = block.iter().enumerate().find(|(_, occ)| !occ.is_finite()) {
            return Err(format!(
                "Occupation number {occ} of orbital {} in symmetry {} is not finite.",
                iorb + 1,
                isym + 1
            ));
        }
    }
    Ok(())
}

impl OccupancyTable {
    /// Returns a builder to construct an [`OccupancyTable`].
    pub fn builder() -> OccupancyTableBuilder {
        OccupancyTableBuilder::default()
    }

    /// Verifies an occupancy table obtained by deserialisation rather than via its builder.
    pub fn verify(&self) -> Result<(), anyhow::Error> {
        check_occupations(&self.occupations).map_err(|err| anyhow::format_err!(err))
    }

    /// The wavefunction method from which the occupation numbers were obtained.
    pub fn method(&self) -> &WavefunctionMethod {
        &self.method
    }

    /// The total number of electrons.
    pub fn total_electrons(&self) -> u32 {
        self.total_electrons
    }

    /// The sum of the nuclear charges.
    pub fn total_nuclear_charge(&self) -> u32 {
        self.total_nuclear_charge
    }

    /// The total molecular charge, *i.e.* nuclear charge minus electrons.
    pub fn molecular_charge(&self) -> i64 {
        i64::from(self.total_nuclear_charge) - i64::from(self.total_electrons)
    }

    /// The number of symmetry blocks.
    pub fn n_symmetries(&self) -> usize {
        self.occupations.len()
    }

    /// The occupation numbers of all symmetry blocks.
    pub fn occupations(&self) -> &[Vec<f64>] {
        &self.occupations
    }

    /// The occupation numbers of one symmetry block, or `None` if the block does not exist.
    pub fn block(&self, sym: SymmetryIndex) -> Option<&[f64]> {
        self.occupations.get(sym).map(|block| block.as_slice())
    }

    /// The number of orbitals in each symmetry block.
    pub fn orbital_counts(&self) -> Vec<usize> {
        self.occupations.iter().map(|block| block.len()).collect()
    }

    /// The sum of the occupation numbers in each symmetry block.
    pub fn occupation_sums(&self) -> Vec<f64> {
        self.occupations
            .iter()
            .map(|block| block.iter().sum())
            .collect()
    }

    /// The sum of all occupation numbers across every symmetry block.
    pub fn total_occupation(&self) -> f64 {
        self.occupation_sums().iter().sum()
    }

    /// Returns, for each symmetry block, the occupation numbers strictly between `neglect` and
    /// `upper`, in descending order.
    ///
    /// # Arguments
    ///
    /// * `upper` - Occupation numbers at or above this value are not reported.
    /// * `neglect` - Occupation numbers at or below this value are not reported.
    pub fn significant_occupations(&self, upper: f64, neglect: f64) -> Vec<Vec<f64>> {
        self.occupations
            .iter()
            .map(|block| {
                sort_block(block)
                    .values()
                    .into_iter()
                    .filter(|&occ| occ > neglect && occ < upper)
                    .collect()
            })
            .collect()
    }

    /// Counts the occupation numbers lying outside $`[0, 2]`$.
    pub fn n_out_of_range(&self) -> usize {
        self.occupations
            .iter()
            .flatten()
            .filter(|&&occ| !(MIN_OCCUPATION..=MAX_OCCUPATION).contains(&occ))
            .count()
    }
}

impl fmt::Display for OccupancyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Natural-orbital occupations")?;
        writeln!(f, "Wavefunction method: {}", self.method)?;
        writeln!(f, "Total electrons: {}", self.total_electrons)?;
        writeln!(f, "Total nuclear charge: {}", self.total_nuclear_charge)?;
        writeln!(f, "Total molecular charge: {}", self.molecular_charge())?;
        writeln!(f)?;
        writeln!(f, "{}", "┈".repeat(36))?;
        writeln!(f, "{:>8} {:>10} {:>16}", "Sym", "Orbitals", "Occupation sum")?;
        writeln!(f, "{}", "┈".repeat(36))?;
        for (isym, (norb, occ_sum)) in self
            .orbital_counts()
            .into_iter()
            .zip(self.occupation_sums())
            .enumerate()
        {
            writeln!(f, "{:>8} {:>10} {:>16.6}", isym + 1, norb, occ_sum)?;
        }
        writeln!(f, "{}", "┈".repeat(36))?;
        writeln!(
            f,
            "{:>8} {:>10} {:>16.6}",
            "Total",
            self.orbital_counts().iter().sum::<usize>(),
            self.total_occupation()
        )?;
        writeln!(f, "{}", "┈".repeat(36))?;
        let n_out = self.n_out_of_range();
        if n_out > 0 {
            writeln!(
                f,
                "Occupation numbers outside [{MIN_OCCUPATION:.1}, {MAX_OCCUPATION:.1}]: {n_out}"
            )?;
        }
        Ok(())
    }
}

/// Formats the per-symmetry occupation numbers in rows of at most `per_row` values.
pub(crate) fn format_occupation_rows(values: &[f64], per_row: usize) -> Vec<String> {
    values
        .iter()
        .chunks(per_row.max(1))
        .into_iter()
        .map(|chunk| chunk.map(|occ| format!("{occ:>10.6}")).join(" "))
        .collect()
}
