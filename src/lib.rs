//! # CASGen: Active-Space Selection from Natural-Orbital Occupations
//!
//! CASGen selects active spaces for multiconfigurational calculations from the natural-orbital
//! occupation numbers of a correlated calculation (MP2, CCSD, or a preliminary MCSCF). Given
//! occupations grouped by irreducible representation, it
//! - ranks orbitals within each symmetry by decreasing occupation and records the required
//!   reordering,
//! - partitions each symmetry into inactive, active, and secondary orbitals using a
//!   complete-active-space (CAS) or restricted-active-space (RAS) scheme,
//! - reconciles the partition against the total electron count of the system,
//! - scans a range of thresholds to show how the CAS size responds, and
//! - writes a ready-to-run [Dalton](https://daltonprogram.org/) `.dal` control file.
//!
//! ## Running CASGen
//!
//! The `casgen` binary reads a YAML configuration file whose structure mirrors
//! [`interfaces::input::Input`]. A template containing every parameter at its default value can
//! be generated with
//!
//! ```text
//! casgen template -n casgen_template
//! ```
//!
//! and a calculation is then run with
//!
//! ```text
//! casgen run -c casgen_template.yml -o casgen.out
//! ```
//!
//! ## Library structure
//!
//! - [`active_space`] contains the occupancy table and the ranking, partitioning, reordering,
//!   and electron-counting algorithms.
//! - [`drivers`] wraps these algorithms into configurable drivers that log their progress.
//! - [`interfaces`] contains the YAML input layer, the command-line interface, and the Dalton
//!   writer.
//! - [`io`] handles (de)serialisation of inputs and results.
//! - [`permutation`] provides the permutations recording orbital reordering.

pub mod active_space;
pub mod drivers;
pub mod interfaces;
pub mod io;
pub mod permutation;
