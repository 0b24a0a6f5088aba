//! Reading and writing of `CASGen` files.
//!
//! YAML carries input configurations and occupancy tables. Driver results are persisted as
//! bincode: active-space selections in `.casgen.sel` files, which can be fed back in place of a
//! fresh selection, and threshold scans in `.casgen.scn` files.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{self, format_err};
use bincode;
use serde::{de::DeserializeOwned, Serialize};
use serde_yaml;

pub(crate) mod format;


/// An enumerated type for `CASGen` file types.
pub enum CasGenFileType {
    /// Variant for binary files containing active-space selection results.
    Sel,

    /// Variant for binary files containing threshold-scan results.
    Scn,
}

impl CasGenFileType {
    /// Returns the extension of the file type.
    pub fn ext(&self) -> String {
        match self {
            CasGenFileType::Sel => "casgen.sel".to_string(),
            CasGenFileType::Scn => "casgen.scn".to_string(),
        }
    }
}

/// Reads a `CASGen` binary file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (without `CASGen`-specific extensions).
/// * `file_type` - The type of the `CASGen` file to be read in.
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_casgen_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: CasGenFileType,
) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension(file_type.ext());
    let mut reader = BufReader::new(File::open(path).map_err(|err| format_err!(err))?);
    bincode::deserialize_from(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes into a `CASGen` binary file.
///
/// # Arguments
///
/// * `name` - The name of the file to be written (without `CASGen`-specific extensions).
/// * `file_type` - The type of the `CASGen` file to be written.
///
/// # Returns
///
/// A `Result` indicating if the serialisation and writing processes have been successful.
pub fn write_casgen_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: CasGenFileType,
    value: &T,
) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension(file_type.ext());
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value).map_err(|err| format_err!(err))
}

/// Reads a `CASGen` YAML file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (with its `.yml` or `.yaml` extension).
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_casgen_yaml<T, P: AsRef<Path>>(name: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut reader = BufReader::new(File::open(name).map_err(|err| format_err!(err))?);
    serde_yaml::from_reader(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes into a `CASGen` YAML file.
///
/// # Arguments
///
/// * `name` - The name of the YAML file to be written (without extensions). The resulting file
/// will have the `.yml` extension.
///
/// # Returns
///
/// A `Result` indicating if the serialisation and writing processes have been successful.
pub fn write_casgen_yaml<T, P: AsRef<Path>>(name: P, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension("yml");
    let mut writer = BufWriter::new(File::create(path)?);
    serde_yaml::to_writer(&mut writer, value).map_err(|err| format_err!(err))
}
