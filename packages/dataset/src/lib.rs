#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading of the DOHMH restaurant inspection export.
//!
//! The dataset is read once at startup into memory and treated as
//! read-only for the rest of the run.

pub mod config;
pub mod paths;

use std::io::Read;
use std::path::{Path, PathBuf};

use inspect_nyc_inspection_models::RawInspectionRecord;

/// Errors that can occur while loading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// One or more required input files are absent.
    #[error("Missing required files: {}", display_paths(.paths))]
    MissingInputs {
        /// Every missing path, in the order checked.
        paths: Vec<PathBuf>,
    },

    /// I/O error opening or reading the dataset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV structure error (for example an unreadable header row).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Verifies that every required input exists before anything is loaded.
///
/// # Errors
///
/// Returns [`DatasetError::MissingInputs`] listing all missing paths.
pub fn ensure_inputs_exist(required: &[&Path]) -> Result<(), DatasetError> {
    let missing = paths::missing_paths(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DatasetError::MissingInputs { paths: missing })
    }
}

/// Reads raw inspection rows from CSV data with a header row.
///
/// Headers and fields are trimmed and unknown columns are ignored. Rows
/// that cannot be decoded (for example invalid UTF-8) are skipped and
/// counted; I/O failures abort the read.
///
/// # Errors
///
/// Returns [`DatasetError`] on I/O failure or an unreadable header row.
pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawInspectionRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader.headers()?;

    let mut records = Vec::new();
    let mut skipped = 0_u64;

    for result in reader.deserialize::<RawInspectionRecord>() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                log::debug!("Skipping undecodable row: {e}");
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} undecodable rows");
    }
    log::info!("Read {} inspection rows", records.len());

    Ok(records)
}

/// Loads raw inspection rows from a CSV file on disk.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be opened or read.
pub fn load_raw_records(path: &Path) -> Result<Vec<RawInspectionRecord>, DatasetError> {
    log::info!("Loading inspections from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_raw_records(std::io::BufReader::new(file))
}
