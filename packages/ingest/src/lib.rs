#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for reconciling the BAAC road-accident survey files into one
//! line-delimited JSON document per accident.

pub mod jsonl;
pub mod reconcile;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use baac_ingest_models::IngestSummary;
use baac_source::SourceError;
use baac_source::characteristics::CharacteristicsDecoder;
use baac_source::files::count_rows;
use baac_source::locations::LocationsDecoder;
use baac_source::persons::PersonsDecoder;
use baac_source::progress::ProgressCallback;
use baac_source::reader::{FamilyReader, RowDecoder};
use baac_source::registry::DomainRegistry;
use baac_source::vehicles::VehiclesDecoder;
use baac_source_models::Family;

use crate::reconcile::{ReconcileError, reconcile};

/// Environment variable consulted when no data directory is given.
pub const DATA_DIR_ENV: &str = "BAAC_DATA_DIR";

/// Output file name used when none is given.
pub const DEFAULT_OUTPUT: &str = "accidents.jsonl";

/// Errors that abort an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Decoding a survey file failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The decoded streams are inconsistent.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// An accident could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither `--data-dir` nor the environment variable is set.
    #[error("no data directory given (use --data-dir or set {DATA_DIR_ENV})")]
    MissingDataDir,
}

/// Returns the data directory from the `--data-dir` CLI flag or the
/// `BAAC_DATA_DIR` environment variable.
///
/// # Errors
///
/// Returns [`IngestError::MissingDataDir`] if neither is set.
pub fn resolve_data_dir(cli_dir: Option<PathBuf>) -> Result<PathBuf, IngestError> {
    cli_dir
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .ok_or(IngestError::MissingDataDir)
}

/// Decodes every file of the four families, reconciles the records and
/// writes the accidents to `output`.
///
/// `progress` receives one unit per decoded row; its total is set to the
/// number of data rows across all files before decoding starts.
///
/// # Errors
///
/// Returns the first decode, reconciliation or output error. Nothing is
/// written unless decoding and reconciliation both succeed.
pub fn run_pipeline(
    files: &BTreeMap<Family, Vec<PathBuf>>,
    output: &Path,
    progress: Arc<dyn ProgressCallback>,
) -> Result<IngestSummary, IngestError> {
    let start = Instant::now();
    let registry = DomainRegistry::builtin()?;

    let paths_of = |family: Family| files.get(&family).cloned().unwrap_or_default();
    let all_paths: Vec<PathBuf> = files.values().flatten().cloned().collect();
    progress.set_total(count_rows(&all_paths)?);

    let characteristics = decode_family(
        &CharacteristicsDecoder::new(&registry),
        paths_of(Family::Characteristics),
        &progress,
    )?;
    let locations = decode_family(
        &LocationsDecoder::new(&registry),
        paths_of(Family::Locations),
        &progress,
    )?;
    let vehicles = decode_family(
        &VehiclesDecoder::new(&registry),
        paths_of(Family::Vehicles),
        &progress,
    )?;
    let persons = decode_family(
        &PersonsDecoder::new(&registry),
        paths_of(Family::Persons),
        &progress,
    )?;

    progress.set_message("Reconciling".to_string());
    let reconciliation = reconcile(characteristics, locations, vehicles, persons)?;
    let accidents = reconciliation.accidents;

    let written = jsonl::write_file(output, &accidents)?;
    progress.finish(format!("Wrote {written} accidents"));

    let summary = IngestSummary {
        files: all_paths.len(),
        accidents: written,
        vehicles: accidents.iter().map(|a| a.vehicles.len()).sum(),
        persons: accidents.iter().map(baac_ingest_models::Accident::person_count).sum(),
        placeholder_vehicles: reconciliation.placeholders.len(),
        output: output.to_path_buf(),
        duration: start.elapsed(),
    };

    log::info!(
        "Ingestion complete: {} accidents, {} vehicles ({} placeholders), {} persons from {} files in {:.1}s",
        summary.accidents,
        summary.vehicles,
        summary.placeholder_vehicles,
        summary.persons,
        summary.files,
        summary.duration.as_secs_f64()
    );

    Ok(summary)
}

/// Decodes all files of one family, failing on the first bad row.
///
/// # Errors
///
/// Returns the first [`SourceError`] the reader yields.
pub fn decode_family<D: RowDecoder>(
    decoder: &D,
    paths: Vec<PathBuf>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<D::Record>, SourceError> {
    if paths.is_empty() {
        log::warn!("No {} files to decode", D::FAMILY);
    } else {
        log::info!("Decoding {} {} file(s)", paths.len(), D::FAMILY);
    }
    FamilyReader::new(decoder, paths, Arc::clone(progress)).collect()
}
