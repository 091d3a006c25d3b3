#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the BAAC ingestion tool.

use std::path::PathBuf;

use baac_cli_utils::IndicatifProgress;
use baac_ingest::{DEFAULT_OUTPUT, resolve_data_dir, run_pipeline};
use baac_source::files::{discover_family_files, infer_year};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "baac_ingest", about = "BAAC road-accident ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode and reconcile every survey file into one JSON line per accident
    Run {
        /// Directory holding the yearly CSV files (overrides `BAAC_DATA_DIR` env var)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Output file (default: `accidents.jsonl` in the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the survey files found in the data directory
    Files {
        /// Directory holding the yearly CSV files (overrides `BAAC_DATA_DIR` env var)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = baac_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { data_dir, output } => {
            let data_dir = resolve_data_dir(data_dir)?;
            let output = output.unwrap_or_else(|| data_dir.join(DEFAULT_OUTPUT));

            let files = discover_family_files(&data_dir)?;
            if files.values().all(Vec::is_empty) {
                return Err(format!("No survey files found in {}", data_dir.display()).into());
            }

            let progress = IndicatifProgress::rows_bar(&multi, "Counting rows");
            let summary = run_pipeline(&files, &output, progress)?;

            println!(
                "{} accidents, {} vehicles ({} placeholders), {} persons -> {}",
                summary.accidents,
                summary.vehicles,
                summary.placeholder_vehicles,
                summary.persons,
                summary.output.display()
            );
        }
        Commands::Files { data_dir } => {
            let data_dir = resolve_data_dir(data_dir)?;
            let files = discover_family_files(&data_dir)?;

            println!("{:<18} {:<6} FILE", "FAMILY", "YEAR");
            println!("{}", "-".repeat(60));
            for (family, paths) in &files {
                for path in paths {
                    let year = infer_year(path).map_or_else(|_| "?".to_string(), |y| y.to_string());
                    println!("{:<18} {:<6} {}", family.to_string(), year, path.display());
                }
            }
        }
    }

    Ok(())
}
