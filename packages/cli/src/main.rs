#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the inspect-nyc risk worklist.
//!
//! Loads the inspection dataset and the trained model, builds the temporal
//! feature table, and prints the restaurants most likely to have a
//! critical violation at their next inspection.
//!
//! Uses `indicatif-log-bridge` (via [`inspect_nyc_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use inspect_nyc_dataset::config::load_config;

#[derive(Parser)]
#[command(
    name = "inspect_nyc",
    about = "Rank NYC restaurants by predicted critical violation risk"
)]
struct Cli {
    /// Path to an `inspect_nyc.toml` config file (overrides `INSPECT_NYC_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the latest snapshot of every matching restaurant and print the worklist
    Rank {
        /// Borough to restrict to (e.g., "Queens"). "All" disables the filter.
        #[arg(long)]
        borough: Option<String>,
        /// Cuisine to restrict to. Repeat for several; names may contain commas.
        #[arg(long)]
        cuisine: Vec<String>,
        /// Comma-separated ZIP codes (e.g., "10001, 10002")
        #[arg(long)]
        zip: Option<String>,
        /// Minimum predicted risk, inclusive, in [0, 1]
        #[arg(long)]
        threshold: Option<f64>,
        /// Maximum number of restaurants to list
        #[arg(long)]
        limit: Option<usize>,
        /// Write the worklist to this CSV file as well
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the boroughs and most common cuisines available as filters
    Options {
        /// Number of cuisines to list
        #[arg(long)]
        top_cuisines: Option<usize>,
    },
    /// Write the full per-inspection feature table to a CSV file
    Features {
        /// Destination CSV file
        #[arg(long)]
        output: PathBuf,
    },
    /// Verify the dataset and model are present and the model loads
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = inspect_nyc_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Rank {
            borough,
            cuisine,
            zip,
            threshold,
            limit,
            output,
        } => {
            if let Some(threshold) = threshold {
                config.rank.threshold = threshold;
            }
            if let Some(limit) = limit {
                config.rank.limit = limit;
            }
            let request = pipeline::RankRequest {
                borough,
                cuisines: cuisine,
                zip,
                output,
            };
            pipeline::run_rank(&multi, &config, &request)?;
        }
        Commands::Options { top_cuisines } => {
            if let Some(top_cuisines) = top_cuisines {
                config.rank.top_cuisines = top_cuisines;
            }
            pipeline::run_options(&multi, &config)?;
        }
        Commands::Features { output } => {
            pipeline::run_features(&multi, &config, &output)?;
        }
        Commands::Check => {
            pipeline::run_check(&multi, &config)?;
        }
    }

    Ok(())
}
