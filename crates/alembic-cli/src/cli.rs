//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Alembic: replicate-resolution engine for measurement datasets
#[derive(Parser)]
#[command(name = "alembic")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Canonicalize structures and derive entity keys
    Standardize {
        /// Dataset directory holding meta.json and the data file
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Rescale a value column onto one canonical unit
    Normalize {
        /// Dataset directory holding meta.json and the data file
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Path to the unit-map JSON (canonical label + factors)
        #[arg(short, long)]
        units: PathBuf,
    },

    /// Split a dataset by relation type into regression and
    /// bounded-classification subsets
    Partition {
        /// Dataset directory holding meta.json and the data file
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Upper activity threshold
        #[arg(long)]
        upper: Option<f64>,

        /// Lower activity threshold
        #[arg(long)]
        lower: Option<f64>,

        /// Truncate the regression subset to [lower/100, upper*10]
        #[arg(long)]
        truncate: bool,
    },

    /// Resolve replicate groups to one row per entity
    Resolve {
        /// Dataset directory holding meta.json and the data file
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Class-consensus strategy (unanimous, majority)
        #[arg(short, long, default_value = "unanimous")]
        strategy: String,

        /// Flat pairwise tolerance for value curation (legacy; the
        /// default judges pairs against 0.25 x the fitted noise scale)
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Show dataset metadata and curation progress
    Status {
        /// Dataset directory holding meta.json
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
