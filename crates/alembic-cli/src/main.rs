//! Alembic CLI - replicate-resolution pipeline driver.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Standardize { dir } => commands::standardize::run(dir, cli.verbose),

        Commands::Normalize { dir, units } => commands::normalize::run(dir, units, cli.verbose),

        Commands::Partition {
            dir,
            upper,
            lower,
            truncate,
        } => commands::partition::run(dir, upper, lower, truncate, cli.verbose),

        Commands::Resolve {
            dir,
            strategy,
            threshold,
        } => commands::resolve::run(dir, strategy, threshold, cli.verbose),

        Commands::Status { dir, json } => commands::status::run(dir, json, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
