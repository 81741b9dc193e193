//! Status command - show dataset metadata and curation progress.

use std::path::PathBuf;

use colored::Colorize;

use alembic::meta::DatasetMeta;

pub fn run(dir: PathBuf, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let meta = DatasetMeta::load(&dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(meta.values())?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Dataset".cyan().bold(),
        dir.display().to_string().white()
    );

    for stage in ["std", "norm", "partition", "resolved"] {
        let done = meta.get(&format!("{}_utc_fix", stage)).is_some();
        let marker = if done { "done".green() } else { "pending".yellow() };
        println!("  {:12} {}", stage, marker);
    }

    if let Some(rows) = meta.get("resolved_rows") {
        println!("  {:12} {}", "rows kept", rows.to_string().white().bold());
    }
    if let Some(sigma) = meta.get("noise_estimate") {
        println!("  {:12} {}", "noise", sigma.to_string().white());
    }

    if verbose {
        println!();
        for (key, value) in meta.values() {
            println!("  {:28} {}", key.white(), value);
        }
    }

    Ok(())
}
