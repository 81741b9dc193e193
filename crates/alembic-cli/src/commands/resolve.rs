//! Resolve command - reduce replicate groups to one row per entity.

use std::path::PathBuf;

use colored::Colorize;

use alembic::consensus::{
    ClassCuration, ClassStrategy, CurationConfig, PairTolerance, ValueCuration, curate,
};
use alembic::meta::DatasetMeta;
use alembic::table::{load_table, prefixed_path, write_table};

use super::{current_data_path, file_name};

pub fn run(
    dir: PathBuf,
    strategy: String,
    threshold: Option<f64>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut meta = DatasetMeta::load(&dir)?;
    let data_path = current_data_path(&dir, &meta)?;

    let key_col = meta
        .get_str("std_key_col")
        .or_else(|| meta.get_str("key_col"))
        .ok_or("metadata names no entity-key column")?
        .to_string();
    let structure_col = meta.get_str("std_structure_col").map(String::from);
    let class_col = meta
        .get_str("std_class_col")
        .or_else(|| meta.get_str("class_col"))
        .map(String::from);
    let value_col = meta
        .get_str("std_value_col")
        .or_else(|| meta.get_str("value_col"))
        .map(String::from);
    let relation_col = meta
        .get_str("std_relation_col")
        .or_else(|| meta.get_str("relation_col"))
        .map(String::from);

    // Strategy and tolerance are validated before any data is touched.
    let strategy: ClassStrategy = strategy.parse()?;
    let tolerance = match threshold {
        Some(t) => PairTolerance::Fixed(t),
        None => PairTolerance::NoiseScaled,
    };

    let config = CurationConfig {
        key_col,
        structure_col,
        class: class_col.map(|class_col| ClassCuration {
            class_col,
            strategy,
        }),
        value: value_col.map(|value_col| ValueCuration {
            value_col,
            relation_col,
            tolerance,
        }),
    };

    println!(
        "{} {}",
        "Resolving".cyan().bold(),
        data_path.display().to_string().white()
    );

    let (table, _) = load_table(&data_path)?;
    let outcome = curate(&table, &config)?;

    for report in &outcome.reports {
        println!(
            "  {} groups: {} retained, {} dropped",
            report.groups.to_string().white().bold(),
            report.retained.to_string().green(),
            report.dropped.to_string().red()
        );
        if let Some(sigma) = report.noise_estimate {
            if verbose {
                println!("  noise estimate: {:.4}", sigma);
            }
        }
    }

    let out_path = prefixed_path(&data_path, "resolved_");
    write_table(&outcome.table, &out_path)?;

    meta.set("resolved_data_path", file_name(&out_path));
    meta.set("resolution_strategy", strategy.name());
    meta.set("resolved_rows", outcome.table.row_count() as i64);
    if let Some(resolution) = &outcome.class_resolution {
        meta.set("class_resolved_indices", serde_json::to_value(resolution)?);
    }
    if let Some(resolution) = &outcome.value_resolution {
        meta.set("value_resolved_indices", serde_json::to_value(resolution)?);
    }
    if let Some(sigma) = outcome.reports.iter().find_map(|r| r.noise_estimate) {
        meta.set("noise_estimate", sigma);
    }
    meta.stamp("resolved");
    meta.save(&dir)?;

    println!(
        "Curated df ({} rows) written to: {}",
        outcome.table.row_count().to_string().white().bold(),
        out_path.display()
    );
    println!("Updated metadata at: {}", DatasetMeta::path_for(&dir).display());

    Ok(())
}
