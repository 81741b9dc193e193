//! Standardize command - canonicalize structures and derive entity keys.

use std::path::PathBuf;

use colored::Colorize;

use alembic::canonical::{
    self, HashCanonicalizer, INVALID_STRUCTURE, STD_STRUCTURE_COLUMN, STRUCTURE_KEY_COLUMN,
};
use alembic::meta::DatasetMeta;
use alembic::table::{load_table, prefixed_path, write_table};

use super::{current_data_path, file_name};

pub fn run(dir: PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut meta = DatasetMeta::load(&dir)?;
    let data_path = current_data_path(&dir, &meta)?;
    let structure_col = meta.require_str("structure_col")?.to_string();

    println!(
        "{} {}",
        "Standardizing".cyan().bold(),
        data_path.display().to_string().white()
    );

    let (table, source) = load_table(&data_path)?;
    if verbose {
        println!(
            "  {} rows, {} columns ({})",
            table.row_count(),
            table.column_count(),
            source.format
        );
    }

    let annotated =
        canonical::annotate_structures(&table, &structure_col, &HashCanonicalizer::new())?;

    let structure_pos = annotated
        .column_position(STD_STRUCTURE_COLUMN)
        .ok_or("standardized structure column missing")?;
    let invalid = annotated
        .column_values(structure_pos)
        .filter(|s| *s == INVALID_STRUCTURE)
        .count();

    let out_path = prefixed_path(&data_path, "std_");
    write_table(&annotated, &out_path)?;

    meta.set("std_data_path", file_name(&out_path));
    meta.set("std_structure_col", STD_STRUCTURE_COLUMN);
    meta.set("std_key_col", STRUCTURE_KEY_COLUMN);
    meta.set("source_hash", source.hash);
    meta.stamp("std");
    meta.save(&dir)?;

    println!(
        "Standardized {} structures ({} invalid)",
        annotated.row_count().to_string().white().bold(),
        invalid.to_string().red()
    );
    println!("Standard df written to: {}", out_path.display());

    Ok(())
}
