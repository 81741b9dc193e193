//! Normalize command - rescale a value column onto one canonical unit.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use colored::Colorize;

use alembic::meta::DatasetMeta;
use alembic::table::{load_table, prefixed_path, write_table};
use alembic::units::{STD_UNIT_COLUMN, STD_VALUE_COLUMN, UnitMap, normalize_units};

use super::{current_data_path, file_name};

pub fn run(dir: PathBuf, units: PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut meta = DatasetMeta::load(&dir)?;
    let data_path = current_data_path(&dir, &meta)?;
    let value_col = meta.require_str("value_col")?.to_string();
    let unit_col = meta.require_str("unit_col")?.to_string();

    let map: UnitMap = {
        let file = File::open(&units)
            .map_err(|e| format!("Failed to open unit map '{}': {}", units.display(), e))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| format!("Failed to parse unit map '{}': {}", units.display(), e))?
    };

    println!(
        "{} {} {} {}",
        "Normalizing".cyan().bold(),
        data_path.display().to_string().white(),
        "to".white(),
        map.canonical.white().bold()
    );

    let (table, _) = load_table(&data_path)?;
    let before = table.row_count();

    let normalized = normalize_units(&table, &unit_col, &value_col, &map)?;
    let dropped = before - normalized.row_count();

    if verbose {
        for (label, conversion) in &map.factors {
            println!("  {:20} {:?}", label, conversion);
        }
    }

    let out_path = prefixed_path(&data_path, "norm_");
    write_table(&normalized, &out_path)?;

    meta.set("norm_data_path", file_name(&out_path));
    meta.set("std_value_col", STD_VALUE_COLUMN);
    meta.set("std_unit_col", STD_UNIT_COLUMN);
    meta.set("canonical_unit", map.canonical.clone());
    meta.stamp("norm");
    meta.save(&dir)?;

    println!(
        "Kept {} rows ({} in non-convertible units dropped)",
        normalized.row_count().to_string().white().bold(),
        dropped.to_string().yellow()
    );
    println!("Normalized df written to: {}", out_path.display());

    Ok(())
}
