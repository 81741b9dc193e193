//! Partition command - split a dataset by relation type.

use std::path::PathBuf;

use colored::Colorize;

use alembic::meta::DatasetMeta;
use alembic::partition::{RelationThresholds, partition_by_relation};
use alembic::table::{DataTable, load_table, prefixed_path, write_table};

use super::{current_data_path, file_name};

pub fn run(
    dir: PathBuf,
    upper: Option<f64>,
    lower: Option<f64>,
    truncate: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut meta = DatasetMeta::load(&dir)?;
    let data_path = current_data_path(&dir, &meta)?;
    let relation_col = meta
        .get_str("std_relation_col")
        .or_else(|| meta.get_str("relation_col"))
        .ok_or("metadata names no relation column")?
        .to_string();
    let value_col = meta
        .get_str("std_value_col")
        .or_else(|| meta.get_str("value_col"))
        .ok_or("metadata names no value column")?
        .to_string();

    println!(
        "{} {}",
        "Partitioning".cyan().bold(),
        data_path.display().to_string().white()
    );

    let (table, _) = load_table(&data_path)?;
    let thresholds = RelationThresholds { upper, lower };
    let parts = partition_by_relation(&table, &relation_col, &value_col, thresholds, truncate)?;

    let mut written = vec![write_subset(
        &mut meta,
        &data_path,
        "regression_",
        "regression_data_path",
        &parts.regression,
    )?];
    if let Some(subset) = &parts.upper {
        written.push(write_subset(
            &mut meta,
            &data_path,
            "upper_",
            "upper_data_path",
            subset,
        )?);
    }
    if let Some(subset) = &parts.lower {
        written.push(write_subset(
            &mut meta,
            &data_path,
            "lower_",
            "lower_data_path",
            subset,
        )?);
    }

    meta.stamp("partition");
    meta.save(&dir)?;

    if parts.upper.is_none() && parts.lower.is_none() {
        println!(
            "{}",
            "All relations are '='; table passed through as the regression subset".yellow()
        );
    }
    for (name, rows) in &written {
        println!(
            "  {:12} {} rows",
            name.white().bold(),
            rows.to_string().white()
        );
    }
    if verbose {
        println!(
            "Thresholds: upper={:?} lower={:?} truncate={}",
            upper, lower, truncate
        );
    }

    Ok(())
}

fn write_subset(
    meta: &mut DatasetMeta,
    data_path: &std::path::Path,
    prefix: &str,
    meta_key: &str,
    subset: &DataTable,
) -> Result<(String, usize), Box<dyn std::error::Error>> {
    let out_path = prefixed_path(data_path, prefix);
    write_table(subset, &out_path)?;
    meta.set(meta_key, file_name(&out_path));
    Ok((prefix.trim_end_matches('_').to_string(), subset.row_count()))
}
