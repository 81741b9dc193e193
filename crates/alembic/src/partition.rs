//! Partitioning a dataset by relation type.
//!
//! Exact (`=`) rows support regression modeling directly. Censored rows
//! only say which side of their recorded bound the true value lies on, but
//! against a fixed activity threshold many of them still carry a definite
//! class label. The partitioner splits one table into a regression subset
//! and up to two threshold-derived binary-classification subsets.

use crate::error::Result;
use crate::relation::{Censoring, Relation, relation_column};
use crate::table::DataTable;

/// Name of the binary label column added to classification subsets.
pub const BOUND_CLASS_COLUMN: &str = "std_class";

/// Optional activity thresholds for classification subsets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelationThresholds {
    /// Values at or above this bound count as active.
    pub upper: Option<f64>,
    /// Values at or below this bound count as active.
    pub lower: Option<f64>,
}

/// Output of [`partition_by_relation`].
#[derive(Debug, Clone)]
pub struct RelationPartition {
    /// Rows whose relation is exactly `=`.
    pub regression: DataTable,
    /// Upper-bound classification subset; present iff an upper threshold
    /// was supplied and the table had inequality relations.
    pub upper: Option<DataTable>,
    /// Lower-bound classification subset, symmetric to `upper`.
    pub lower: Option<DataTable>,
}

/// Split a table into regression and bounded-classification subsets.
///
/// - The regression subset keeps `=` rows. When both thresholds are
///   supplied and `truncate_regression` is set, values outside
///   `[lower/100, upper*10]` are discarded; the band is deliberately wide
///   so only egregious outliers go, not merely out-of-range values.
/// - The upper-bound subset (iff an upper threshold is supplied) drops
///   `>`/`>=` rows whose value sits below the threshold: such a bound says
///   nothing about which side of the threshold the true value is on. Each
///   surviving row is labeled active (1) when its value is at or above the
///   threshold and its relation is not `<`, inactive (0) otherwise.
/// - The lower-bound subset mirrors this: `<`/`<=` rows above the lower
///   threshold are dropped; active means at or below the threshold with a
///   relation other than `>`.
/// - A table whose relations are all `=` skips partitioning: the original
///   table comes back as the regression subset and no classification
///   subsets are produced.
pub fn partition_by_relation(
    table: &DataTable,
    relation_col: &str,
    value_col: &str,
    thresholds: RelationThresholds,
    truncate_regression: bool,
) -> Result<RelationPartition> {
    let relations = relation_column(table, relation_col)?;
    let values = table.numeric_column(value_col)?;

    if relations.iter().all(|r| *r == Relation::Equal) {
        return Ok(RelationPartition {
            regression: table.clone(),
            upper: None,
            lower: None,
        });
    }

    let regression = build_regression(table, &relations, &values, thresholds, truncate_regression);

    let upper = thresholds
        .upper
        .map(|bound| build_upper_subset(table, &relations, &values, bound))
        .transpose()?;
    let lower = thresholds
        .lower
        .map(|bound| build_lower_subset(table, &relations, &values, bound))
        .transpose()?;

    Ok(RelationPartition {
        regression,
        upper,
        lower,
    })
}

fn build_regression(
    table: &DataTable,
    relations: &[Relation],
    values: &[Option<f64>],
    thresholds: RelationThresholds,
    truncate: bool,
) -> DataTable {
    let band = match (truncate, thresholds.lower, thresholds.upper) {
        (true, Some(lower), Some(upper)) => Some((lower / 100.0, upper * 10.0)),
        _ => None,
    };

    table.retain_positions(|pos| {
        if relations[pos] != Relation::Equal {
            return false;
        }
        match (band, values[pos]) {
            (Some((lo, hi)), Some(v)) => v >= lo && v <= hi,
            // Rows without a numeric value cannot be judged outliers here;
            // value resolution deals with them later.
            _ => true,
        }
    })
}

fn build_upper_subset(
    table: &DataTable,
    relations: &[Relation],
    values: &[Option<f64>],
    bound: f64,
) -> Result<DataTable> {
    let keep = |pos: usize| {
        let Some(v) = values[pos] else { return false };
        // A lower bound below the threshold leaves the class undecidable.
        !(relations[pos].censoring() == Censoring::Right && v < bound)
    };
    let mut subset = table.retain_positions(keep);

    let mut labels = Vec::with_capacity(subset.row_count());
    for pos in 0..table.row_count() {
        if !keep(pos) {
            continue;
        }
        let v = values[pos].unwrap_or(f64::NAN);
        let active = v >= bound && relations[pos] != Relation::Less;
        labels.push(if active { "1".to_string() } else { "0".to_string() });
    }

    subset.push_column(BOUND_CLASS_COLUMN, labels)?;
    Ok(subset)
}

fn build_lower_subset(
    table: &DataTable,
    relations: &[Relation],
    values: &[Option<f64>],
    bound: f64,
) -> Result<DataTable> {
    let keep = |pos: usize| {
        let Some(v) = values[pos] else { return false };
        // An upper bound above the threshold leaves the class undecidable.
        !(relations[pos].censoring() == Censoring::Left && v > bound)
    };
    let mut subset = table.retain_positions(keep);

    let mut labels = Vec::with_capacity(subset.row_count());
    for pos in 0..table.row_count() {
        if !keep(pos) {
            continue;
        }
        let v = values[pos].unwrap_or(f64::NAN);
        let active = v <= bound && relations[pos] != Relation::Greater;
        labels.push(if active { "1".to_string() } else { "0".to_string() });
    }

    subset.push_column(BOUND_CLASS_COLUMN, labels)?;
    Ok(subset)
}
