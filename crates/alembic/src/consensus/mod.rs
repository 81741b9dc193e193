//! Replicate grouping, per-group resolution, and table compaction.
//!
//! A resolution pass is a pure function of the table, the grouping key,
//! and the configuration: rows are grouped by entity key, a resolver
//! decides one retained row index (or none) per group, and the table is
//! compacted to the retained rows. Groups are independent; nothing is
//! shared between them but the noise estimate, which is computed once and
//! passed by value.

mod class;
mod value;

pub use class::{ClassResolver, ClassStrategy};
pub use value::{PairTolerance, ValueResolver, estimate_noise};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::canonical::drop_invalid_structures;
use crate::error::{AlembicError, Result};
use crate::table::DataTable;

/// All rows sharing one entity key.
///
/// Groups partition the table: every row belongs to exactly one group.
pub struct ReplicateGroup<'a> {
    key: &'a str,
    table: &'a DataTable,
    positions: Vec<usize>,
}

impl ReplicateGroup<'_> {
    /// The entity key shared by all rows in the group.
    pub fn key(&self) -> &str {
        self.key
    }

    /// Number of replicate rows.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Row positions into the grouped table.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Stable row indices, in group order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions.iter().map(|&pos| self.table.index_at(pos))
    }

    /// `(stable index, cell)` pairs for one column, in group order.
    pub fn cells(&self, col: usize) -> impl Iterator<Item = (usize, &str)> {
        self.positions.iter().map(move |&pos| {
            (
                self.table.index_at(pos),
                self.table.get(pos, col).unwrap_or(""),
            )
        })
    }
}

/// Decides, for one replicate group, which row survives.
///
/// `None` means the group's replicates cannot be reconciled and the whole
/// group is dropped from the curated output.
pub trait GroupResolver {
    fn resolve(&self, group: &ReplicateGroup) -> Option<usize>;
}

/// Group a table's rows by entity key, in first-seen key order.
pub fn group_by_key<'a>(table: &'a DataTable, key_col: &str) -> Result<Vec<ReplicateGroup<'a>>> {
    let key_pos = table.require_column(key_col)?;

    let mut positions_by_key: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (pos, key) in table.column_values(key_pos).enumerate() {
        positions_by_key.entry(key).or_default().push(pos);
    }

    Ok(positions_by_key
        .into_iter()
        .map(|(key, positions)| ReplicateGroup {
            key,
            table,
            positions,
        })
        .collect())
}

/// Per-entity resolution decisions, in first-seen key order.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionMap {
    decisions: IndexMap<String, Option<usize>>,
}

impl ResolutionMap {
    /// Decision for one entity key; outer `None` when the key is unknown.
    pub fn decision(&self, key: &str) -> Option<Option<usize>> {
        self.decisions.get(key).copied()
    }

    /// All decisions, keyed by entity.
    pub fn decisions(&self) -> &IndexMap<String, Option<usize>> {
        &self.decisions
    }

    /// Number of groups seen.
    pub fn groups(&self) -> usize {
        self.decisions.len()
    }

    /// Number of groups with a retained row.
    pub fn retained(&self) -> usize {
        self.decisions.values().filter(|d| d.is_some()).count()
    }

    /// Number of groups dropped for irreconcilable replicates.
    pub fn dropped(&self) -> usize {
        self.groups() - self.retained()
    }

    /// Stable indices of every retained row, in key order.
    pub fn retained_indices(&self) -> Vec<usize> {
        self.decisions.values().filter_map(|d| *d).collect()
    }
}

/// Counts reported after a resolution pass, for curation auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Distinct entity keys seen.
    pub groups: usize,
    /// Groups that resolved to a retained row.
    pub retained: usize,
    /// Groups dropped as irreconcilable.
    pub dropped: usize,
    /// Noise scale fitted for the pass, when value curation ran.
    pub noise_estimate: Option<f64>,
}

impl ResolutionReport {
    fn new(resolution: &ResolutionMap, noise_estimate: Option<f64>) -> Self {
        Self {
            groups: resolution.groups(),
            retained: resolution.retained(),
            dropped: resolution.dropped(),
            noise_estimate,
        }
    }
}

/// Apply a resolver to every group of the table.
pub fn resolve_groups(
    table: &DataTable,
    key_col: &str,
    resolver: &dyn GroupResolver,
) -> Result<ResolutionMap> {
    let groups = group_by_key(table, key_col)?;

    let mut decisions = IndexMap::with_capacity(groups.len());
    for group in &groups {
        decisions.insert(group.key().to_string(), resolver.resolve(group));
    }

    Ok(ResolutionMap { decisions })
}

/// Compact a table to the rows retained by a resolution: exactly one row
/// per entity that reached a decision, in key order.
pub fn compact(table: &DataTable, resolution: &ResolutionMap) -> DataTable {
    table.select_indices(&resolution.retained_indices())
}

/// Class-curation settings for [`curate`].
#[derive(Debug, Clone)]
pub struct ClassCuration {
    pub class_col: String,
    pub strategy: ClassStrategy,
}

/// Value-curation settings for [`curate`].
#[derive(Debug, Clone)]
pub struct ValueCuration {
    pub value_col: String,
    pub relation_col: Option<String>,
    pub tolerance: PairTolerance,
}

/// Full configuration for a curation pass.
#[derive(Debug, Clone)]
pub struct CurationConfig {
    /// Column holding the entity key that groups replicates.
    pub key_col: String,
    /// Structure column to screen for the invalid sentinel, if any.
    pub structure_col: Option<String>,
    pub class: Option<ClassCuration>,
    pub value: Option<ValueCuration>,
}

/// Outcome of a curation pass.
#[derive(Debug, Clone)]
pub struct CurationOutcome {
    /// The curated table: one row per surviving entity.
    pub table: DataTable,
    /// Per-entity decisions from the class pass, if it ran.
    pub class_resolution: Option<ResolutionMap>,
    /// Per-entity decisions from the value pass, if it ran.
    pub value_resolution: Option<ResolutionMap>,
    /// Reports in pass order, for audit output.
    pub reports: Vec<ResolutionReport>,
}

/// Run replicate resolution over a table.
///
/// Invalid structures are screened first, then the class pass (when a
/// class column is configured) and the value pass (when a value column
/// is) each group the current table by entity key, resolve, and compact.
/// A dataset with neither pass configured has nothing to curate, which is
/// a configuration error rather than a silent no-op.
pub fn curate(table: &DataTable, config: &CurationConfig) -> Result<CurationOutcome> {
    if config.class.is_none() && config.value.is_none() {
        return Err(AlembicError::Config(
            "dataset must configure a class column, a value column, or both".to_string(),
        ));
    }

    let mut current = match &config.structure_col {
        Some(col) => drop_invalid_structures(table, col)?,
        None => table.clone(),
    };

    let mut class_resolution = None;
    let mut value_resolution = None;
    let mut reports = Vec::new();

    if let Some(class) = &config.class {
        let resolver = ClassResolver::new(&current, &class.class_col, class.strategy)?;
        let resolution = resolve_groups(&current, &config.key_col, &resolver)?;
        current = compact(&current, &resolution);
        reports.push(ResolutionReport::new(&resolution, None));
        class_resolution = Some(resolution);
    }

    if let Some(value) = &config.value {
        let resolver = ValueResolver::new(
            &current,
            &config.key_col,
            &value.value_col,
            value.relation_col.as_deref(),
            value.tolerance,
        )?;
        let resolution = resolve_groups(&current, &config.key_col, &resolver)?;
        current = compact(&current, &resolution);
        reports.push(ResolutionReport::new(&resolution, resolver.noise()));
        value_resolution = Some(resolution);
    }

    Ok(CurationOutcome {
        table: current,
        class_resolution,
        value_resolution,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table(rows: Vec<(&str, &str)>) -> DataTable {
        DataTable::new(
            vec!["key".to_string(), "std_class".to_string()],
            rows.into_iter()
                .map(|(k, c)| vec![k.to_string(), c.to_string()])
                .collect(),
        )
    }

    #[test]
    fn test_groups_partition_table() {
        let table = make_table(vec![("a", "1"), ("b", "0"), ("a", "1"), ("c", "1")]);
        let groups = group_by_key(&table, "key").unwrap();

        assert_eq!(groups.len(), 3);
        let total: usize = groups.iter().map(|g| g.len()).sum();
        assert_eq!(total, table.row_count());

        // First-seen key order.
        let keys: Vec<&str> = groups.iter().map(|g| g.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_compact_keeps_one_row_per_entity() {
        let table = make_table(vec![("a", "1"), ("b", "0"), ("a", "1"), ("b", "1")]);
        let resolver = ClassResolver::new(&table, "std_class", ClassStrategy::Unanimous).unwrap();
        let resolution = resolve_groups(&table, "key", &resolver).unwrap();
        let curated = compact(&table, &resolution);

        // Group a is unanimous, group b is not.
        assert_eq!(curated.row_count(), 1);
        assert_eq!(curated.index(), &[0]);
    }

    #[test]
    fn test_decision_indices_belong_to_group() {
        let table = make_table(vec![("a", "1"), ("b", "0"), ("a", "1")]);
        let resolver = ClassResolver::new(&table, "std_class", ClassStrategy::Majority).unwrap();
        let resolution = resolve_groups(&table, "key", &resolver).unwrap();

        for group in group_by_key(&table, "key").unwrap() {
            if let Some(Some(index)) = resolution.decision(group.key()) {
                assert!(group.indices().any(|i| i == index));
            }
        }
    }

    #[test]
    fn test_curate_requires_a_target_column() {
        let table = make_table(vec![("a", "1")]);
        let config = CurationConfig {
            key_col: "key".to_string(),
            structure_col: None,
            class: None,
            value: None,
        };
        assert!(matches!(
            curate(&table, &config),
            Err(AlembicError::Config(_))
        ));
    }

    #[test]
    fn test_curate_class_pass_reports_counts() {
        let table = make_table(vec![("a", "1"), ("a", "1"), ("b", "0"), ("b", "1")]);
        let config = CurationConfig {
            key_col: "key".to_string(),
            structure_col: None,
            class: Some(ClassCuration {
                class_col: "std_class".to_string(),
                strategy: ClassStrategy::Unanimous,
            }),
            value: None,
        };

        let outcome = curate(&table, &config).unwrap();

        assert_eq!(outcome.table.row_count(), 1);
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].groups, 2);
        assert_eq!(outcome.reports[0].retained, 1);
        assert_eq!(outcome.reports[0].dropped, 1);
    }

    #[test]
    fn test_resolution_map_serializes_with_nulls() {
        let table = make_table(vec![("a", "1"), ("b", "0"), ("b", "1")]);
        let resolver = ClassResolver::new(&table, "std_class", ClassStrategy::Unanimous).unwrap();
        let resolution = resolve_groups(&table, "key", &resolver).unwrap();

        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["decisions"]["a"], 0);
        assert!(json["decisions"]["b"].is_null());
    }
}
