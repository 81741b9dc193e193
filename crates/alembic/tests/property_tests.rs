//! Property-based tests for the resolution engine.
//!
//! These tests use proptest to generate random replicate tables and
//! verify that the core invariants hold under all conditions:
//!
//! 1. **Partition of groups**: groups cover the table exactly
//! 2. **Compaction**: curated output is a subset with unique entity keys
//! 3. **No panics**: resolvers never crash on any generated table
//! 4. **Determinism**: same input always produces same output

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use alembic::consensus::{
    ClassResolver, ClassStrategy, PairTolerance, ValueResolver, compact, group_by_key,
    resolve_groups,
};
use alembic::partition::{RelationThresholds, partition_by_relation};
use alembic::table::DataTable;
use alembic::units::{STD_VALUE_COLUMN, UnitMap, normalize_units};

// =============================================================================
// Test Strategies
// =============================================================================

/// A replicate row: entity key from a small pool, a binary-ish class
/// label, a value, and a relation operator.
fn replicate_row() -> impl Strategy<Value = (String, String, f64, String)> {
    (
        "[a-e]",
        prop_oneof![Just("0".to_string()), Just("1".to_string()), Just("2".to_string())],
        -100.0..100.0f64,
        prop_oneof![
            4 => Just("=".to_string()),
            1 => Just("<".to_string()),
            1 => Just("<=".to_string()),
            1 => Just(">".to_string()),
            1 => Just(">=".to_string()),
        ],
    )
}

fn replicate_table() -> impl Strategy<Value = DataTable> {
    prop::collection::vec(replicate_row(), 1..40).prop_map(|rows| {
        DataTable::new(
            vec![
                "key".to_string(),
                "std_class".to_string(),
                "std_value".to_string(),
                "std_relation".to_string(),
            ],
            rows.into_iter()
                .map(|(k, c, v, r)| vec![k, c, v.to_string(), r])
                .collect(),
        )
    })
}

// =============================================================================
// Grouping Properties
// =============================================================================

proptest! {
    /// Groups partition the table: disjoint, covering, one key each.
    #[test]
    fn prop_groups_partition_table(table in replicate_table()) {
        let groups = group_by_key(&table, "key").unwrap();

        let mut seen = std::collections::HashSet::new();
        for group in &groups {
            for index in group.indices() {
                prop_assert!(seen.insert(index), "row in two groups");
            }
        }
        prop_assert_eq!(seen.len(), table.row_count());
    }
}

// =============================================================================
// Compaction Properties
// =============================================================================

proptest! {
    /// Class curation output: subset of input rows, one per entity key,
    /// never more rows than distinct keys.
    #[test]
    fn prop_class_curation_invariants(
        table in replicate_table(),
        majority in any::<bool>(),
    ) {
        let strategy = if majority {
            ClassStrategy::Majority
        } else {
            ClassStrategy::Unanimous
        };
        let resolver = ClassResolver::new(&table, "std_class", strategy).unwrap();
        let resolution = resolve_groups(&table, "key", &resolver).unwrap();
        let curated = compact(&table, &resolution);

        check_compaction(&table, &curated)?;
    }

    /// Value curation output satisfies the same invariants.
    #[test]
    fn prop_value_curation_invariants(table in replicate_table()) {
        let resolver = ValueResolver::new(
            &table,
            "key",
            "std_value",
            Some("std_relation"),
            PairTolerance::NoiseScaled,
        )
        .unwrap();
        let resolution = resolve_groups(&table, "key", &resolver).unwrap();
        let curated = compact(&table, &resolution);

        check_compaction(&table, &curated)?;
    }

    /// Resolution is deterministic: running twice gives identical output.
    #[test]
    fn prop_value_curation_deterministic(table in replicate_table()) {
        let run = || {
            let resolver = ValueResolver::new(
                &table,
                "key",
                "std_value",
                Some("std_relation"),
                PairTolerance::NoiseScaled,
            )
            .unwrap();
            let resolution = resolve_groups(&table, "key", &resolver).unwrap();
            resolution.retained_indices()
        };
        prop_assert_eq!(run(), run());
    }
}

fn check_compaction(input: &DataTable, curated: &DataTable) -> Result<(), TestCaseError> {
    // Subset of input indices, no duplicates.
    let mut seen = std::collections::HashSet::new();
    for index in curated.index() {
        prop_assert!(input.index().contains(index));
        prop_assert!(seen.insert(*index), "row index appears twice");
    }

    // Each entity key at most once.
    let key_pos = curated.column_position("key").unwrap();
    let mut keys: Vec<&str> = curated.column_values(key_pos).collect();
    let total = keys.len();
    keys.sort_unstable();
    keys.dedup();
    prop_assert_eq!(keys.len(), total);

    // Never more rows than distinct input keys.
    let input_key_pos = input.column_position("key").unwrap();
    let mut input_keys: Vec<&str> = input.column_values(input_key_pos).collect();
    input_keys.sort_unstable();
    input_keys.dedup();
    prop_assert!(total <= input_keys.len());

    Ok(())
}

// =============================================================================
// Partition Properties
// =============================================================================

proptest! {
    /// Every partition subset draws only from input rows, and the
    /// regression subset holds only `=` rows.
    #[test]
    fn prop_partition_subsets_from_input(
        table in replicate_table(),
        upper in prop::option::of(-50.0..50.0f64),
        lower in prop::option::of(-50.0..50.0f64),
        truncate in any::<bool>(),
    ) {
        let thresholds = RelationThresholds { upper, lower };
        let parts = partition_by_relation(
            &table,
            "std_relation",
            "std_value",
            thresholds,
            truncate,
        )
        .unwrap();

        let rel_pos = table.column_position("std_relation").unwrap();
        let relations: Vec<&str> = table.column_values(rel_pos).collect();
        let all_equal = relations.iter().all(|r| *r == "=");

        for index in parts.regression.index() {
            prop_assert!(table.index().contains(index));
        }
        if !all_equal {
            let reg_rel_pos = parts.regression.column_position("std_relation").unwrap();
            for rel in parts.regression.column_values(reg_rel_pos) {
                prop_assert_eq!(rel, "=");
            }
        }

        for subset in [&parts.upper, &parts.lower].into_iter().flatten() {
            for index in subset.index() {
                prop_assert!(table.index().contains(index));
            }
            // Labels are binary.
            let label_pos = subset.column_position("std_class").unwrap();
            for label in subset.column_values(label_pos) {
                prop_assert!(label == "0" || label == "1");
            }
        }

        if all_equal {
            prop_assert!(parts.upper.is_none());
            prop_assert!(parts.lower.is_none());
            prop_assert_eq!(parts.regression.row_count(), table.row_count());
        }
    }
}

// =============================================================================
// Unit Normalization Properties
// =============================================================================

proptest! {
    /// Normalized values equal `value * factor`; non-convertible rows
    /// are absent; no row is duplicated.
    #[test]
    fn prop_unit_normalization_consistent(
        values in prop::collection::vec(-1000.0..1000.0f64, 1..30),
        units in prop::collection::vec(0..3usize, 1..30),
        factor in 0.001..1000.0f64,
    ) {
        let n = values.len().min(units.len());
        let labels = ["canon", "scaled", "bad"];
        let rows: Vec<Vec<String>> = (0..n)
            .map(|i| vec![values[i].to_string(), labels[units[i]].to_string()])
            .collect();
        let table = DataTable::new(
            vec!["value".to_string(), "units".to_string()],
            rows,
        );

        let map = UnitMap::new("canon")
            .with_factor("scaled", factor)
            .with_non_convertible("bad");
        let out = normalize_units(&table, "units", "value", &map).unwrap();

        let unit_pos = table.column_position("units").unwrap();
        let expected_rows = table
            .column_values(unit_pos)
            .filter(|u| *u != "bad")
            .count();
        prop_assert_eq!(out.row_count(), expected_rows);

        let std_values = out.numeric_column(STD_VALUE_COLUMN).unwrap();
        for (pos, index) in out.index().iter().enumerate() {
            let original = values[*index];
            let label = labels[units[*index]];
            let expected = if label == "canon" { original } else { original * factor };
            let got = std_values[pos].unwrap();
            prop_assert!((got - expected).abs() <= expected.abs() * 1e-12 + 1e-12);
        }
    }
}
