//! Relational operators attached to measurements.
//!
//! A measurement row may record that its value is exact (`=`), an upper
//! bound on the true value (`<`, `<=`), or a lower bound (`>`, `>=`).
//! Inequality rows are censored observations: the instrument saturated or
//! the assay topped out, and only the bound is known.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AlembicError, Result};
use crate::table::DataTable;

/// Pattern for a value cell with an optional inline relation, e.g. `"<5.0"`.
static MEASUREMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(<=|>=|==|=|<|>)?\s*([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)\s*$").unwrap()
});

/// The closed set of relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

/// How a relation censors the recorded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Censoring {
    /// The value is an exact measurement.
    Exact,
    /// The true value lies below the recorded bound (`<`, `<=`).
    Left,
    /// The true value lies above the recorded bound (`>`, `>=`).
    Right,
}

impl Relation {
    /// Parse an operator token. `==` is accepted as a spelling of `=`.
    pub fn parse(token: &str) -> Option<Relation> {
        match token.trim() {
            "=" | "==" => Some(Relation::Equal),
            "<" => Some(Relation::Less),
            "<=" => Some(Relation::LessEq),
            ">" => Some(Relation::Greater),
            ">=" => Some(Relation::GreaterEq),
            _ => None,
        }
    }

    /// Canonical operator spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::Less => "<",
            Relation::LessEq => "<=",
            Relation::Greater => ">",
            Relation::GreaterEq => ">=",
        }
    }

    /// Censoring direction carried by this operator.
    pub fn censoring(self) -> Censoring {
        match self {
            Relation::Equal => Censoring::Exact,
            Relation::Less | Relation::LessEq => Censoring::Left,
            Relation::Greater | Relation::GreaterEq => Censoring::Right,
        }
    }
}

/// Parse a value cell that may carry an inline relation prefix.
///
/// A bare number parses as an exact measurement. Returns `None` for cells
/// that hold neither form.
pub fn parse_measurement(cell: &str) -> Option<(Relation, f64)> {
    let captures = MEASUREMENT_PATTERN.captures(cell)?;
    let relation = match captures.get(1) {
        Some(op) => Relation::parse(op.as_str())?,
        None => Relation::Equal,
    };
    let value = captures.get(2)?.as_str().parse::<f64>().ok()?;
    Some((relation, value))
}

/// Read a relation column as operators.
///
/// Null cells default to `=` (a missing relation means an exact
/// measurement). An unrecognized operator is a configuration error: the
/// collaborator layer standardizes operator spellings before the core runs.
pub fn relation_column(table: &DataTable, column: &str) -> Result<Vec<Relation>> {
    let pos = table.require_column(column)?;
    table
        .column_values(pos)
        .map(|cell| {
            if DataTable::is_null_value(cell) {
                Ok(Relation::Equal)
            } else {
                Relation::parse(cell).ok_or_else(|| {
                    AlembicError::Config(format!("unrecognized relation operator '{}'", cell.trim()))
                })
            }
        })
        .collect()
}

/// Split a value column whose cells may carry inline relations.
///
/// Datasets without a dedicated relation column often record censoring in
/// the value cell itself (`"<5"`). Bare numbers parse as exact; null and
/// unparseable cells yield no value and an `=` relation.
pub fn split_measurement_column(
    table: &DataTable,
    column: &str,
) -> Result<(Vec<Option<f64>>, Vec<Relation>)> {
    let pos = table.require_column(column)?;

    let mut values = Vec::with_capacity(table.row_count());
    let mut relations = Vec::with_capacity(table.row_count());
    for cell in table.column_values(pos) {
        match parse_measurement(cell) {
            Some((relation, value)) if value.is_finite() => {
                values.push(Some(value));
                relations.push(relation);
            }
            _ => {
                values.push(None);
                relations.push(Relation::Equal);
            }
        }
    }
    Ok((values, relations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operators() {
        assert_eq!(Relation::parse("="), Some(Relation::Equal));
        assert_eq!(Relation::parse("=="), Some(Relation::Equal));
        assert_eq!(Relation::parse(" <= "), Some(Relation::LessEq));
        assert_eq!(Relation::parse("~"), None);
    }

    #[test]
    fn test_censoring_direction() {
        assert_eq!(Relation::Equal.censoring(), Censoring::Exact);
        assert_eq!(Relation::Less.censoring(), Censoring::Left);
        assert_eq!(Relation::LessEq.censoring(), Censoring::Left);
        assert_eq!(Relation::Greater.censoring(), Censoring::Right);
        assert_eq!(Relation::GreaterEq.censoring(), Censoring::Right);
    }

    #[test]
    fn test_parse_measurement_inline_relation() {
        assert_eq!(parse_measurement("<5.0"), Some((Relation::Less, 5.0)));
        assert_eq!(parse_measurement(">= 1e-3"), Some((Relation::GreaterEq, 1e-3)));
        assert_eq!(parse_measurement("4.2"), Some((Relation::Equal, 4.2)));
        assert_eq!(parse_measurement("-0.5"), Some((Relation::Equal, -0.5)));
        assert_eq!(parse_measurement("about 5"), None);
        assert_eq!(parse_measurement(""), None);
    }

    #[test]
    fn test_relation_column_defaults_nulls() {
        let table = DataTable::new(
            vec!["rel".to_string()],
            vec![
                vec!["<".to_string()],
                vec!["".to_string()],
                vec![">=".to_string()],
            ],
        );
        let relations = relation_column(&table, "rel").unwrap();
        assert_eq!(
            relations,
            vec![Relation::Less, Relation::Equal, Relation::GreaterEq]
        );
    }

    #[test]
    fn test_relation_column_rejects_unknown_operator() {
        let table = DataTable::new(vec!["rel".to_string()], vec![vec!["~".to_string()]]);
        assert!(matches!(
            relation_column(&table, "rel"),
            Err(AlembicError::Config(_))
        ));
    }

    #[test]
    fn test_split_measurement_column() {
        let table = DataTable::new(
            vec!["v".to_string()],
            vec![
                vec!["<5".to_string()],
                vec!["4.2".to_string()],
                vec!["".to_string()],
                vec!["garbage".to_string()],
            ],
        );
        let (values, relations) = split_measurement_column(&table, "v").unwrap();
        assert_eq!(values, vec![Some(5.0), Some(4.2), None, None]);
        assert_eq!(
            relations,
            vec![
                Relation::Less,
                Relation::Equal,
                Relation::Equal,
                Relation::Equal
            ]
        );
    }
}
