//! Unit normalization via multiplicative conversion factors.
//!
//! Replicate measurements arrive in whatever unit each source lab reported.
//! Before values can be compared, every row is rescaled to one canonical
//! unit using a label-to-factor mapping resolved upstream. Labels mapped to
//! the non-convertible sentinel (percent inhibition next to molar
//! concentrations, say) drop their rows from the canonical-unit output.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AlembicError, Result};
use crate::table::DataTable;

/// Name of the derived canonical-value column.
pub const STD_VALUE_COLUMN: &str = "std_value";
/// Name of the derived canonical-unit column.
pub const STD_UNIT_COLUMN: &str = "std_unit";

/// JSON sentinel marking a unit as non-convertible.
const DROP_SENTINEL: &str = "drop";

/// Conversion for one unit label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitConversion {
    /// Multiply values in this unit by the factor to reach the canonical unit.
    Factor(f64),
    /// Rows in this unit cannot be expressed on the canonical scale.
    NonConvertible,
}

impl Serialize for UnitConversion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            UnitConversion::Factor(f) => serializer.serialize_f64(*f),
            UnitConversion::NonConvertible => serializer.serialize_str(DROP_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for UnitConversion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ConversionVisitor;

        impl Visitor<'_> for ConversionVisitor {
            type Value = UnitConversion;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a conversion factor or the string \"{}\"", DROP_SENTINEL)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                Ok(UnitConversion::Factor(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(UnitConversion::Factor(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(UnitConversion::Factor(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                if v == DROP_SENTINEL {
                    Ok(UnitConversion::NonConvertible)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(ConversionVisitor)
    }
}

/// Mapping from unit labels to conversion factors for one canonical unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitMap {
    /// The unit every surviving value is expressed in.
    pub canonical: String,
    /// Conversion per unit label; the canonical label maps to 1.0.
    pub factors: IndexMap<String, UnitConversion>,
}

impl UnitMap {
    /// Create a map with only the canonical unit registered at factor 1.0.
    pub fn new(canonical: impl Into<String>) -> Self {
        let canonical = canonical.into();
        let mut factors = IndexMap::new();
        factors.insert(canonical.clone(), UnitConversion::Factor(1.0));
        Self { canonical, factors }
    }

    /// Identity map for a table with a single distinct unit: no rescaling,
    /// the lone label is treated as canonical.
    pub fn identity(label: impl Into<String>) -> Self {
        Self::new(label)
    }

    /// Register a conversion factor for a unit label.
    pub fn with_factor(mut self, label: impl Into<String>, factor: f64) -> Self {
        self.factors.insert(label.into(), UnitConversion::Factor(factor));
        self
    }

    /// Mark a unit label as non-convertible.
    pub fn with_non_convertible(mut self, label: impl Into<String>) -> Self {
        self.factors.insert(label.into(), UnitConversion::NonConvertible);
        self
    }

    /// Look up the conversion for a label.
    pub fn conversion(&self, label: &str) -> Option<UnitConversion> {
        self.factors.get(label).copied()
    }
}

/// Rescale a value column to the canonical unit.
///
/// The output table is restricted to rows whose unit has a numeric factor
/// and gains two columns: [`STD_VALUE_COLUMN`] holding `value * factor` and
/// [`STD_UNIT_COLUMN`] asserting the canonical label. Rows in a
/// non-convertible unit are dropped. A unit label absent from the map is a
/// configuration error: the map is built from the dataset's own distinct
/// labels, so a miss means the configuration step was skipped.
pub fn normalize_units(
    table: &DataTable,
    unit_col: &str,
    value_col: &str,
    map: &UnitMap,
) -> Result<DataTable> {
    let unit_pos = table.require_column(unit_col)?;
    let values = table.numeric_column(value_col)?;

    let mut keep = vec![false; table.row_count()];
    let mut std_values = Vec::new();

    let labels: Vec<&str> = table.column_values(unit_pos).collect();
    for (pos, label) in labels.iter().enumerate() {
        let label = label.trim();
        match map.conversion(label) {
            Some(UnitConversion::Factor(factor)) => {
                keep[pos] = true;
                let cell = values[pos]
                    .map(|v| format_value(v * factor))
                    .unwrap_or_default();
                std_values.push(cell);
            }
            Some(UnitConversion::NonConvertible) => {}
            None => {
                return Err(AlembicError::Config(format!(
                    "unit '{}' has no conversion factor in the unit map",
                    label
                )));
            }
        }
    }

    let mut output = table.retain_positions(|pos| keep[pos]);
    let std_units = vec![map.canonical.clone(); output.row_count()];
    output.push_column(STD_VALUE_COLUMN, std_values)?;
    output.push_column(STD_UNIT_COLUMN, std_units)?;

    Ok(output)
}

/// Render a converted value. `f64`'s display form is the shortest string
/// that parses back to the same number, so nothing is lost on re-load.
fn format_value(value: f64) -> String {
    value.to_string()
}
