//! Structure canonicalization seam.
//!
//! Turning a raw structure string into a canonical form and a stable
//! identity key is chemistry-cartridge work that lives outside this crate.
//! The core only needs the seam: a trait, the invalid sentinel, and the
//! filter that screens sentinel rows out before resolution. A hash-backed
//! stand-in ships for tests and for running the pipeline without a
//! chemistry backend.

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::table::DataTable;

/// Cell sentinel marking a structure the canonicalizer rejected.
pub const INVALID_STRUCTURE: &str = "invalid_structure";

/// Name of the derived canonical-structure column.
pub const STD_STRUCTURE_COLUMN: &str = "std_structure";
/// Name of the derived identity-key column.
pub const STRUCTURE_KEY_COLUMN: &str = "structure_key";

/// Result of canonicalizing one raw structure string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalForm {
    /// A canonical structure string and a stable identity key.
    Valid { structure: String, key: String },
    /// The raw string does not describe a valid structure.
    Invalid,
}

/// External collaborator that canonicalizes structures.
pub trait Canonicalizer {
    fn canonicalize(&self, raw: &str) -> CanonicalForm;
}

/// Hash-backed stand-in canonicalizer.
///
/// Canonicalizes by trimming and keys by content hash, so identical
/// strings group together but tautomers or salt forms do not. Good enough
/// for tests and for datasets whose structures were canonicalized
/// upstream; a real chemistry backend replaces this behind the same trait.
#[derive(Debug, Default)]
pub struct HashCanonicalizer;

impl HashCanonicalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Canonicalizer for HashCanonicalizer {
    fn canonicalize(&self, raw: &str) -> CanonicalForm {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return CanonicalForm::Invalid;
        }
        let mut hasher = Sha256::new();
        hasher.update(trimmed.as_bytes());
        CanonicalForm::Valid {
            structure: trimmed.to_string(),
            key: format!("{:x}", hasher.finalize()),
        }
    }
}

/// Annotate a table with canonical structures and identity keys.
///
/// Adds [`STD_STRUCTURE_COLUMN`] and [`STRUCTURE_KEY_COLUMN`]; rows the
/// canonicalizer rejects carry the [`INVALID_STRUCTURE`] sentinel in both.
/// Rows are kept so the caller can audit rejects before filtering.
pub fn annotate_structures(
    table: &DataTable,
    raw_col: &str,
    canonicalizer: &dyn Canonicalizer,
) -> Result<DataTable> {
    let raw_pos = table.require_column(raw_col)?;

    let mut structures = Vec::with_capacity(table.row_count());
    let mut keys = Vec::with_capacity(table.row_count());
    for raw in table.column_values(raw_pos) {
        match canonicalizer.canonicalize(raw) {
            CanonicalForm::Valid { structure, key } => {
                structures.push(structure);
                keys.push(key);
            }
            CanonicalForm::Invalid => {
                structures.push(INVALID_STRUCTURE.to_string());
                keys.push(INVALID_STRUCTURE.to_string());
            }
        }
    }

    let mut output = table.clone();
    output.push_column(STD_STRUCTURE_COLUMN, structures)?;
    output.push_column(STRUCTURE_KEY_COLUMN, keys)?;
    Ok(output)
}

/// Remove rows whose structure column holds the invalid sentinel.
pub fn drop_invalid_structures(table: &DataTable, structure_col: &str) -> Result<DataTable> {
    let pos = table.require_column(structure_col)?;
    let valid: Vec<bool> = table
        .column_values(pos)
        .map(|cell| cell != INVALID_STRUCTURE)
        .collect();
    Ok(table.retain_positions(|p| valid[p]))
}
