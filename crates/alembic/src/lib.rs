//! Alembic: replicate-resolution and consensus engine for measurement
//! datasets.
//!
//! Experimental datasets routinely measure the same entity several times,
//! across labs, assays, and units. Before such a dataset can train a
//! model, each entity must be reduced to one trusted record, or dropped
//! when its replicates irreconcilably disagree. Alembic does that
//! reduction: class labels are settled by unanimous or majority vote,
//! numeric values by a noise-aware maximum-likelihood estimate that
//! understands inequality-censored measurements, and heterogeneous units
//! are first rescaled onto one canonical scale.
//!
//! # Core Principles
//!
//! - **Pure passes**: each resolution is a function of table,
//!   grouping key, and configuration; nothing is shared between groups
//!   but the noise estimate, computed once per table.
//! - **Disagreement is data**: an irreconcilable group resolves to
//!   no-decision and drops out; it is never an error.
//! - **Configuration is resolved upfront**: strategies, thresholds, and
//!   unit maps arrive validated; the core never prompts.
//!
//! # Example
//!
//! ```no_run
//! use alembic::consensus::{ClassCuration, ClassStrategy, CurationConfig, curate};
//! use alembic::table::load_table;
//!
//! let (table, _) = load_table("std_assay.csv").unwrap();
//! let config = CurationConfig {
//!     key_col: "structure_key".to_string(),
//!     structure_col: Some("std_structure".to_string()),
//!     class: Some(ClassCuration {
//!         class_col: "std_class".to_string(),
//!         strategy: ClassStrategy::Unanimous,
//!     }),
//!     value: None,
//! };
//!
//! let outcome = curate(&table, &config).unwrap();
//! println!("{} rows survive curation", outcome.table.row_count());
//! ```

pub mod canonical;
pub mod consensus;
pub mod error;
pub mod meta;
pub mod partition;
pub mod relation;
pub mod stats;
pub mod table;
pub mod units;

/// Crate version, stamped into dataset metadata by pipeline stages.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use canonical::{Canonicalizer, HashCanonicalizer, INVALID_STRUCTURE};
pub use consensus::{
    ClassCuration, ClassStrategy, CurationConfig, CurationOutcome, PairTolerance, ResolutionMap,
    ResolutionReport, ValueCuration, curate,
};
pub use error::{AlembicError, Result};
pub use partition::{RelationPartition, RelationThresholds, partition_by_relation};
pub use relation::{Censoring, Relation};
pub use table::{DataTable, SourceMetadata};
pub use units::{UnitConversion, UnitMap, normalize_units};
