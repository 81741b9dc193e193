//! Error types for the Alembic library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Alembic operations.
///
/// Configuration problems are fatal and reported through these variants.
/// Statistical indeterminacy (undefined noise estimate, non-converging
/// likelihood fit) is never an error: it travels as `None` through the
/// resolution types and turns into a dropped group.
#[derive(Debug, Error)]
pub enum AlembicError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A named column is not present in the table.
    #[error("Missing column: '{0}'")]
    MissingColumn(String),

    /// Consensus strategy name not in the closed strategy set.
    #[error("Unknown consensus strategy: '{0}' (expected 'unanimous' or 'majority')")]
    UnknownStrategy(String),

    /// Empty file or no data to curate.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error persisting or loading dataset metadata.
    #[error("Metadata error: {0}")]
    Meta(String),
}

/// Result type alias for Alembic operations.
pub type Result<T> = std::result::Result<T, AlembicError>;
