//! Tabular data model and flat-file plumbing.

mod frame;
mod loader;

pub use frame::DataTable;
pub use loader::{SourceMetadata, load_table, prefixed_path, write_table};
