//! Command implementations.

pub mod normalize;
pub mod partition;
pub mod resolve;
pub mod standardize;
pub mod status;

use std::path::{Path, PathBuf};

use alembic::meta::DatasetMeta;

/// Path of the most-derived data file recorded in the metadata: the
/// pipeline chains `data_path` -> `std_` -> `norm_` prefixed files, and
/// each stage picks up where the previous one left off.
pub fn current_data_path(dir: &Path, meta: &DatasetMeta) -> Result<PathBuf, String> {
    for key in ["norm_data_path", "std_data_path", "data_path"] {
        if let Some(name) = meta.get_str(key) {
            return Ok(dir.join(name));
        }
    }
    Err("metadata names no data file (expected 'data_path')".to_string())
}

/// File name portion of a path, for storing relative names in metadata.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
