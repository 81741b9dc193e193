//! Dataset metadata store.
//!
//! Each dataset directory carries a `meta.json` document mapping
//! configuration names (column names, file paths, version tags, pass
//! summaries) to values. Pipeline stages read the keys they need and
//! write back what they produced, so a dataset directory is
//! self-describing about how its files were derived.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{Map, Value};

use crate::error::{AlembicError, Result};

/// File name of the metadata document inside a dataset directory.
pub const META_FILE: &str = "meta.json";

/// Named configuration values for one dataset directory.
#[derive(Debug, Clone, Default)]
pub struct DatasetMeta {
    values: Map<String, Value>,
}

impl DatasetMeta {
    /// An empty metadata document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the metadata document for a dataset directory.
    pub fn path_for(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(META_FILE)
    }

    /// Load the metadata document from a dataset directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = Self::path_for(&dir);
        let file = File::open(&path).map_err(|e| {
            AlembicError::Meta(format!("Failed to open '{}': {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);
        let values: Map<String, Value> = serde_json::from_reader(reader).map_err(|e| {
            AlembicError::Meta(format!("Failed to parse '{}': {}", path.display(), e))
        })?;
        Ok(Self { values })
    }

    /// Write the metadata document back to a dataset directory.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                AlembicError::Meta(format!(
                    "Failed to create directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        let path = Self::path_for(dir);
        let file = File::create(&path).map_err(|e| {
            AlembicError::Meta(format!("Failed to create '{}': {}", path.display(), e))
        })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.values)
            .map_err(|e| AlembicError::Meta(format!("Failed to serialize metadata: {}", e)))?;
        Ok(())
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Look up a string value that must be present.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .ok_or_else(|| AlembicError::Meta(format!("metadata key '{}' is missing", key)))
    }

    /// Set one value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Merge a batch of values, overwriting existing keys.
    pub fn merge(&mut self, updates: Map<String, Value>) {
        for (key, value) in updates {
            self.values.insert(key, value);
        }
    }

    /// Stamp a pipeline stage with the crate version and a UTC fix time,
    /// e.g. `resolved_version` and `resolved_utc_fix`.
    pub fn stamp(&mut self, stage: &str) {
        self.set(format!("{}_version", stage), crate::VERSION);
        self.set(format!("{}_utc_fix", stage), Utc::now().timestamp());
    }

    /// All values, for display.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}
