//! CSV/TSV loading and writing with delimiter detection.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AlembicError, Result};

use super::frame::DataTable;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

/// Load a delimited file into a [`DataTable`].
///
/// The delimiter is auto-detected from the header line. The returned
/// metadata carries a content hash so downstream records can pin the exact
/// input they were derived from.
pub fn load_table(path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
    let path = path.as_ref();

    let mut file = File::open(path).map_err(|e| AlembicError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents).map_err(|e| AlembicError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    let hash = format!("sha256:{:x}", hasher.finalize());

    let delimiter = detect_delimiter(&contents)?;
    let table = parse_bytes(&contents, delimiter)?;

    let format = match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
    .to_string();

    let metadata = SourceMetadata {
        file: path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        hash,
        size_bytes: contents.len() as u64,
        format,
        row_count: table.row_count(),
        column_count: table.column_count(),
        loaded_at: Utc::now(),
    };

    Ok((table, metadata))
}

/// Write a table as CSV. The stable row index is not written; it is
/// reassigned when the file is loaded again.
pub fn write_table(table: &DataTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(AlembicError::Csv)?;

    writer.write_record(table.headers())?;
    for pos in 0..table.row_count() {
        let record: Vec<&str> = (0..table.column_count())
            .map(|col| table.get(pos, col).unwrap_or(""))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| AlembicError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Compose an output path by prefixing the source file name, e.g.
/// `data.csv` -> `resolved_data.csv` in the same directory.
pub fn prefixed_path(path: impl AsRef<Path>, prefix: &str) -> PathBuf {
    let path = path.as_ref();
    let file = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", prefix, file))
}

fn parse_bytes(bytes: &[u8], delimiter: u8) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        // Pad short records so every row matches the header width.
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AlembicError::EmptyData("No data rows found".to_string()));
    }

    Ok(DataTable::new(headers, rows))
}

/// Pick the candidate delimiter that occurs most often in the header line.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or(&[]);
    if first_line.is_empty() {
        return Err(AlembicError::EmptyData("File is empty".to_string()));
    }

    let best = DELIMITERS
        .iter()
        .map(|&d| (d, first_line.iter().filter(|&&b| b == d).count()))
        .max_by_key(|&(_, count)| count)
        .filter(|&(_, count)| count > 0)
        .map(|(d, _)| d);

    // A single-column file has no delimiter occurrences; default to comma.
    Ok(best.unwrap_or(b','))
}
