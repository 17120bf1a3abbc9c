//! CSV export discovery and loading.
//!
//! Finds report exports under a directory and parses each one into an untyped
//! [`RawTable`] whose column set is only known after reading.

use std::path::{Path, PathBuf};

use dashboard_core::models::TextEncoding;
use dashboard_core::{DashboardError, Result};
use tracing::{debug, warn};

// ── RawTable ──────────────────────────────────────────────────────────────────

/// A parsed CSV export before classification.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// File the table was read from.
    pub path: PathBuf,
    /// Encoding detected from the byte-order mark.
    pub encoding: TextEncoding,
    /// Header names, trimmed.
    pub columns: Vec<String>,
    /// Data rows, each padded or truncated to `columns.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse already-decoded CSV text.
    pub fn from_csv_text(path: impl Into<PathBuf>, encoding: TextEncoding, text: &str) -> Result<Self> {
        let path = path.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|source| DashboardError::CsvParse {
                path: path.clone(),
                source,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if columns.iter().all(|c| c.is_empty()) {
            return Err(DashboardError::MissingHeader(path));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| DashboardError::CsvParse {
                path: path.clone(),
                source,
            })?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(Self {
            path,
            encoding,
            columns,
            rows,
        })
    }

    /// Index of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether a column called `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Rename `from` to `to` when `from` exists and `to` does not.
    ///
    /// Returns `true` when a rename happened.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if self.has_column(to) {
            return false;
        }
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Display name of the source file.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read and parse one export file.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let (encoding, text) = decode_bytes(&bytes);
    let table = RawTable::from_csv_text(path, encoding, &text)?;

    debug!(
        "Read {} ({:?}): {} columns, {} rows",
        path.display(),
        table.encoding,
        table.columns.len(),
        table.rows.len()
    );

    Ok(table)
}

/// Decode raw file bytes, honouring a UTF-8 or UTF-16 byte-order mark.
///
/// Without a BOM the bytes are treated as UTF-8, replacing invalid sequences.
pub fn decode_bytes(bytes: &[u8]) -> (TextEncoding, String) {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return (TextEncoding::Utf8Bom, String::from_utf8_lossy(rest).into_owned());
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return (TextEncoding::Utf16Le, decode_utf16(rest, u16::from_le_bytes));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return (TextEncoding::Utf16Be, decode_utf16(rest, u16::from_be_bytes));
    }
    (TextEncoding::Utf8, String::from_utf8_lossy(bytes).into_owned())
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
