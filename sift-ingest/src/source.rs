//! Read statement CSV exports into raw rows.
//!
//! Exports differ per bank; the only assumption is a header row. Cells that
//! are not valid UTF-8 are kept (lossily decoded) and flagged so the
//! classifier can report them instead of guessing.

use sift_core::{Result, SiftError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::{RawCell, RawRow, SourceTable};

/// Parse one headered CSV file into a [`SourceTable`].
pub fn read_source_csv(path: impl AsRef<Path>) -> Result<SourceTable> {
    let path = path.as_ref();
    let read_err = |source: csv::Error| SiftError::SourceRead {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers: Vec<String> = rdr
        .byte_headers()
        .map_err(read_err)?
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result.map_err(read_err)?;
        let mut row = RawRow::new();
        for (header, bytes) in headers.iter().zip(record.iter()) {
            let cell = match std::str::from_utf8(bytes) {
                Ok(text) => RawCell::new(text),
                Err(_) => RawCell::unreadable(String::from_utf8_lossy(bytes)),
            };
            row.insert(header, cell);
        }
        // Trailing blank lines show up as empty records in some exports
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    info!(file = %basename, rows = rows.len(), "loaded source file");
    Ok(SourceTable::new(basename, headers, rows))
}

/// All `*.csv` files directly inside `dir`, sorted by file name.
pub fn list_source_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "listed source files");
    Ok(files)
}
