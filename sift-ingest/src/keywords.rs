//! Load the keyword table from a `Keyword,Category` CSV file.

use sift_core::{KeywordTable, Result, SiftError};
use std::path::Path;
use tracing::{debug, info};

/// Read a keyword CSV. Row order is preserved since the first matching
/// keyword wins during classification.
///
/// A missing file, missing columns or a file with no usable rows are all
/// fatal: nothing can be categorized without the table.
pub fn load_keyword_table(path: impl AsRef<Path>) -> Result<KeywordTable> {
    let path = path.as_ref();
    let file_err = |source: csv::Error| SiftError::KeywordFile {
        path: path.to_path_buf(),
        source,
    };

    // Cells are not trimmed: padding on a keyword is part of the match
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(file_err)?;

    let headers = rdr.headers().map_err(file_err)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
            .ok_or_else(|| SiftError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    let keyword_idx = column("Keyword")?;
    let category_idx = column("Category")?;

    let mut table = KeywordTable::new();
    for result in rdr.records() {
        let record = result.map_err(file_err)?;
        let keyword = record.get(keyword_idx).unwrap_or("");
        let category = record.get(category_idx).unwrap_or("").trim();
        if category.is_empty() {
            debug!(keyword, "skipping keyword without a category");
            continue;
        }
        if !table.insert(keyword, category) {
            debug!(category, "skipping blank keyword");
        }
    }

    if table.is_empty() {
        return Err(SiftError::EmptyKeywordTable {
            origin: path.display().to_string(),
        });
    }

    info!(path = %path.display(), keywords = table.len(), "loaded keyword table");
    Ok(table)
}
