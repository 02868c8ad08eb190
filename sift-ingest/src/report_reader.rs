//! Read back a categorized report written by the CSV sink.

use serde::Serialize;
use sift_core::{Result, SiftError};
use std::path::Path;

use crate::normalize::parse_amount;

/// Category and amount of one row of a written report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub category: String,
    pub amount: Option<f64>,
}

/// Read the `Category` and `Amount` columns of a detailed or summary report.
pub fn read_categorized_report(path: impl AsRef<Path>) -> Result<Vec<ReportLine>> {
    let path = path.as_ref();
    let read_err = |source: csv::Error| SiftError::SourceRead {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers = rdr.headers().map_err(read_err)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SiftError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    let category_idx = column("Category")?;
    let amount_idx = column("Amount")?;

    let mut lines = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(read_err)?;
        lines.push(ReportLine {
            category: record.get(category_idx).unwrap_or("").to_string(),
            amount: record.get(amount_idx).and_then(parse_amount),
        });
    }
    Ok(lines)
}
