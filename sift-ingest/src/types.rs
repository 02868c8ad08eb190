use serde::{Deserialize, Serialize};

/// Column headers the normalizer understands
pub mod columns {
    pub const DATE: &str = "Date";
    pub const DESCRIPTION: &str = "Description";
    pub const AMOUNT: &str = "Amount";
    pub const NAME: &str = "Name";
    pub const TRANSFERS: &str = "Transfers";
    pub const CATEGORY: &str = "Category";

    pub const REQUIRED: [&str; 3] = [DATE, DESCRIPTION, AMOUNT];
}

/// One cell of a statement export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    pub text: String,
    /// False when the source bytes were not valid UTF-8 and `text` is a lossy rendering
    pub readable: bool,
}

impl RawCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            readable: true,
        }
    }

    pub fn unreadable(lossy: impl Into<String>) -> Self {
        Self {
            text: lossy.into(),
            readable: false,
        }
    }
}

/// An empty, readable cell
impl Default for RawCell {
    fn default() -> Self {
        Self::new("")
    }
}

/// One statement row as column → cell, in source column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, RawCell)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, text: &str) -> Self {
        self.insert(column, RawCell::new(text));
        self
    }

    pub fn insert(&mut self, column: &str, cell: RawCell) {
        match self.cells.iter_mut().find(|(c, _)| c == column) {
            Some((_, existing)) => *existing = cell,
            None => self.cells.push((column.to_string(), cell)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&RawCell> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, cell)| cell)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).map(|cell| cell.text.as_str())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, cell)| cell.text.trim().is_empty())
    }
}

/// All rows read from one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    /// File name without directories, e.g. `Amex - Data Export July.csv`
    pub basename: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SourceTable {
    pub fn new(basename: impl Into<String>, headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            basename: basename.into(),
            headers,
            rows,
        }
    }

    /// Build a table from rows alone; headers are the union of row columns.
    pub fn from_rows(basename: impl Into<String>, rows: Vec<RawRow>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in &rows {
            for column in row.columns() {
                if !headers.iter().any(|h| h == column) {
                    headers.push(column.to_string());
                }
            }
        }
        Self::new(basename, headers, rows)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
