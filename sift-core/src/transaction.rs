//! Transaction record and category types shared by every stage of the pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Category label excluded from every aggregate.
pub const NOTHING: &str = "Nothing";

/// Label of the synthetic per-bucket grand total row.
pub const TOTAL: &str = "Total";

/// Free-text fields the classifier reads, in priority order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TextField {
    Description,
    Name,
    Transfers,
}

impl TextField {
    /// Order in which the classifier consults the fields
    pub const PRIORITY: [TextField; 3] = [TextField::Description, TextField::Name, TextField::Transfers];

    /// Column header used by statement exports
    pub fn column(&self) -> &'static str {
        match self {
            TextField::Description => "Description",
            TextField::Name => "Name",
            TextField::Transfers => "Transfers",
        }
    }
}

/// Category assigned to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// A category taken from the keyword table
    Keyword(String),
    /// Forced when the description is literally "savings"
    Savings,
    /// Optional fallback for "pot transfer" rows
    Transfers,
    /// No keyword matched
    Uncategorized,
    /// Classification failed for this row
    Error,
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Category::Keyword(label) => label,
            Category::Savings => "Savings",
            Category::Transfers => "Transfers",
            Category::Uncategorized => "Uncategorized",
            Category::Error => "Error",
        }
    }

    /// Parse a label as written in a report back into a category.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Savings" => Category::Savings,
            "Transfers" => Category::Transfers,
            "Uncategorized" => Category::Uncategorized,
            "Error" => Category::Error,
            other => Category::Keyword(other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Category::Error)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Category::from_label(&label))
    }
}

/// One statement row, normalized and (eventually) categorized
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Booking date; `None` when the source value did not parse
    pub date: Option<NaiveDate>,
    /// Text that identifies the counterparty; never null after normalization
    pub description: String,
    /// Alternate label some exports provide
    pub name: Option<String>,
    pub transfers: Option<String>,
    /// Signed amount; `None` when the source value did not parse
    pub amount: Option<f64>,
    /// Label derived from the source filename
    pub file_origin: String,
    pub category: Option<Category>,
    /// Text fields whose source bytes were not valid UTF-8
    #[serde(default)]
    pub unreadable: Vec<TextField>,
}

impl Transaction {
    pub fn new(file_origin: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            date: None,
            description: description.into(),
            name: None,
            transfers: None,
            amount: None,
            file_origin: file_origin.into(),
            category: None,
            unreadable: Vec::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transfers(mut self, transfers: impl Into<String>) -> Self {
        self.transfers = Some(transfers.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Text of one of the classifier's fields, if the row has it
    pub fn field(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Description => Some(&self.description),
            TextField::Name => self.name.as_deref(),
            TextField::Transfers => self.transfers.as_deref(),
        }
    }

    pub fn is_unreadable(&self, field: TextField) -> bool {
        self.unreadable.contains(&field)
    }

    pub fn mark_unreadable(&mut self, field: TextField) {
        if !self.unreadable.contains(&field) {
            self.unreadable.push(field);
        }
    }

    /// Category label, or an empty string before classification
    pub fn category_label(&self) -> &str {
        self.category.as_ref().map(Category::label).unwrap_or("")
    }

    /// `YYYY-MM` of the booking date
    pub fn month_key(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m").to_string())
    }
}
