//! Detailed transaction report.

use serde::Serialize;
use sift_core::{Transaction, format_amount};
use std::cmp::Ordering;

/// One line of the detailed report, already rendered for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "FileOrigin")]
    pub file_origin: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Category")]
    pub category: String,
}

impl From<&Transaction> for DetailedRow {
    fn from(txn: &Transaction) -> Self {
        Self {
            date: txn
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            month: txn.month_key().unwrap_or_default(),
            file_origin: txn.file_origin.clone(),
            description: txn.description.clone(),
            amount: txn.amount.map(format_amount).unwrap_or_default(),
            category: txn.category_label().to_string(),
        }
    }
}

/// Order by date (undated rows last), then category label. The sort is
/// stable so equal keys keep their input order.
pub fn sort_detailed(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| {
        compare_dates(a, b).then_with(|| a.category_label().cmp(b.category_label()))
    });
}

fn compare_dates(a: &Transaction, b: &Transaction) -> Ordering {
    match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Render already sorted transactions.
pub fn detailed_rows(txns: &[Transaction]) -> Vec<DetailedRow> {
    txns.iter().map(DetailedRow::from).collect()
}
