//! Field normalization: turn a raw export row into a [`Transaction`] whose
//! description identifies the counterparty.
//!
//! Exports disagree on where the useful text lives. Some leave
//! `Description` blank and put a label in `Category`; others put a card
//! reference or account number in `Description` and the merchant in `Name`.
//! Card issuers also list charges as positive amounts, the opposite of bank
//! accounts.

use chrono::NaiveDate;
use regex::Regex;
use sift_core::{Category, Result, TextField, Transaction};
use tracing::{debug, warn};

use crate::types::{RawCell, RawRow, SourceTable, columns};

/// Filename tokens that carry no provenance
const ORIGIN_NOISE: [&str; 3] = ["-", "Data", "Export"];

/// Label for a source file, e.g. `Amex - Data Export July.csv` → `Amex July`.
pub fn file_origin(basename: &str) -> String {
    basename
        .split(' ')
        .filter(|part| !ORIGIN_NOISE.contains(part))
        .map(strip_csv_suffix)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_csv_suffix(part: &str) -> &str {
    let n = part.len();
    if n >= 4 && part.is_char_boundary(n - 4) && part[n - 4..].eq_ignore_ascii_case(".csv") {
        &part[..n - 4]
    } else {
        part
    }
}

/// Card issuers whose exports list charges as positive amounts
pub fn has_inverted_amounts(basename: &str) -> bool {
    let lower = basename.to_lowercase();
    lower.contains("amex") || lower.contains("american express")
}

/// Parse a `dd/mm/yyyy` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").ok()
}

/// Parse a signed amount, tolerating thousands separators and a leading
/// currency symbol.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim().replace(',', "");
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.as_str()),
    };
    let rest = rest.trim_start_matches(['£', '$', '€']);
    if rest.is_empty() {
        return None;
    }
    let value: f64 = rest.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Normalizes every row of one source file
pub struct FieldNormalizer {
    masked_code: Regex,
    origin: String,
    invert_amounts: bool,
}

impl FieldNormalizer {
    pub fn for_file(basename: &str) -> Result<Self> {
        Ok(Self {
            // Card/reference codes such as T1253000070
            masked_code: Regex::new(r"^[A-Za-z0-9]{7,}$")?,
            origin: file_origin(basename),
            invert_amounts: has_inverted_amounts(basename),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Description is a number, an account/reference number, or a masked code
    pub fn is_reference_like(&self, description: &str) -> bool {
        let compact: String = description.chars().filter(|c| *c != ' ' && *c != '.').collect();
        let numeric = !compact.is_empty() && compact.chars().all(char::is_numeric);
        let digits = description.chars().filter(char::is_ascii_digit).count();
        numeric || digits > 5 || self.masked_code.is_match(description)
    }

    pub fn normalize(&self, row: &RawRow) -> Transaction {
        let mut description = row.get(columns::DESCRIPTION).cloned();

        let blank = description.as_ref().is_none_or(|c| c.text.is_empty());
        if blank {
            if let Some(category) = row.get(columns::CATEGORY) {
                debug!(category = %category.text, "description taken from Category");
                description = Some(category.clone());
            }
        }

        if let Some(name) = row.get(columns::NAME) {
            // "Savings" also fits the masked-code shape but must survive for the override
            let replace = description
                .as_ref()
                .is_some_and(|c| !is_savings(&c.text) && self.is_reference_like(&c.text));
            if replace {
                debug!(name = %name.text, "description replaced by Name");
                description = Some(name.clone());
            }
        }

        let description = description.unwrap_or_else(|| RawCell::new(""));
        let mut txn = Transaction::new(self.origin.clone(), description.text.clone());
        if !description.readable {
            txn.mark_unreadable(TextField::Description);
        }
        txn.name = take_text(&mut txn, row.get(columns::NAME), TextField::Name);
        txn.transfers = take_text(&mut txn, row.get(columns::TRANSFERS), TextField::Transfers);

        txn.date = row.text(columns::DATE).and_then(parse_date);
        txn.amount = row
            .text(columns::AMOUNT)
            .and_then(parse_amount)
            .map(|amount| if self.invert_amounts { -amount } else { amount });

        if is_savings(&txn.description) {
            txn.category = Some(Category::Savings);
        }
        txn
    }
}

fn is_savings(description: &str) -> bool {
    description.to_lowercase() == "savings"
}

fn take_text(txn: &mut Transaction, cell: Option<&RawCell>, field: TextField) -> Option<String> {
    let cell = cell?;
    if !cell.readable {
        txn.mark_unreadable(field);
    }
    Some(cell.text.clone())
}

/// Normalize all rows of a source file, in file order.
pub fn normalize_source(table: &SourceTable) -> Result<Vec<Transaction>> {
    let missing: Vec<&str> = columns::REQUIRED
        .into_iter()
        .filter(|c| !table.has_column(c))
        .collect();
    if !missing.is_empty() && !table.is_empty() {
        warn!(file = %table.basename, ?missing, "source file lacks expected columns");
    }

    let normalizer = FieldNormalizer::for_file(&table.basename)?;
    Ok(table.rows.iter().map(|row| normalizer.normalize(row)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(basename: &str) -> FieldNormalizer {
        FieldNormalizer::for_file(basename).unwrap()
    }

    #[test]
    fn test_file_origin() {
        assert_eq!(file_origin("Amex - Data Export July.csv"), "Amex July");
        assert_eq!(file_origin("Monzo Data Export - 2024.CSV"), "Monzo 2024");
        assert_eq!(file_origin("statement.csv"), "statement");
        assert_eq!(file_origin("notes"), "notes");
    }

    #[test]
    fn test_amex_amounts_are_negated() {
        let row = RawRow::new()
            .with("Date", "05/07/2024")
            .with("Description", "DELIVEROO")
            .with("Amount", "50.00");
        let txn = normalizer("Amex Export - July.csv").normalize(&row);
        assert_eq!(txn.amount, Some(-50.0));
        assert_eq!(txn.file_origin, "Amex July");

        let txn = normalizer("American Express.csv").normalize(&row);
        assert_eq!(txn.amount, Some(-50.0));

        let txn = normalizer("Monzo.csv").normalize(&row);
        assert_eq!(txn.amount, Some(50.0));
    }

    #[test]
    fn test_numeric_description_replaced_by_name() {
        let row = RawRow::new()
            .with("Description", "1234567890123")
            .with("Name", "Coffee Shop")
            .with("Amount", "-3.20");
        let txn = normalizer("bank.csv").normalize(&row);
        assert_eq!(txn.description, "Coffee Shop");
        assert_eq!(txn.name.as_deref(), Some("Coffee Shop"));
    }

    #[test]
    fn test_reference_like_descriptions() {
        let n = normalizer("bank.csv");
        assert!(n.is_reference_like("12 34.56"));
        assert!(n.is_reference_like("Card 123456"));
        assert!(n.is_reference_like("T1253000070"));
        assert!(n.is_reference_like("ABCDEFG"));
        assert!(!n.is_reference_like("ABC DEFG"));
        assert!(!n.is_reference_like("TESCO STORES 3021"));
        assert!(!n.is_reference_like(""));
    }

    #[test]
    fn test_reference_kept_without_name_column() {
        let row = RawRow::new().with("Description", "T1253000070").with("Amount", "1");
        let txn = normalizer("bank.csv").normalize(&row);
        assert_eq!(txn.description, "T1253000070");
        assert_eq!(txn.name, None);
    }

    #[test]
    fn test_blank_description_uses_category_column() {
        let row = RawRow::new()
            .with("Description", "")
            .with("Category", "Eating out")
            .with("Name", "Pret");
        let txn = normalizer("Monzo.csv").normalize(&row);
        assert_eq!(txn.description, "Eating out");
    }

    #[test]
    fn test_substituted_category_can_still_be_replaced_by_name() {
        let row = RawRow::new()
            .with("Category", "00012345")
            .with("Name", "Landlord");
        let txn = normalizer("Monzo.csv").normalize(&row);
        assert_eq!(txn.description, "Landlord");
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let row = RawRow::new().with("Amount", "1.00");
        let txn = normalizer("bank.csv").normalize(&row);
        assert_eq!(txn.description, "");
        assert_eq!(txn.category, None);
    }

    #[test]
    fn test_row_without_description_column_stays_readable() {
        let row = RawRow::new()
            .with("Date", "03/07/2024")
            .with("Name", "Tesco")
            .with("Amount", "-5.00");
        let txn = normalizer("bank.csv").normalize(&row);
        assert_eq!(txn.description, "");
        assert!(!txn.is_unreadable(TextField::Description));
        assert!(txn.unreadable.is_empty());
        assert_eq!(txn.name.as_deref(), Some("Tesco"));
        assert_eq!(txn.amount, Some(-5.0));
    }

    #[test]
    fn test_whitespace_description_is_not_blank() {
        let row = RawRow::new()
            .with("Description", "  ")
            .with("Category", "Groceries");
        let txn = normalizer("Monzo.csv").normalize(&row);
        assert_eq!(txn.description, "  ");
    }

    #[test]
    fn test_savings_override() {
        let row = RawRow::new().with("Description", "SAVINGS").with("Name", "Tesco");
        let txn = normalizer("bank.csv").normalize(&row);
        assert_eq!(txn.description, "SAVINGS");
        assert_eq!(txn.category, Some(Category::Savings));

        let row = RawRow::new().with("Description", "savings pot");
        let txn = normalizer("bank.csv").normalize(&row);
        assert_eq!(txn.category, None);
    }

    #[test]
    fn test_dates_are_day_first() {
        assert_eq!(parse_date("26/10/2024"), NaiveDate::from_ymd_opt(2024, 10, 26));
        assert_eq!(parse_date(" 01/02/2024 "), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(parse_date("2024-10-26"), None);
        assert_eq!(parse_date("31/02/2024"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-12.50"), Some(-12.5));
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("£7.20"), Some(7.2));
        assert_eq!(parse_amount("-£7.20"), Some(-7.2));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_unparsable_values_become_none() {
        let row = RawRow::new()
            .with("Date", "yesterday")
            .with("Description", "Shop")
            .with("Amount", "??");
        let txn = normalizer("Amex.csv").normalize(&row);
        assert_eq!(txn.date, None);
        assert_eq!(txn.amount, None);
    }

    #[test]
    fn test_unreadable_name_flag_follows_substitution() {
        let mut row = RawRow::new().with("Description", "99999999");
        row.insert("Name", RawCell::unreadable("Caf\u{fffd}"));
        let txn = normalizer("bank.csv").normalize(&row);
        assert!(txn.is_unreadable(TextField::Description));
        assert!(txn.is_unreadable(TextField::Name));
    }

    #[test]
    fn test_normalize_source_keeps_order() {
        let table = SourceTable::from_rows(
            "Amex - Data Export July.csv",
            vec![
                RawRow::new().with("Date", "01/07/2024").with("Description", "A").with("Amount", "1"),
                RawRow::new().with("Date", "02/07/2024").with("Description", "B").with("Amount", "2"),
            ],
        );
        let txns = normalize_source(&table).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "A");
        assert_eq!(txns[1].amount, Some(-2.0));
        assert!(txns.iter().all(|t| t.file_origin == "Amex July"));
    }
}
