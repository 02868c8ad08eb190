//! Deterministic keyword classifier.
//!
//! Fields are tried in priority order (description, name, transfers); within
//! a field the keyword table is scanned in order and the first keyword found
//! as a substring decides the category.

use serde::{Deserialize, Serialize};
use sift_core::{Category, KeywordTable, TextField, Transaction};
use thiserror::Error;
use tracing::warn;

const POT_TRANSFER: &str = "pot transfer";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierOptions {
    /// Assign `Transfers` to unmatched rows mentioning "pot transfer"
    #[serde(default)]
    pub pot_transfer_fallback: bool,
}

/// Why a single row could not be classified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("{} field is not valid UTF-8", .field.column())]
    MalformedField { field: TextField },
}

/// Counts from classifying a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassifyStats {
    pub matched: usize,
    pub preassigned: usize,
    pub uncategorized: usize,
    pub errors: usize,
}

pub struct Classifier<'a> {
    keywords: &'a KeywordTable,
    options: ClassifierOptions,
}

impl<'a> Classifier<'a> {
    pub fn new(keywords: &'a KeywordTable, options: ClassifierOptions) -> Self {
        Self { keywords, options }
    }

    /// Category for `txn`. A category assigned during normalization is final.
    pub fn try_classify(&self, txn: &Transaction) -> Result<Category, ClassifyError> {
        if let Some(category) = &txn.category {
            return Ok(category.clone());
        }

        for field in TextField::PRIORITY {
            if txn.is_unreadable(field) {
                return Err(ClassifyError::MalformedField { field });
            }
            let Some(text) = txn.field(field) else {
                continue;
            };
            let text = text.to_lowercase();
            if text.is_empty() || text == "nan" {
                continue;
            }
            if let Some(category) = self.keywords.first_match(&text) {
                return Ok(Category::Keyword(category.to_string()));
            }
        }

        if self.options.pot_transfer_fallback && mentions_pot_transfer(txn) {
            return Ok(Category::Transfers);
        }

        Ok(Category::Uncategorized)
    }

    /// Set `txn.category`, falling back to `Error` when the row can't be read.
    pub fn classify(&self, txn: &mut Transaction) -> Result<(), ClassifyError> {
        match self.try_classify(txn) {
            Ok(category) => {
                txn.category = Some(category);
                Ok(())
            }
            Err(err) => {
                warn!(
                    file = %txn.file_origin,
                    description = %txn.description,
                    error = %err,
                    "error categorizing row"
                );
                txn.category = Some(Category::Error);
                Err(err)
            }
        }
    }

    pub fn classify_all(&self, txns: &mut [Transaction]) -> ClassifyStats {
        let mut stats = ClassifyStats::default();
        for txn in txns.iter_mut() {
            let preassigned = txn.category.is_some();
            if self.classify(txn).is_err() {
                stats.errors += 1;
                continue;
            }
            match &txn.category {
                _ if preassigned => stats.preassigned += 1,
                Some(Category::Uncategorized) => stats.uncategorized += 1,
                _ => stats.matched += 1,
            }
        }
        stats
    }
}

fn mentions_pot_transfer(txn: &Transaction) -> bool {
    TextField::PRIORITY
        .into_iter()
        .filter_map(|field| txn.field(field))
        .any(|text| text.to_lowercase().contains(POT_TRANSFER))
}
