//! Category totals per time bucket.

use serde::Serialize;
use sift_core::{Bucket, BucketMode, CategoryTotal, NOTHING, TOTAL, Transaction};
use sift_ingest::ReportLine;
use std::collections::{BTreeMap, HashMap};

/// Category totals of one bucket; the last row is always `Total`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket: Bucket,
    pub rows: Vec<CategoryTotal>,
}

impl BucketSummary {
    fn from_sums(bucket: Bucket, sums: BTreeMap<String, f64>) -> Self {
        let mut rows: Vec<CategoryTotal> = sums
            .into_iter()
            .filter(|(category, amount)| category != NOTHING && *amount != 0.0)
            .map(|(category, amount)| CategoryTotal::new(bucket, category, amount))
            .collect();
        let total: f64 = rows.iter().map(|r| r.amount).sum();
        rows.push(CategoryTotal::new(bucket, TOTAL, total));
        Self { bucket, rows }
    }

    /// Grand total of the bucket
    pub fn total(&self) -> f64 {
        self.rows.last().map(|r| r.amount).unwrap_or(0.0)
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.amount)
    }

    /// Category rows without the trailing `Total`
    pub fn categories(&self) -> &[CategoryTotal] {
        &self.rows[..self.rows.len().saturating_sub(1)]
    }
}

/// Sum classified transactions per category for every bucket of `mode`.
///
/// Rows classified as `Error` are left out, as are undated rows when
/// bucketing by month or week. Rows without a parsable amount still open
/// their bucket but add nothing to it.
pub fn summarize(txns: &[Transaction], mode: BucketMode) -> Vec<BucketSummary> {
    let mut buckets: BTreeMap<Bucket, BTreeMap<String, f64>> = BTreeMap::new();

    for txn in txns {
        let Some(category) = &txn.category else {
            continue;
        };
        if category.is_error() {
            continue;
        }
        let Some(bucket) = Bucket::for_date(mode, txn.date) else {
            continue;
        };
        let sums = buckets.entry(bucket).or_default();
        if let Some(amount) = txn.amount {
            *sums.entry(category.label().to_string()).or_insert(0.0) += amount;
        }
    }

    buckets
        .into_iter()
        .map(|(bucket, sums)| BucketSummary::from_sums(bucket, sums))
        .collect()
}

/// Category totals of a written report, largest first, with `Total` last.
///
/// A `Total` row already present in the report is reused rather than
/// recomputed.
pub fn ranked_totals(lines: &[ReportLine]) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for line in lines {
        if line.category == NOTHING {
            continue;
        }
        if let Some(amount) = line.amount {
            *sums.entry(line.category.as_str()).or_insert(0.0) += amount;
        }
    }

    let reported_total = sums.remove(TOTAL);
    let mut rows: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, amount)| CategoryTotal::new(Bucket::Entire, category, amount))
        .collect();
    rows.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));

    let total = reported_total.unwrap_or_else(|| rows.iter().map(|r| r.amount).sum());
    rows.push(CategoryTotal::new(Bucket::Entire, TOTAL, total));
    rows
}
