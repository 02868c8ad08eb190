//! Time buckets for aggregation: the whole set, calendar months, and weeks
//! starting on Monday.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How transactions are grouped before summing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketMode {
    Entire,
    Month,
    Week,
}

impl BucketMode {
    pub const ALL: [BucketMode; 3] = [BucketMode::Entire, BucketMode::Month, BucketMode::Week];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketMode::Entire => "entire",
            BucketMode::Month => "month",
            BucketMode::Week => "week",
        }
    }
}

impl FromStr for BucketMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entire" | "all" | "none" => Ok(BucketMode::Entire),
            "month" | "monthly" => Ok(BucketMode::Month),
            "week" | "weekly" => Ok(BucketMode::Week),
            other => Err(format!("unknown bucket mode: {other}")),
        }
    }
}

impl fmt::Display for BucketMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete aggregation key. Ordering is chronological within a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Entire,
    Month { year: i32, month: u32 },
    Week(NaiveDate),
}

impl Bucket {
    /// Bucket of a row under `mode`. Undated rows only fit the whole set.
    pub fn for_date(mode: BucketMode, date: Option<NaiveDate>) -> Option<Bucket> {
        match (mode, date) {
            (BucketMode::Entire, _) => Some(Bucket::Entire),
            (BucketMode::Month, Some(d)) => Some(Bucket::Month {
                year: d.year(),
                month: d.month(),
            }),
            (BucketMode::Week, Some(d)) => Some(Bucket::Week(week_start(d))),
            (_, None) => None,
        }
    }

    /// `All`, `YYYY-MM`, or the week's Monday as `YYYY-MM-DD`
    pub fn label(&self) -> String {
        match self {
            Bucket::Entire => "All".to_string(),
            Bucket::Month { year, month } => format!("{year:04}-{month:02}"),
            Bucket::Week(start) => start.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Summed amount of one category within one bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub bucket: Bucket,
    pub category: String,
    pub amount: f64,
}

impl CategoryTotal {
    pub fn new(bucket: Bucket, category: impl Into<String>, amount: f64) -> Self {
        Self {
            bucket,
            category: category.into(),
            amount,
        }
    }

    /// Amount rendered with two decimals
    pub fn amount_display(&self) -> String {
        format_amount(self.amount)
    }
}

/// Render an amount to exactly two decimal places.
pub fn format_amount(amount: f64) -> String {
    let s = format!("{amount:.2}");
    // tiny negatives round to "-0.00"
    if s == "-0.00" { "0.00".to_string() } else { s }
}
