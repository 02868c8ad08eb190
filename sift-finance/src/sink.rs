//! Report sinks: where detailed and aggregated tables end up.

use chrono::NaiveDate;
use sift_core::{BucketMode, Result, SiftError};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::aggregator::BucketSummary;
use crate::report::DetailedRow;

/// Persists pipeline output
pub trait ReportSink {
    fn write_detailed(&mut self, rows: &[DetailedRow]) -> Result<()>;
    fn write_summary(&mut self, mode: BucketMode, summaries: &[BucketSummary]) -> Result<()>;
}

/// Writes CSV reports into a directory:
///
/// - `{run_date}_finance.csv`: detailed rows
/// - `{run_date}_summary.csv`: totals over the whole set
/// - `{YYYY-MM}_monthly_summary.csv`: one per month
/// - `{YYYY-MM-DD}_weekly_summary.csv`: one per week, named by its Monday
pub struct CsvDirSink {
    dir: PathBuf,
    run_date: NaiveDate,
    detailed: bool,
    written: Vec<PathBuf>,
}

impl CsvDirSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>, run_date: NaiveDate) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            run_date,
            detailed: true,
            written: Vec::new(),
        })
    }

    /// Skip the detailed report when `false`
    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Files written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn summary_path(&self, mode: BucketMode, summary: &BucketSummary) -> PathBuf {
        let name = match mode {
            BucketMode::Entire => format!("{}_summary.csv", self.run_date.format("%Y-%m-%d")),
            BucketMode::Month => format!("{}_monthly_summary.csv", summary.bucket.label()),
            BucketMode::Week => format!("{}_weekly_summary.csv", summary.bucket.label()),
        };
        self.dir.join(name)
    }

    fn write_summary_file(&mut self, path: PathBuf, mode: BucketMode, summary: &BucketSummary) -> Result<()> {
        let write_err = |source: csv::Error| SiftError::ReportWrite {
            path: path.clone(),
            source,
        };
        let mut wtr = csv::Writer::from_path(&path).map_err(write_err)?;
        wtr.write_record([period_header(mode), "Category", "Amount"])
            .map_err(write_err)?;
        for row in &summary.rows {
            wtr.write_record([row.bucket.label(), row.category.clone(), row.amount_display()])
                .map_err(write_err)?;
        }
        wtr.flush()?;
        info!(path = %path.display(), bucket = %summary.bucket, "summary saved");
        self.written.push(path);
        Ok(())
    }
}

fn period_header(mode: BucketMode) -> &'static str {
    match mode {
        BucketMode::Entire => "Period",
        BucketMode::Month => "Month",
        BucketMode::Week => "Week",
    }
}

impl ReportSink for CsvDirSink {
    fn write_detailed(&mut self, rows: &[DetailedRow]) -> Result<()> {
        if !self.detailed {
            return Ok(());
        }
        let path = self
            .dir
            .join(format!("{}_finance.csv", self.run_date.format("%Y-%m-%d")));
        write_rows(&path, rows)?;
        info!(path = %path.display(), rows = rows.len(), "detailed report saved");
        self.written.push(path);
        Ok(())
    }

    fn write_summary(&mut self, mode: BucketMode, summaries: &[BucketSummary]) -> Result<()> {
        for summary in summaries {
            let path = self.summary_path(mode, summary);
            self.write_summary_file(path, mode, summary)?;
        }
        Ok(())
    }
}

fn write_rows(path: &Path, rows: &[DetailedRow]) -> Result<()> {
    let write_err = |source: csv::Error| SiftError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(write_err)?;
    if rows.is_empty() {
        wtr.write_record(["Date", "Month", "FileOrigin", "Description", "Amount", "Category"])
            .map_err(write_err)?;
    }
    for row in rows {
        wtr.serialize(row).map_err(write_err)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Keeps everything in memory; used for printing and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    pub detailed: Vec<DetailedRow>,
    pub summaries: Vec<(BucketMode, Vec<BucketSummary>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summaries_for(&self, mode: BucketMode) -> Option<&[BucketSummary]> {
        self.summaries
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, s)| s.as_slice())
    }
}

impl ReportSink for MemorySink {
    fn write_detailed(&mut self, rows: &[DetailedRow]) -> Result<()> {
        self.detailed = rows.to_vec();
        Ok(())
    }

    fn write_summary(&mut self, mode: BucketMode, summaries: &[BucketSummary]) -> Result<()> {
        self.summaries.push((mode, summaries.to_vec()));
        Ok(())
    }
}
