//! Pipeline orchestration: normalize → merge → classify → aggregate → sink.

use serde::Serialize;
use sift_core::{BucketMode, KeywordTable, Result, SiftError, Transaction};
use sift_ingest::{SourceTable, normalize_source};
use tracing::{info, warn};

use crate::aggregator::{BucketSummary, summarize};
use crate::classifier::{Classifier, ClassifierOptions, ClassifyStats};
use crate::report::{DetailedRow, detailed_rows, sort_detailed};
use crate::sink::ReportSink;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub classifier: ClassifierOptions,
    /// Summaries to produce, in this order
    pub modes: Vec<BucketMode>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            classifier: ClassifierOptions::default(),
            modes: vec![BucketMode::Month],
        }
    }
}

/// Row counts for one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCount {
    pub file_origin: String,
    pub rows: usize,
}

/// What happened during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub files: Vec<FileCount>,
    pub classified: ClassifyStats,
    pub undated: usize,
    pub unparsable_amounts: usize,
}

impl RunSummary {
    /// Rows whose category ended up as `Error`
    pub fn error_rows(&self) -> usize {
        self.classified.errors
    }
}

/// Everything a run produces before it is handed to a sink
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Classified transactions in report order
    pub transactions: Vec<Transaction>,
    pub detailed: Vec<DetailedRow>,
    pub summaries: Vec<(BucketMode, Vec<BucketSummary>)>,
    pub run: RunSummary,
}

impl PipelineOutput {
    pub fn summaries_for(&self, mode: BucketMode) -> Option<&[BucketSummary]> {
        self.summaries
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, s)| s.as_slice())
    }
}

pub struct Pipeline<'a> {
    keywords: &'a KeywordTable,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(keywords: &'a KeywordTable, options: PipelineOptions) -> Self {
        Self { keywords, options }
    }

    /// Normalize each source in order, then process the merged rows.
    pub fn process(&self, sources: &[SourceTable]) -> Result<PipelineOutput> {
        let mut batches = Vec::with_capacity(sources.len());
        for source in sources {
            batches.push(normalize_source(source)?);
        }
        self.process_normalized(batches)
    }

    /// Process per-file batches that were already normalized. Batches are
    /// merged in the order given.
    pub fn process_normalized(&self, batches: Vec<Vec<Transaction>>) -> Result<PipelineOutput> {
        let mut run = RunSummary::default();
        let mut transactions = Vec::new();
        for batch in batches {
            if let Some(first) = batch.first() {
                run.files.push(FileCount {
                    file_origin: first.file_origin.clone(),
                    rows: batch.len(),
                });
            }
            transactions.extend(batch);
        }

        if transactions.is_empty() {
            return Err(SiftError::NoInputData);
        }
        if self.keywords.is_empty() {
            return Err(SiftError::EmptyKeywordTable {
                origin: "keyword table passed to the pipeline".to_string(),
            });
        }

        let classifier = Classifier::new(self.keywords, self.options.classifier);
        run.classified = classifier.classify_all(&mut transactions);
        run.rows = transactions.len();
        run.undated = transactions.iter().filter(|t| t.date.is_none()).count();
        run.unparsable_amounts = transactions.iter().filter(|t| t.amount.is_none()).count();

        if run.classified.errors > 0 {
            warn!(rows = run.classified.errors, "rows could not be categorized");
        }
        if run.undated > 0 {
            warn!(rows = run.undated, "rows have no parsable date and are left out of dated summaries");
        }
        if run.unparsable_amounts > 0 {
            warn!(rows = run.unparsable_amounts, "rows have no parsable amount and are left out of totals");
        }

        sort_detailed(&mut transactions);
        let summaries = self
            .options
            .modes
            .iter()
            .map(|&mode| (mode, summarize(&transactions, mode)))
            .collect();
        let detailed = detailed_rows(&transactions);

        info!(
            rows = run.rows,
            files = run.files.len(),
            uncategorized = run.classified.uncategorized,
            "categorization complete"
        );

        Ok(PipelineOutput {
            transactions,
            detailed,
            summaries,
            run,
        })
    }

    /// Process `sources` and hand the results to `sink`. Nothing reaches
    /// the sink when the run fails.
    pub fn run<S: ReportSink + ?Sized>(&self, sources: &[SourceTable], sink: &mut S) -> Result<RunSummary> {
        let output = self.process(sources)?;
        deliver(output, sink)
    }

    /// [`Pipeline::run`] for already normalized batches
    pub fn run_normalized<S: ReportSink + ?Sized>(
        &self,
        batches: Vec<Vec<Transaction>>,
        sink: &mut S,
    ) -> Result<RunSummary> {
        let output = self.process_normalized(batches)?;
        deliver(output, sink)
    }
}

fn deliver<S: ReportSink + ?Sized>(output: PipelineOutput, sink: &mut S) -> Result<RunSummary> {
    sink.write_detailed(&output.detailed)?;
    for (mode, summaries) in &output.summaries {
        sink.write_summary(*mode, summaries)?;
    }
    Ok(output.run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use sift_core::Category;
    use sift_ingest::RawRow;

    fn keywords() -> KeywordTable {
        [("tesco", "Groceries"), ("tfl", "Transport"), ("transfer", "Nothing")]
            .into_iter()
            .collect()
    }

    fn row(date: &str, description: &str, amount: &str) -> RawRow {
        RawRow::new()
            .with("Date", date)
            .with("Description", description)
            .with("Amount", amount)
    }

    fn sources() -> Vec<SourceTable> {
        vec![
            SourceTable::from_rows(
                "Monzo Data Export.csv",
                vec![
                    row("02/07/2024", "TESCO STORES", "-20.00"),
                    row("01/07/2024", "TfL travel", "-3.10"),
                    row("03/07/2024", "Savings", "-50.00"),
                ],
            ),
            SourceTable::from_rows(
                "Amex - Data Export July.csv",
                vec![row("01/07/2024", "TESCO.COM", "15.00"), row("bad", "mystery", "x")],
            ),
        ]
    }

    #[test]
    fn test_end_to_end_in_memory() {
        let keywords = keywords();
        let options = PipelineOptions {
            modes: vec![BucketMode::Entire, BucketMode::Month],
            ..PipelineOptions::default()
        };
        let mut sink = MemorySink::new();
        let run = Pipeline::new(&keywords, options).run(&sources(), &mut sink).unwrap();

        assert_eq!(run.rows, 5);
        assert_eq!(run.files.len(), 2);
        assert_eq!(run.files[1].file_origin, "Amex July");
        assert_eq!(run.undated, 1);
        assert_eq!(run.unparsable_amounts, 1);
        assert_eq!(run.classified.preassigned, 1);
        assert_eq!(run.classified.uncategorized, 1);

        let order: Vec<_> = sink.detailed.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(order, vec!["TESCO.COM", "TfL travel", "TESCO STORES", "Savings", "mystery"]);
        assert_eq!(sink.detailed[0].amount, "-15.00");

        let entire = &sink.summaries_for(BucketMode::Entire).unwrap()[0];
        assert_eq!(entire.get("Groceries"), Some(-35.0));
        assert_eq!(entire.get("Savings"), Some(-50.0));
        assert_eq!(entire.get("Uncategorized"), None);
        assert!((entire.total() - -88.1).abs() < 1e-9);

        let monthly = sink.summaries_for(BucketMode::Month).unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].bucket.label(), "2024-07");
    }

    #[test]
    fn test_empty_input_is_fatal_and_sink_untouched() {
        let keywords = keywords();
        let mut sink = MemorySink::new();
        let empty = vec![SourceTable::from_rows("Monzo.csv", vec![])];

        let err = Pipeline::new(&keywords, PipelineOptions::default())
            .run(&empty, &mut sink)
            .unwrap_err();
        assert!(matches!(err, SiftError::NoInputData));
        assert!(sink.detailed.is_empty());
        assert!(sink.summaries.is_empty());

        let err = Pipeline::new(&keywords, PipelineOptions::default())
            .process(&[])
            .unwrap_err();
        assert!(matches!(err, SiftError::NoInputData));
    }

    #[test]
    fn test_file_without_description_column_classifies_by_name() {
        let keywords = keywords();
        let source = SourceTable::from_rows(
            "bank.csv",
            vec![RawRow::new()
                .with("Date", "03/07/2024")
                .with("Name", "Tesco")
                .with("Amount", "-5.00")],
        );
        let output = Pipeline::new(&keywords, PipelineOptions::default())
            .process(&[source])
            .unwrap();

        assert_eq!(output.run.error_rows(), 0);
        assert_eq!(
            output.transactions[0].category,
            Some(Category::Keyword("Groceries".into()))
        );
        let monthly = output.summaries_for(BucketMode::Month).unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].get("Groceries"), Some(-5.0));
        assert_eq!(monthly[0].total(), -5.0);
    }

    #[test]
    fn test_empty_keyword_table_is_fatal() {
        let keywords = KeywordTable::new();
        let err = Pipeline::new(&keywords, PipelineOptions::default())
            .process(&sources())
            .unwrap_err();
        assert!(matches!(err, SiftError::EmptyKeywordTable { .. }));
    }

    #[test]
    fn test_categories_stay_in_allowed_set() {
        let keywords = keywords();
        let output = Pipeline::new(&keywords, PipelineOptions::default())
            .process(&sources())
            .unwrap();
        for txn in &output.transactions {
            let category = txn.category.as_ref().unwrap();
            let allowed = match category {
                Category::Keyword(label) => keywords.has_category(label),
                Category::Savings | Category::Uncategorized | Category::Error => true,
                Category::Transfers => false,
            };
            assert!(allowed, "unexpected category {category}");
        }
    }

    #[test]
    fn test_runs_are_identical() {
        let keywords = keywords();
        let pipeline = Pipeline::new(
            &keywords,
            PipelineOptions {
                modes: BucketMode::ALL.to_vec(),
                ..PipelineOptions::default()
            },
        );
        let first = pipeline.process(&sources()).unwrap();
        let second = pipeline.process(&sources()).unwrap();
        assert_eq!(first.detailed, second.detailed);
        assert_eq!(first.summaries, second.summaries);
        assert_eq!(first.run, second.run);
    }
}
