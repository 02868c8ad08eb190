use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sift_core::{BucketMode, CategoryTotal, KeywordTable, Transaction};
use sift_finance::{
    BucketSummary, ClassifierOptions, CsvDirSink, MemorySink, Pipeline, PipelineOptions,
    RunSummary, ranked_totals,
};
use sift_ingest::{
    list_source_files, load_keyword_table, normalize_source, read_categorized_report, read_source_csv,
};
use std::path::{Path, PathBuf};
use tracing::info;

mod bootstrap;
mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "sift",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SIFT_BUILD_SHA"), ")"),
    about = "Categorize bank statement exports and summarize spending"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG wins
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Default)]
struct InputArgs {
    /// Directory of statement CSV exports
    #[arg(long)]
    input: Option<PathBuf>,

    /// Keyword CSV with `Keyword` and `Category` columns
    #[arg(long)]
    keywords: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Categorize every export in the input directory and write reports
    Run {
        #[command(flatten)]
        inputs: InputArgs,

        /// Directory for the generated reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write one summary per calendar month
        #[arg(long)]
        monthly: bool,

        /// Write one summary per week (weeks start on Monday)
        #[arg(long)]
        weekly: bool,

        /// Skip the whole-set summary
        #[arg(long)]
        no_entire: bool,

        /// Skip the detailed per-transaction report
        #[arg(long)]
        no_detailed: bool,

        /// Put unmatched "pot transfer" rows under Transfers
        #[arg(long)]
        pot_transfers: bool,
    },

    /// Categorize in memory and print category totals
    Summary {
        #[command(flatten)]
        inputs: InputArgs,

        /// Grouping: entire, month or week
        #[arg(long, default_value = "entire")]
        by: BucketMode,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Ranked category totals of previously written reports
    Totals {
        #[arg(required = true)]
        reports: Vec<PathBuf>,
    },

    /// Manage ~/.sift/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    bootstrap::setup_logging(cli.log_level.as_deref().unwrap_or(&cfg.logging.level));

    match cli.command {
        Command::Run {
            inputs,
            output,
            monthly,
            weekly,
            no_entire,
            no_detailed,
            pot_transfers,
        } => {
            let options = PipelineOptions {
                classifier: ClassifierOptions {
                    pot_transfer_fallback: pot_transfers || cfg.classifier.pot_transfer_fallback,
                },
                modes: run_modes(&cfg, monthly, weekly, no_entire),
            };
            let output = output.unwrap_or_else(|| state::expand_home(&cfg.paths.output_dir));
            let detailed = cfg.reports.detailed && !no_detailed;
            run_reports(&cfg, &inputs, options, &output, detailed).await?;
        }

        Command::Summary { inputs, by, json } => {
            let options = PipelineOptions {
                classifier: cfg.classifier,
                modes: vec![by],
            };
            print_summary(&cfg, &inputs, options, json).await?;
        }

        Command::Totals { reports } => {
            for path in &reports {
                let lines = read_categorized_report(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                println!("{}\n", path.display());
                print_totals(&ranked_totals(&lines));
                println!();
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

/// Report modes for `sift run`: config defaults, flags switch modes on,
/// `--no-entire` switches the whole-set summary off.
fn run_modes(cfg: &Config, monthly: bool, weekly: bool, no_entire: bool) -> Vec<BucketMode> {
    let mut reports = cfg.reports.clone();
    reports.monthly |= monthly;
    reports.weekly |= weekly;
    reports.entire &= !no_entire;
    reports.modes()
}

fn keyword_path(cfg: &Config, inputs: &InputArgs) -> PathBuf {
    inputs
        .keywords
        .clone()
        .unwrap_or_else(|| state::expand_home(&cfg.paths.keyword_file))
}

fn input_dir(cfg: &Config, inputs: &InputArgs) -> PathBuf {
    inputs
        .input
        .clone()
        .unwrap_or_else(|| state::expand_home(&cfg.paths.input_dir))
}

/// Keyword table plus normalized rows of every export, per file in name order.
async fn load_inputs(cfg: &Config, inputs: &InputArgs) -> Result<(KeywordTable, Vec<Vec<Transaction>>)> {
    let keyword_file = keyword_path(cfg, inputs);
    let keywords = load_keyword_table(&keyword_file)
        .with_context(|| format!("loading keywords from {}", keyword_file.display()))?;

    let dir = input_dir(cfg, inputs);
    let files = list_source_files(&dir).with_context(|| format!("listing {}", dir.display()))?;
    if files.is_empty() {
        bail!("No CSV files found in {} (pass --input <dir>)", dir.display());
    }
    Ok((keywords, read_all(files).await?))
}

/// Read and normalize files on blocking tasks; results keep input order.
async fn read_all(files: Vec<PathBuf>) -> Result<Vec<Vec<Transaction>>> {
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            tokio::task::spawn_blocking(move || -> Result<Vec<Transaction>> {
                let table = read_source_csv(&path).with_context(|| format!("reading {}", path.display()))?;
                normalize_source(&table).with_context(|| format!("normalizing {}", path.display()))
            })
        })
        .collect();

    let mut batches = Vec::with_capacity(handles.len());
    for handle in handles {
        batches.push(handle.await.context("reader task failed")??);
    }
    Ok(batches)
}

async fn run_reports(
    cfg: &Config,
    inputs: &InputArgs,
    options: PipelineOptions,
    output: &Path,
    detailed: bool,
) -> Result<()> {
    let (keywords, batches) = load_inputs(cfg, inputs).await?;
    let run_date = chrono::Local::now().date_naive();
    let mut sink = CsvDirSink::new(output, run_date)
        .with_context(|| format!("preparing {}", output.display()))?
        .with_detailed(detailed);

    let run = Pipeline::new(&keywords, options)
        .run_normalized(batches, &mut sink)
        .context("categorization failed")?;
    info!(reports = sink.written().len(), dir = %output.display(), "reports written");

    print_run(&run);
    println!("\nReports:");
    for path in sink.written() {
        println!("- {}", path.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    mode: &'static str,
    run: &'a RunSummary,
    buckets: &'a [BucketSummary],
}

async fn print_summary(cfg: &Config, inputs: &InputArgs, options: PipelineOptions, json: bool) -> Result<()> {
    let mode = options.modes.first().copied().unwrap_or(BucketMode::Entire);
    let (keywords, batches) = load_inputs(cfg, inputs).await?;
    let mut sink = MemorySink::new();
    let run = Pipeline::new(&keywords, options)
        .run_normalized(batches, &mut sink)
        .context("categorization failed")?;
    let buckets = sink.summaries_for(mode).unwrap_or_default();

    if json {
        let out = SummaryJson {
            mode: mode.as_str(),
            run: &run,
            buckets,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_run(&run);
    for summary in buckets {
        println!("\n## {}\n", summary.bucket);
        print_totals(&summary.rows);
    }
    Ok(())
}

fn print_run(run: &RunSummary) {
    println!("Categorized {} transactions from {} files", run.rows, run.files.len());
    for file in &run.files {
        println!("- {}: {} rows", file.file_origin, file.rows);
    }
    println!(
        "matched={} preassigned={} uncategorized={} errors={}",
        run.classified.matched,
        run.classified.preassigned,
        run.classified.uncategorized,
        run.error_rows()
    );
    if run.undated > 0 || run.unparsable_amounts > 0 {
        println!(
            "undated={} unparsable amounts={}",
            run.undated, run.unparsable_amounts
        );
    }
}

fn print_totals(rows: &[CategoryTotal]) {
    let width = rows.iter().map(|r| r.category.len()).max().unwrap_or(0);
    for row in rows {
        println!("{:<width$}  {:>12}", row.category, row.amount_display());
    }
}
