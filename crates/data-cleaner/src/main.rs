//! CLI entry point for the data cleaner.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use data_cleaner::{
    CleaningConfig, CleaningEngine, CleaningOutcome, CleaningStrategy, ColumnClassifier, Exporter,
    NormalizationScope, ReportGenerator, TableLoader, TextNormalizer,
};
use dotenv::dotenv;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(feature = "ai")]
use data_cleaner::CachingNormalizer;
#[cfg(feature = "ai")]
use data_cleaner::normalizer::{GeminiConfig, GeminiNormalizer};
#[cfg(feature = "ai")]
use std::env;

/// CLI-compatible cleaning strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliStrategy {
    /// Remove every row containing a missing value
    Drop,
    /// Fill numeric columns with the mean, categorical with the mode
    Mean,
    /// Fill numeric columns with the median, categorical with the mode
    Median,
}

impl From<CliStrategy> for CleaningStrategy {
    fn from(cli: CliStrategy) -> Self {
        match cli {
            CliStrategy::Drop => CleaningStrategy::Drop,
            CliStrategy::Mean => CleaningStrategy::Mean,
            CliStrategy::Median => CleaningStrategy::Median,
        }
    }
}

/// CLI-compatible normalization scope enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliScope {
    /// Normalize every categorical cell
    All,
    /// Normalize only cells that were filled
    Filled,
}

impl From<CliScope> for NormalizationScope {
    fn from(cli: CliScope) -> Self {
        match cli {
            CliScope::All => NormalizationScope::AllCells,
            CliScope::Filled => NormalizationScope::FilledCells,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Missing-value imputation and categorical normalization",
    long_about = "Fills or drops missing values in a CSV, TSV or XLSX file and corrects \
                  categorical values.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GEMINI_API_KEY    API key for Gemini (enables value normalization)\n\n\
                  EXAMPLES:\n  \
                  # Fill numeric columns with the median\n  \
                  data-cleaner -i data.csv --strategy median\n\n  \
                  # Preview the per-column plan\n  \
                  data-cleaner -i data.csv --strategy mean --plan\n\n  \
                  # Fill without normalizing\n  \
                  data-cleaner -i data.xlsx --strategy mean --no-normalize"
)]
struct Args {
    /// Path to the CSV, TSV or XLSX file to clean
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "./output")]
    output: String,

    /// Custom output file name (without extension)
    ///
    /// If not specified, uses "{input_stem}_cleaned_data"
    #[arg(long)]
    output_name: Option<String>,

    /// Cleaning strategy
    ///
    /// If not specified, tables with categorical columns are cleaned by
    /// dropping incomplete rows; all-numeric tables require a strategy
    #[arg(short, long, value_enum)]
    strategy: Option<CliStrategy>,

    /// Do not normalize categorical values
    #[arg(long)]
    no_normalize: bool,

    /// Which categorical cells to normalize
    #[arg(long, value_enum, default_value = "all")]
    normalize_scope: CliScope,

    /// Maximum number of normalization requests in flight
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Gemini model used for normalization
    #[arg(long)]
    model: Option<String>,

    /// Timeout for each normalization request in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Show the per-column plan without cleaning
    #[arg(long)]
    plan: bool,

    /// Print the first rows of the original and cleaned tables
    #[arg(long)]
    preview: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON report to stdout instead of a human-readable summary
    #[arg(long)]
    json: bool,

    /// Write the JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so that stdout only
/// carries JSON.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let data = TableLoader::load_path(&args.input)?;

    let strategy = resolve_strategy(&args, &data)?;

    let mut config_builder = CleaningConfig::builder()
        .output_dir(&args.output)
        .normalize_categoricals(!args.no_normalize)
        .normalization_scope(args.normalize_scope.into())
        .normalization_concurrency(args.concurrency);

    if let Some(ref name) = args.output_name {
        config_builder = config_builder.output_name(name);
    }

    let config = config_builder.build()?;
    let engine = build_engine(&args, config)?;

    if args.plan {
        return print_plan(&engine, &data, strategy, &args);
    }

    match engine.clean(&data, strategy) {
        Ok(outcome) => handle_output(&outcome, &data, &args),
        Err(e) => {
            error!("Cleaning failed: {}", e);
            Err(anyhow!("Cleaning failed: {}", e))
        }
    }
}

/// Pick the strategy from the flag, or fall back to dropping rows when the
/// table has categorical columns.
fn resolve_strategy(args: &Args, data: &DataFrame) -> Result<CleaningStrategy> {
    if let Some(strategy) = args.strategy {
        return Ok(strategy.into());
    }

    let kinds = ColumnClassifier::classify(data);
    match CleaningStrategy::fast_path(&kinds) {
        Some(strategy) => {
            info!(
                "Categorical columns detected; using {} (pass --strategy to override)",
                strategy
            );
            Ok(strategy)
        }
        None => Err(anyhow!(
            "All columns are numeric; choose one of --strategy drop|mean|median"
        )),
    }
}

fn build_engine(args: &Args, config: CleaningConfig) -> Result<CleaningEngine> {
    let mut builder = CleaningEngine::builder().config(config);

    if let Some(normalizer) = build_normalizer(args)? {
        builder = builder.normalizer(normalizer);
    }

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Gemini normalizer from `GEMINI_API_KEY`, memoized per value.
#[cfg(feature = "ai")]
fn build_normalizer(args: &Args) -> Result<Option<Arc<dyn TextNormalizer>>> {
    if args.no_normalize {
        info!("Normalization disabled");
        return Ok(None);
    }

    let api_key = match env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            warn!("GEMINI_API_KEY not set. Categorical values will not be normalized.");
            return Ok(None);
        }
    };

    let mut config = GeminiConfig::builder().timeout_secs(args.timeout_secs);
    if let Some(ref model) = args.model {
        config = config.model(model);
    }

    let normalizer = GeminiNormalizer::with_config(api_key, config.build())?;
    info!("Normalizing with Gemini ({})", normalizer.config().model);

    Ok(Some(Arc::new(CachingNormalizer::new(normalizer))))
}

/// No remote normalizer without the "ai" feature.
#[cfg(not(feature = "ai"))]
fn build_normalizer(args: &Args) -> Result<Option<Arc<dyn TextNormalizer>>> {
    if !args.no_normalize {
        warn!("AI support not compiled in. Categorical values will not be normalized.");
        warn!("Compile with --features ai to enable normalization.");
    }
    Ok(None)
}

/// Print the per-column plan.
///
/// Uses `println!` on purpose: this output is the point of `--plan` and
/// must be visible at any log level.
fn print_plan(
    engine: &CleaningEngine,
    data: &DataFrame,
    strategy: CleaningStrategy,
    args: &Args,
) -> Result<()> {
    let plans = engine.plan(data, strategy)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("CLEANING PLAN ({})", strategy);
    println!("{}\n", "=".repeat(80));
    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    println!(
        "{:<24} {:<12} {:<10} {:<20} {:<10}",
        "Column", "Kind", "Missing", "Fill", "Normalize"
    );
    println!("{}", "-".repeat(80));

    for plan in &plans {
        let fill = match (&plan.fill, &plan.skipped_reason) {
            (Some(fill), _) => fill.to_string(),
            (None, Some(_)) => "skipped".to_string(),
            (None, None) => "-".to_string(),
        };
        println!(
            "{:<24} {:<12} {:<10} {:<20} {:<10}",
            truncate_str(&plan.name, 23),
            plan.kind,
            plan.missing,
            truncate_str(&fill, 19),
            if plan.normalize { "yes" } else { "no" }
        );
    }
    println!();

    match engine.active_normalizer() {
        Some(name) => println!("Normalizer: {}", name),
        None => println!("Normalizer: none"),
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Write outputs and print results.
///
/// - Default: human-readable summary to stdout
/// - `--json`: report JSON to stdout only
/// - `--emit-report`: report JSON written to the output directory
fn handle_output(outcome: &CleaningOutcome, original: &DataFrame, args: &Args) -> Result<()> {
    let stem = extract_file_stem(&args.input);

    let exporter = Exporter::new(&args.output);
    let output_path = exporter.write_csv(&outcome.table, &stem, args.output_name.as_deref())?;

    if args.emit_report {
        let generator = ReportGenerator::new(std::path::PathBuf::from(&args.output));
        let report_path = generator.write_report_to_file(&outcome.report, &stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input,
        original.height(),
        original.width()
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        output_path.display(),
        outcome.table.height(),
        outcome.table.width()
    );
    println!();

    for line in ReportGenerator::summary_lines(&outcome.report) {
        println!("{}", line);
    }
    println!();

    if !outcome.report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &outcome.report.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    if args.preview {
        println!("Original data:");
        println!("{}", original.head(Some(5)));
        println!();
        println!("Cleaned data:");
        println!("{}", outcome.table.head(Some(5)));
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save detailed JSON report");
    println!("{}", "=".repeat(80));

    Ok(())
}
