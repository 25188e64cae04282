use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use sea_jobs::config::Config;
use sea_jobs::pipeline::ingestion::{discover_inputs, read_raw_batch};
use sea_jobs::pipeline::output::export_batch;
use sea_jobs::pipeline::processing::enrich::date::{Clock, FixedClock, SystemClock};
use sea_jobs::pipeline::storage::{persist, persist_combined, SqliteJobStore, COMBINED_TABLE};
use sea_jobs::{logging, metrics, CanonicalJobRecord, CategoryConfig, Pipeline, RunReport, SourceId};

#[derive(Parser)]
#[command(name = "sea_jobs")]
#[command(about = "Normalize and enrich job listings from South-East Asian job boards")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform one source's raw dump
    Transform {
        /// Source code, e.g. jobsdbsg
        #[arg(long)]
        source: String,
        /// JSON array of raw records
        #[arg(long)]
        input: PathBuf,
        /// Directory for the CSV export (defaults to the configured output_dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// SQLite file to dedup against and append to
        #[arg(long)]
        db: Option<PathBuf>,
        /// Evaluate relative dates against this RFC 3339 instant instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Transform every `<source>.json` dump in a directory, one task per source
    Run {
        #[arg(long)]
        input_dir: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// List supported source codes
    Sources,
}

struct Settings {
    categories: Arc<CategoryConfig>,
    output_dir: PathBuf,
    db: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

fn load_categories(config: &Config) -> anyhow::Result<CategoryConfig> {
    let categories = match &config.categories_path {
        Some(path) => CategoryConfig::load(path)?,
        None => CategoryConfig::builtin()?,
    };
    Ok(categories)
}

struct SourceOutcome {
    report: RunReport,
    inserted: Option<usize>,
    records: Vec<CanonicalJobRecord>,
}

/// Everything one source goes through: read, transform, export, persist
fn process_source(settings: &Settings, source: SourceId, input: &Path) -> anyhow::Result<SourceOutcome> {
    let raw = read_raw_batch(input).with_context(|| format!("reading {}", input.display()))?;
    let pipeline = Pipeline::new(&settings.categories)?;
    let run = pipeline.run(source, &raw, settings.clock.as_ref());

    export_batch(&settings.output_dir, source, &run.records)?;

    let inserted = match &settings.db {
        Some(db) => {
            let store = SqliteJobStore::open(db)?;
            Some(persist(&store, source, run.records.clone())?)
        }
        None => None,
    };
    Ok(SourceOutcome {
        report: run.report,
        inserted,
        records: run.records,
    })
}

fn print_summary(report: &RunReport, inserted: Option<usize>) {
    println!("\n📊 Results for {}:", report.source);
    println!("   Raw records: {}", report.total_raw);
    println!("   Emitted: {}", report.emitted);
    println!("   Dropped (incomplete): {}", report.dropped_missing());
    println!("   Dropped (duplicate link): {}", report.dropped_duplicates());
    println!("   Field warnings: {}", report.warnings());
    if let Some(n) = inserted {
        println!("   New rows stored: {}", n);
    }
}

async fn run_all(settings: Arc<Settings>, input_dir: &Path) -> anyhow::Result<()> {
    let inputs = discover_inputs(input_dir)?;
    if inputs.is_empty() {
        warn!("No source dumps found in {}", input_dir.display());
        return Ok(());
    }

    let mut handles = Vec::new();
    for (source, path) in inputs {
        let settings = settings.clone();
        let handle = tokio::task::spawn_blocking(move || process_source(&settings, source, &path));
        handles.push((source, handle));
    }

    let mut failed = 0;
    let mut combined = Vec::new();
    for (source, handle) in handles {
        match handle.await {
            Ok(Ok(outcome)) => {
                print_summary(&outcome.report, outcome.inserted);
                combined.extend(outcome.records);
            }
            Ok(Err(e)) => {
                failed += 1;
                error!("{} failed: {:#}", source, e);
            }
            Err(e) => {
                failed += 1;
                error!("{} task panicked: {}", source, e);
            }
        }
    }

    // Sources that succeeded are still merged when another one failed
    if let Some(db) = &settings.db {
        let store = SqliteJobStore::open(db)?;
        let inserted = persist_combined(&store, combined)?;
        println!("\n🗂️  Combined table {}: {} new rows", COMBINED_TABLE, inserted);
    }

    if failed > 0 {
        anyhow::bail!("{} source(s) failed", failed);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load()?;
    let _log_guard = logging::init_logging(&config.log_dir);
    metrics::init_metrics();

    let build_settings = |output_dir: Option<PathBuf>,
                          db: Option<PathBuf>,
                          now: Option<DateTime<Utc>>|
     -> anyhow::Result<Settings> {
        let clock: Arc<dyn Clock> = match now {
            Some(instant) => Arc::new(FixedClock(instant)),
            None => Arc::new(SystemClock),
        };
        Ok(Settings {
            categories: Arc::new(load_categories(&config)?),
            output_dir: output_dir.unwrap_or_else(|| config.output_dir.clone()),
            db: db.or_else(|| config.store_path.clone()),
            clock,
        })
    };

    match cli.command {
        Commands::Transform {
            source,
            input,
            output_dir,
            db,
            now,
        } => {
            let source: SourceId = source.parse()?;
            let settings = build_settings(output_dir, db, now)?;
            info!("🚀 Transforming {} from {}", source, input.display());
            let outcome = process_source(&settings, source, &input)?;
            print_summary(&outcome.report, outcome.inserted);
        }
        Commands::Run {
            input_dir,
            output_dir,
            db,
            now,
        } => {
            let settings = Arc::new(build_settings(output_dir, db, now)?);
            info!("🚀 Transforming all sources in {}", input_dir.display());
            run_all(settings, &input_dir).await?;
        }
        Commands::Sources => {
            for source in SourceId::ALL {
                let config = source.config();
                println!("{:<16} {:<28} {}", source.as_str(), config.base_url, config.timezone.name());
            }
        }
    }

    Ok(())
}
