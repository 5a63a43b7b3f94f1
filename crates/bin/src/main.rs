//! kessan CLI binary.
//!
//! Ingests financial statements, derives the reconciled, valuation and
//! growth datasets and stores them in SQLite.

mod config;
mod loader;
mod logging;
mod store_manager;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{Credentials, Settings};
use kessan::{Pipeline, rederive};
use kessan_data::{DEFAULT_TABLE_PREFIX, ResultStore};
use kessan_output::{ExportFormat, RunSummary, export_pipeline_output};
use loader::StatementSource;
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "kessan")]
#[command(
    about = "kessan: valuation and growth metrics from financial disclosures",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// SQLite database file
    #[arg(long, global = true, env = "KESSAN_DB_PATH")]
    db: Option<PathBuf>,

    /// Table name prefix
    #[arg(long, global = true, env = "KESSAN_TABLE_PREFIX", default_value = DEFAULT_TABLE_PREFIX)]
    prefix: String,

    /// Process companies one after another instead of in parallel
    #[arg(long, global = true, env = "KESSAN_SEQUENTIAL")]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest statements, derive every dataset and store the results
    Run(RunArgs),

    /// Re-derive the datasets from the stored raw table
    Derive(OutputArgs),

    /// Show row counts of the stored tables
    Stats,
}

#[derive(Args)]
struct RunArgs {
    /// Statement files (`{"statements": [...]}`)
    #[arg(long, num_args = 1.., conflicts_with_all = ["fetch_date", "fetch_code"])]
    statements: Vec<PathBuf>,

    /// Company directory file (`{"info": [...]}`); fetched from the API when omitted
    #[arg(long)]
    companies: Option<PathBuf>,

    /// Fetch statements disclosed on these dates (YYYY-MM-DD)
    #[arg(long, num_args = 1..)]
    fetch_date: Vec<NaiveDate>,

    /// Fetch statements of this issue code
    #[arg(long)]
    fetch_code: Option<String>,

    /// J-Quants account email
    #[arg(long, env = "JQUANTS_EMAIL", hide_env_values = true)]
    email: Option<String>,

    /// J-Quants account password
    #[arg(long, env = "JQUANTS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Also export the derived datasets into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Export format
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,

    /// Print the run summary as markdown
    #[arg(long)]
    markdown: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
    PrettyJson,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
            FormatArg::PrettyJson => Self::PrettyJson,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.global.db, cli.global.prefix, cli.global.sequential);

    match cli.command {
        Commands::Run(args) => run_all(&settings, args).await?,
        Commands::Derive(output) => derive(&settings, &output)?,
        Commands::Stats => print_stats(&settings)?,
    }

    Ok(())
}

fn open_store(settings: &Settings) -> Result<ResultStore, Box<dyn std::error::Error>> {
    info!(path = %settings.db_path.display(), prefix = %settings.prefix, "opening store");
    Ok(store_manager::open_store(&settings.db_path, &settings.prefix)?)
}

async fn run_all(settings: &Settings, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = StatementSource::from_args(args.statements, args.fetch_date, args.fetch_code)?;
    let credentials = Credentials::from_parts(args.email, args.password);
    let store = open_store(settings)?;

    let started = Utc::now();
    let loaded = loader::load(
        &source,
        args.companies.as_deref(),
        credentials.as_ref(),
        started,
    )
    .await?;
    store.replace_raw(&loaded.records)?;

    let input = loaded.records.len();
    let output = Pipeline::new(settings.pipeline.clone()).run_at(loaded.records, started);
    store.replace_derived(&output)?;

    finish(settings, &args.output, &output, input)?;
    println!(
        "Statements: {} read, {} kept, {} foreign/REIT, {} unknown company",
        loaded.stats.total,
        loaded.stats.kept,
        loaded.stats.skipped_foreign_or_reit,
        loaded.stats.unknown_company
    );
    Ok(())
}

fn derive(settings: &Settings, output_args: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(settings)?;
    let (output, input) = rederive(&store, settings.pipeline.clone(), Utc::now())?;
    finish(settings, output_args, &output, input)
}

fn finish(
    settings: &Settings,
    args: &OutputArgs,
    output: &kessan::PipelineOutput,
    input: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &args.export_dir {
        let files = export_pipeline_output(output, dir, &settings.prefix, args.format.into())?;
        for file in files {
            println!("Exported {}", file.display());
        }
    }

    let summary = RunSummary::from_output(settings.prefix.as_str(), input, output);
    if args.markdown {
        println!("{}", summary.to_markdown());
    } else {
        println!("{}", summary);
    }
    Ok(())
}

fn print_stats(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(settings)?;
    let counts = store.table_counts()?;
    let tables = store.tables();

    println!("\nStore: {}", settings.db_path.display());
    println!("{}", "=".repeat(48));
    for (table, rows) in [
        (&tables.raw, counts.raw),
        (&tables.reconciled, counts.reconciled),
        (&tables.valuation, counts.valuation),
        (&tables.sales_growth, counts.sales_growth),
    ] {
        println!("  {:<32}{:>12}", table, rows);
    }
    Ok(())
}
