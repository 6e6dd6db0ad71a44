mod config;
mod console;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{ArgAction, Parser};
use http_adapter::RansomwareLiveClient;
use markdown_adapter::MarkdownReportWriter;
use ninefive_core::application::{AnalysisOptions, AnalysisServiceImpl, RunSummary};
use ninefive_core::domain::YearOutcome;
use ninefive_core::ports::ReportWriter;
use sqlite_adapter::SqliteVictimStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{FileConfig, Settings};
use crate::console::ConsoleReportWriter;

/// Guesses ransomware groups' working time zones from leak-site post times
#[derive(Parser, Debug)]
#[command(name = "ninefive", version)]
#[command(about = "Fetches leak-site victim posts, stores them and ranks UTC offsets by 9–5 fit")]
pub struct Cli {
    /// Path to the SQLite database that accumulates posts across runs
    #[arg(long = "db")]
    pub db: Option<PathBuf>,

    /// Year to fetch (repeatable); defaults to every year up to now
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i32>,

    /// Skip fetching and analyze what is already stored
    #[arg(long)]
    pub offline: bool,

    /// Base URL of the leak-site aggregator API
    #[arg(long = "api-base", value_name = "URL")]
    pub api_base: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout-secs", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Leave groups with fewer stored posts out of the report
    #[arg(long = "min-posts", value_name = "N")]
    pub min_posts: Option<u64>,

    /// How many candidate countries to list per group
    #[arg(long = "top-countries", value_name = "N")]
    pub top_countries: Option<usize>,

    /// Also write the report as Markdown to this file
    #[arg(long, value_name = "FILE")]
    pub markdown: Option<PathBuf>,

    /// Draw a local-hour bar chart for every group
    #[arg(long)]
    pub plot: bool,

    /// TOML settings file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// Initialize tracing subscriber; RUST_LOG takes precedence over flags
fn init_tracing(verbose: u8, configured: Option<&str>) {
    let level = match verbose {
        0 => configured.unwrap_or("info"),
        1 => "debug",
        _ => "trace",
    };
    let targets = [
        "ninefive",
        "ninefive_core",
        "sqlite_adapter",
        "http_adapter",
        "markdown_adapter",
    ];
    let directives = targets
        .iter()
        .map(|target| format!("{}={}", target, level))
        .fold("warn".to_string(), |acc, d| acc + "," + &d);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_ingest(summary: &RunSummary) {
    let Some(ingest) = &summary.ingest else {
        return;
    };
    for outcome in &ingest.years {
        if let YearOutcome::Failed { year, reason } = outcome {
            println!("Error fetching {}: {}", year, reason);
        }
    }
    println!("Retrieved {} records from the API.", ingest.accepted());
    println!("Stored {} new records.", ingest.inserted);
    println!("Total records in DB: {}", ingest.total_stored);
}

fn run(cli: Cli) -> Result<RunSummary> {
    let file = match &cli.config {
        Some(path) => config::load_file(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&cli, file, Utc::now().year())?;
    init_tracing(cli.verbose, settings.log_level.as_deref());
    debug!(?settings, "resolved settings");

    // Instantiate concrete implementations of secondary adapters
    let source = RansomwareLiveClient::new(&settings.api_base, settings.timeout)?;
    let store = SqliteVictimStore::open(&settings.db_path)
        .with_context(|| format!("cannot open store {}", settings.db_path.display()))?;

    let mut writers: Vec<Box<dyn ReportWriter>> =
        vec![Box::new(ConsoleReportWriter::new(settings.plot))];
    if let Some(path) = &settings.markdown {
        writers.push(Box::new(MarkdownReportWriter::new(path)));
    }

    // Instantiate the core business service with dependency injection
    let service = AnalysisServiceImpl::new(
        Box::new(source),
        Box::new(store),
        writers,
        AnalysisOptions {
            min_posts: settings.min_posts,
            top_countries: settings.top_countries,
        },
    );

    if !settings.years.is_empty() {
        println!(
            "Fetching victims for {} year(s) from {}...",
            settings.years.len(),
            settings.api_base
        );
    }

    // Execute the primary port method
    Ok(service.execute_analysis(&settings.years)?)
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(summary) => {
            print_ingest(&summary);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
