use analytics::AnalyticsEngine;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::settings::Config;
use configuration::{ImportSettings, LoggingSettings, OutputFormat};
use core_types::TradeRecord;
use importer::ExportImporter;
use render::Section;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod render;

/// The main entry point for the options journal.
fn main() -> Result<()> {
    // Load JOURNAL__* overrides and RUST_LOG from a .env file when present.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let _guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args, config, Section::All),
        Commands::Weekly(args) => handle_report(args, config, Section::Weekly),
        Commands::Overnight(args) => handle_report(args, config, Section::Overnight),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Trade metrics for an options trading journal, built from a brokerage export.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full journal report.
    Report(ReportArgs),
    /// Print the weekly P&L breakdown and the Mon-Fri grid.
    Weekly(ReportArgs),
    /// Print the overnight-hold analysis.
    Overnight(ReportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// The brokerage transaction export (CSV).
    #[arg(long)]
    file: PathBuf,

    /// Output format; overrides `report.format` from the configuration.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Only show weeks starting on or before this date in the daily grid (format: YYYY-MM-DD).
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Report closed trades even when some positions are still open.
    #[arg(long)]
    allow_open: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Handles the import -> match -> aggregate -> render pipeline.
fn handle_report(args: ReportArgs, mut config: Config, section: Section) -> Result<()> {
    if args.until.is_some() {
        config.report.daily_breakdown_until = args.until;
    }
    if args.allow_open {
        config.import.allow_open_positions = true;
    }
    let format = args.format.unwrap_or(config.report.format);

    let trades = load_trades(&args.file, &config.import)?;

    let engine = AnalyticsEngine::new(config.report).context("Invalid report settings")?;
    let report = engine
        .build_report(&trades)
        .context("Failed to aggregate trades")?;

    println!("{}", render::render(&report, format, section)?);
    Ok(())
}

/// Reads the export and reconstructs closed round-trip trades from its fills.
fn load_trades(path: &Path, settings: &ImportSettings) -> Result<Vec<TradeRecord>> {
    let outcome = ExportImporter::new(settings.on_invalid_row)
        .import_path(path)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let matched = matcher::match_fills(&outcome.fills).context("Failed to match fills")?;

    if settings.allow_open_positions {
        for lot in &matched.open_lots {
            tracing::warn!(
                contract = %lot.contract,
                opened_on = %lot.opened_on,
                remaining = lot.remaining,
                "Position still open; excluded from the report."
            );
        }
        return Ok(matched.trades);
    }

    matched
        .into_closed()
        .context("Export contains positions that were never closed (use --allow-open to report anyway)")
}

/// Installs the global tracing subscriber. Logs go to stderr, or to a
/// daily-rolling file when `logging.directory` is configured.
fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(Some(guard))
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(None)
        }
    }
}
