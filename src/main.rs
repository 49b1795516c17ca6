use analytics::AnalyticsEngine;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use configuration::{load_config, Config, Logging};
use core_types::{AgentFilter, FilterContext, PeriodId, Portfolio};
use records_io::{load_portfolio, write_csv, ExportLayout, ExportScope};
use std::fs::File;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod render;

const LOG_FILE_PREFIX: &str = "residuals.log";

/// The main entry point for the residuals dashboard.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from '{}'", cli.config.display()))?;
    // Dropping the guard flushes the file writer, so it lives until exit.
    let _log_guard = init_logging(&config.logging)?;

    let portfolio = load_portfolio(&config.periods).context("Failed to load the residuals files")?;

    match cli.command {
        Commands::Report(args) => handle_report(args, &config, &portfolio),
        Commands::Valuation(args) => handle_valuation(args, &config, &portfolio),
        Commands::Agents => {
            render::print_agents(&portfolio.agents());
            Ok(())
        }
        Commands::Export(args) => handle_export(args, &portfolio),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Residuals portfolio analytics and valuation.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the full dashboard for one period and agent.
    Report(ReportArgs),
    /// Show only the valuation breakdown.
    Valuation(SelectionArgs),
    /// List every agent found in the loaded periods.
    Agents,
    /// Write the selected merchants to a CSV file.
    Export(ExportArgs),
}

#[derive(Args)]
struct SelectionArgs {
    /// Period name, or "total" for every period combined. Defaults to the latest period.
    #[arg(long)]
    period: Option<PeriodId>,

    /// Agent name, or "all".
    #[arg(long, default_value = "all")]
    agent: AgentFilter,
}

impl SelectionArgs {
    fn context(&self, portfolio: &Portfolio) -> FilterContext {
        let period = self
            .period
            .clone()
            .unwrap_or_else(|| PeriodId::named(portfolio.latest().name.clone()));
        FilterContext::new(period, self.agent.clone())
    }
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Export only merchants with a negative residual.
    #[arg(long)]
    negative_only: bool,

    /// Include the Gross Profit column.
    #[arg(long)]
    detailed: bool,

    /// Output file. Defaults to a timestamped name in the working directory.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn handle_report(args: ReportArgs, config: &Config, portfolio: &Portfolio) -> Result<()> {
    let engine = AnalyticsEngine::from_config(config).context("Invalid valuation settings")?;
    let context = args.selection.context(portfolio);
    let report = engine.calculate(portfolio, &context)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report);
    }
    Ok(())
}

fn handle_valuation(args: SelectionArgs, config: &Config, portfolio: &Portfolio) -> Result<()> {
    let engine = AnalyticsEngine::from_config(config).context("Invalid valuation settings")?;
    let context = args.context(portfolio);
    let valuation = engine.value(portfolio, &context)?;

    println!("Valuation: {} / {}", context.period, context.agent);
    render::print_valuation(&valuation);
    Ok(())
}

fn handle_export(args: ExportArgs, portfolio: &Portfolio) -> Result<()> {
    let context = args.selection.context(portfolio);
    let view = portfolio.view(&context)?;

    let scope = if args.negative_only { ExportScope::NegativeOnly } else { ExportScope::All };
    let layout = if args.detailed { ExportLayout::Detailed } else { ExportLayout::Standard };
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(export_file_name(scope, &view.period_name, Utc::now())));

    let file = File::create(&path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    let rows = write_csv(scope.select(&view.current), layout, file)?;

    tracing::info!(rows, path = %path.display(), "Export complete.");
    println!("Exported {} merchants to {}", rows, path.display());
    Ok(())
}

/// Default export name, e.g. `residuals-negative-november-20261018-142501.csv`.
fn export_file_name(scope: ExportScope, period_name: &str, now: DateTime<Utc>) -> String {
    let period = period_name.trim().to_lowercase().replace(char::is_whitespace, "-");
    format!("residuals-{}-{}-{}.csv", scope.label(), period, now.format("%Y%m%d-%H%M%S"))
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Logs go to stderr so `--json` output stays machine-readable. When a log
/// directory is configured, the same events are also appended to a
/// daily-rolling file; the returned guard must be held until exit.
fn init_logging(logging: &Logging) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let subscriber = builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(file_writer))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(Some(guard))
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(None)
        }
    }
}
