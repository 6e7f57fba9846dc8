//! CLI entry point for the taxi demand preparation tool.
//!
//! Loads a demand CSV from a file or URL, adds the scaled columns, and writes
//! the prepared dataset plus a JSON report of the dashboard series.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use taxi_demand_prep::{
    config::PrepConfig,
    dataset::Dataset,
    fetch::{BasicClient, load_source},
    output::{print_json, print_preview, write_dataset, write_json},
    parser::parse_dataset,
    prepare::prepare,
    report::DashboardReport,
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "taxi_demand_prep")]
#[command(about = "Prepare Seoul accessible-taxi demand data for the dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add scaled columns and compute the dashboard series
    Prepare {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// CSV file to write the prepared dataset to
        #[arg(short, long, default_value = "prepared.csv")]
        output: String,

        /// Optional: JSON file to write the dashboard report to
        #[arg(long)]
        report: Option<String>,

        /// Input encoding label (overrides config and TAXI_PREP_ENCODING)
        #[arg(short, long)]
        encoding: Option<String>,

        /// Gzip compress the prepared CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Optional: JSON config file
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Show the first rows of a file or URL
    Preview {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Number of rows to show (defaults to the config value)
        #[arg(short = 'n', long)]
        rows: Option<usize>,

        /// Input encoding label (overrides config and TAXI_PREP_ENCODING)
        #[arg(short, long)]
        encoding: Option<String>,

        /// Optional: JSON config file
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/taxi_demand_prep.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("taxi_demand_prep.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare {
            source,
            output,
            report,
            encoding,
            gzip,
            config,
        } => {
            let config = PrepConfig::resolve(config.as_deref(), encoding)?;
            run_prepare(&source, &output, report.as_deref(), gzip, &config).await?;
        }
        Commands::Preview {
            source,
            rows,
            encoding,
            config,
        } => {
            let mut config = PrepConfig::resolve(config.as_deref(), encoding)?;
            if let Some(rows) = rows {
                config.preview_rows = rows;
            }

            let dataset = load_dataset(&source, &config).await?;
            info!(
                rows = dataset.row_count(),
                columns = dataset.columns().len(),
                "Dataset loaded"
            );
            print_preview(&dataset.head(config.preview_rows));
        }
    }

    Ok(())
}

/// Loads and parses the source with the configured encoding.
#[tracing::instrument(skip(config), fields(encoding = %config.encoding))]
async fn load_dataset(source: &str, config: &PrepConfig) -> Result<Dataset> {
    let encoding = config.encoding()?;
    let bytes = load_source(&BasicClient::new(), source).await?;
    let dataset =
        parse_dataset(&bytes, encoding).with_context(|| format!("failed to parse {source}"))?;
    Ok(dataset)
}

/// Prepares one input and writes the prepared CSV and, optionally, the report.
#[tracing::instrument(skip(config))]
async fn run_prepare(
    source: &str,
    output: &str,
    report: Option<&str>,
    gzip: bool,
    config: &PrepConfig,
) -> Result<()> {
    let dataset = load_dataset(source, config).await?;
    let prepared = prepare(&dataset).with_context(|| format!("failed to prepare {source}"))?;

    let derived: Vec<&str> = prepared.derived.iter().map(|d| d.name.as_str()).collect();
    info!(
        rows = prepared.dataset.row_count(),
        derived = ?derived,
        warnings = prepared.warnings.len(),
        "Dataset prepared"
    );

    match &prepared.district_summary {
        Some(summary) => print_json(summary)?,
        None => info!("No district summary: district or num_boardings column missing"),
    }

    write_dataset(output, &prepared.dataset, gzip)
        .with_context(|| format!("failed to write {output}"))?;
    info!(output, "Prepared dataset written");

    if let Some(path) = report {
        let dashboard = DashboardReport::build(source, &prepared, config)?;
        write_json(path, &dashboard).with_context(|| format!("failed to write {path}"))?;
        info!(path, "Dashboard report written");
    }

    Ok(())
}
