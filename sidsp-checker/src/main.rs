//! sidsp-checker - SIDSP application presence checker
//!
//! Reads an Excel/CSV file, checks each row's customer TRN against the SIDSP
//! API and writes a CSV report to the output directory.
//!
//! Ctrl+C stops after the row in flight is abandoned; finished rows are saved
//! to a `results_partial_*.csv` report.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use sidsp_checker::transport::{HttpTransport, Throttled};
use sidsp_checker::{auth, batch, input, report};
use sidsp_common::config::load_toml_config;
use sidsp_common::{LoggingConfig, Settings, SettingsOverrides, TomlConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for sidsp-checker
#[derive(Parser, Debug)]
#[command(name = "sidsp-checker")]
#[command(about = "Check application presence via the SIDSP API")]
#[command(version)]
#[command(after_help = "Examples:\n  \
    sidsp-checker input.xlsx\n  \
    sidsp-checker data.csv --output-dir reports\n  \
    sidsp-checker file.xlsx --dry-run")]
struct Args {
    /// Path to input Excel (.xlsx, .xls, .xlsm, .ods) or CSV file
    input_file: PathBuf,

    /// Directory for the output CSV
    #[arg(long, default_value = "out")]
    output_dir: PathBuf,

    /// TOML config file (default: ~/.config/sidsp/checker.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SIDSP API base URL (overrides SIDSP_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Default academic year (overrides SIDSP_CHECK_YEAR)
    #[arg(long)]
    year: Option<String>,

    /// Load and validate input without making API calls
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Config is read before logging so its [logging] section can apply
    let toml_config = load_toml_config(args.config.as_deref());
    let logging = toml_config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();

    if let Err(e) = init_logging(&logging, args.debug) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    info!(
        "Starting SIDSP checker v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let result = match toml_config {
        Ok(toml_config) => run(args, toml_config).await,
        Err(e) => Err(anyhow::Error::new(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, toml_config: TomlConfig) -> Result<()> {
    let overrides = SettingsOverrides {
        base_url: args.base_url.clone(),
        check_year: args.year.clone(),
    };
    let settings = Settings::resolve(&toml_config, &overrides)?;
    info!("Base URL: {}", settings.base_url);
    info!("Check Year: {}", settings.check_year);

    info!("Loading data from {}...", args.input_file.display());
    let rows = input::load_input(&args.input_file, settings.excel_header_row)
        .with_context(|| format!("Failed to load {}", args.input_file.display()))?;
    info!("Loaded {} rows", rows.len());

    if args.dry_run {
        info!("DRY RUN MODE - No API calls will be made");
        match rows.first() {
            Some(row) => info!("Sample row: {:?}", row),
            None => info!("Sample row: No data"),
        }
        info!("Dry run complete. Use without --dry-run to process.");
        return Ok(());
    }

    let transport = HttpTransport::new(settings.base_url.clone(), settings.timeout())?;
    let transport = auth::authenticate(transport, &settings).await?;
    let transport = Throttled::new(transport, settings.rate_limit());

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted by user. Saving partial results...");
                cancel.cancel();
            }
        }
    });

    info!("Starting API checks...");
    let run = batch::run_batch(&transport, &rows, &settings.check_year, &cancel).await;
    batch::log_summary(&run);

    report::save_report(&run.records, &args.output_dir, run.interrupted)
        .context("Failed to write results")?;

    Ok(())
}

/// Initialize tracing subscriber
///
/// Level: `--debug` → `RUST_LOG` → TOML `[logging] level`.
fn init_logging(logging: &LoggingConfig, debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("sidsp_checker=debug,sidsp_common=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
