use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use price_watch::{PriceTracker, TrackerConfig};

/// Checks one product price and emails an alert when it is at or below target.
#[derive(Parser, Debug)]
#[command(name = "price-watch", version, about)]
struct Cli {
    /// Config file (TOML, JSON, ...). Defaults to ./config.* when present.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save the raw page when no price is found, and log at debug level
    #[arg(long)]
    debug: bool,

    /// Print the check report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Also write logs to <DIR>/price-watch.log
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = TrackerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.debug {
        config.debug_mode = true;
    }

    let tracker = PriceTracker::from_config(config).context("Failed to set up price tracker")?;
    let report = tracker.check_price().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!("Check finished");
    Ok(())
}

fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env().add_directive(format!("price_watch={}", level).parse()?);

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, "price-watch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    // Logs go to stderr so `--json` output stays clean
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
