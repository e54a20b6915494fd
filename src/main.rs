use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cptracker::config::Config;
use cptracker::server::{shutdown_signal, ApiServer, AppState};
use cptracker::service::parse_platforms;

#[derive(Parser)]
#[command(
    name = "cptracker",
    version,
    about = "Competitive programming contest aggregator and API server",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Aggregate upcoming contests once and print them as JSON
    Contests {
        /// Comma-separated platform names, e.g. Codeforces,AtCoder
        #[arg(short, long, value_delimiter = ',')]
        platforms: Option<Vec<String>>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    if let Err(e) = cptracker::metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics disabled");
    }

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(port = config.server.port, "Starting serve command");
            serve(config).await?;
        }

        Commands::Contests { platforms } => {
            tracing::info!(platforms = ?platforms, "Starting contests command");
            contests(config, platforms).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        String::from("cptracker=debug,tower_http=debug,info")
    } else {
        format!("cptracker={level},warn")
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&default_directive))
        .context("Invalid log filter")?;

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let server = ApiServer::new(config).context("Failed to create API server")?;

    println!("{}", server.info().display());

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    println!("CP Tracker API stopped.");
    Ok(())
}

async fn contests(config: Config, platforms: Option<Vec<String>>) -> Result<()> {
    config.validate()?;
    let state = AppState::from_config(&config)?;

    let requested = match platforms {
        Some(names) => names.into_iter().map(|n| n.trim().to_string()).collect(),
        None => parse_platforms(None),
    };

    let result = state
        .contests
        .upcoming(requested, chrono::Utc::now())
        .await
        .context("Failed to aggregate contests")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
