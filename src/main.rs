use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_core::{AppError, Config};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "quill", about = "Quill blog API", version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to <config dir>/quill/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API and the hourly weather refresh job
    Serve {
        /// Override server.bind_addr
        #[arg(long)]
        bind: Option<String>,
    },
    /// Check that the weather provider answers with the configured key
    WeatherCheck,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    quill_core::init()?;

    let (mut config, _) = Config::load_validated(args.config.as_deref())?;

    match args.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
                config
                    .server
                    .socket_addr()
                    .context("Invalid --bind address")?;
            }

            let shutdown = CancellationToken::new();
            tokio::spawn({
                let shutdown = shutdown.clone();
                async move {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl-C: {}", e);
                        return;
                    }
                    tracing::info!("Shutdown requested");
                    shutdown.cancel();
                }
            });

            quill_server::serve(&config, shutdown).await.map_err(report)?;
        }
        Commands::WeatherCheck => {
            let weather = quill_server::build_weather_service(&config).map_err(report)?;

            match weather.fetch().await {
                Ok(snapshot) => {
                    println!(
                        "Provider reachable: {}",
                        snapshot.summary_or(weather.location())
                    );
                }
                Err(e) => {
                    tracing::error!("Weather check failed: {}", e);
                    anyhow::bail!("{} ({})", e.user_message(), e);
                }
            }
        }
    }

    Ok(())
}

/// Log the full error and surface the short message to the terminal.
fn report(e: AppError) -> anyhow::Error {
    tracing::error!("{}", e);
    anyhow::anyhow!("{} ({})", e.user_message(), e)
}
