// =============================================================================
// Crypto Adviser: Main Entry Point
// =============================================================================
//
// Fetches daily prices for one supported asset, computes moving averages,
// RSI, Bollinger Bands and MACD, prints buy/sell/wait advice per day, writes
// a chart document, and can open the asset's public listing page. It never
// places an order.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod advice;
mod analysis;
mod api;
mod chart;
mod config;
mod error;
mod indicators;
mod link;
mod market_data;
mod pipeline;
mod report;
mod signals;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::Analyzer;
use crate::chart::{JsonChartRenderer, Renderer};
use crate::config::{AdviserConfig, DEFAULT_CONFIG_PATH};
use crate::link::{marketplace_url, LinkOpener, PrintOnly, SystemBrowser};
use crate::market_data::{resolve_asset, CoinGeckoClient, SUPPORTED_ASSETS};
use crate::report::{LineReporter, Reporter};
use crate::signals::SignalPolicy;

#[derive(Parser)]
#[command(name = "crypto-adviser")]
#[command(about = "Technical-indicator advice for popular cryptocurrencies", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "ADVISER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported assets
    Assets,

    /// Fetch history, print advice and write a chart
    Analyze {
        /// Asset name (e.g. bitcoin)
        asset: String,

        /// Number of days to analyse
        #[arg(short, long)]
        days: Option<u32>,

        /// Signal rule: simple or composite
        #[arg(short, long)]
        policy: Option<SignalPolicy>,

        /// Skip writing the chart document
        #[arg(long)]
        no_chart: bool,

        /// Directory for chart documents
        #[arg(long)]
        chart_dir: Option<PathBuf>,

        /// Open the marketplace page after the analysis
        #[arg(long)]
        buy: bool,
    },

    /// Open the asset's marketplace page
    Buy {
        /// Asset name (e.g. bitcoin)
        asset: String,

        /// Print the URL instead of launching a browser
        #[arg(long)]
        print_only: bool,
    },

    /// Serve analyses over HTTP
    Serve {
        /// Listen address (e.g. 127.0.0.1:3001)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Destination (defaults to --config)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::InitConfig { path } = &cli.command {
        let path = path.clone().unwrap_or_else(|| cli.config.clone());
        AdviserConfig::default().save(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // ── 2. Config ────────────────────────────────────────────────────────
    let mut config = AdviserConfig::load(&cli.config).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AdviserConfig::default()
    });
    config.apply_env();

    match cli.command {
        Commands::Assets => {
            println!("Available cryptocurrencies:");
            for asset in SUPPORTED_ASSETS {
                println!("  {}", asset.display_name());
            }
        }

        Commands::Analyze {
            asset,
            days,
            policy,
            no_chart,
            chart_dir,
            buy,
        } => {
            if let Some(policy) = policy {
                config.pipeline.policy = policy;
            }
            let days = days.unwrap_or(config.default_days);
            let analyzer = build_analyzer(&config)?;

            let report = analyzer
                .analyze(&asset, days)
                .await
                .with_context(|| format!("analysis of '{asset}' failed"))?;

            LineReporter::stdout().report(&report)?;

            if !no_chart {
                let dir = chart_dir.unwrap_or_else(|| PathBuf::from(&config.chart_dir));
                let path = JsonChartRenderer::new(dir, config.show_macd).render(&report)?;
                println!("Chart written to {}", path.display());
            }

            if buy {
                SystemBrowser.open(&marketplace_url(&report.asset))?;
            }
        }

        Commands::Buy { asset, print_only } => {
            let asset = resolve_asset(&asset)?;
            let url = marketplace_url(&asset);
            if print_only {
                PrintOnly.open(&url)?;
            } else {
                SystemBrowser.open(&url)?;
            }
        }

        Commands::Serve { bind } => {
            let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            let state = Arc::new(api::rest::ApiState {
                analyzer: build_analyzer(&config)?,
                default_days: config.default_days,
            });
            let app = api::rest::router(state);

            let listener = tokio::net::TcpListener::bind(&bind_addr)
                .await
                .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
            info!(addr = %bind_addr, "API server listening");

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    warn!("Shutdown signal received: stopping gracefully");
                })
                .await
                .context("API server failed")?;
        }

        Commands::InitConfig { .. } => {}
    }

    Ok(())
}

fn build_analyzer(config: &AdviserConfig) -> anyhow::Result<Analyzer> {
    let client = CoinGeckoClient::new(
        config.api_base_url.clone(),
        config.request_timeout(),
    )?;
    info!(
        base_url = client.base_url(),
        policy = %config.pipeline.policy,
        "market data client ready"
    );
    Ok(Analyzer::new(Arc::new(client), config.pipeline.clone())?)
}
