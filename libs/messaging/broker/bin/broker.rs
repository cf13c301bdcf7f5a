//! Broker binary - relays sensor traffic between publishers and subscribers
//!
//! Usage:
//!   broker
//!   broker --frontend tcp://*:5555 --backend tcp://*:5556
//!   broker --config config/broker.toml --log-level debug

use std::time::Duration;

use anyhow::{Context, Result};
use broker::{Broker, BrokerConfig};
use clap::Parser;
use network::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "broker")]
#[command(about = "SensorStream message broker")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Endpoint publishers connect to (overrides config)
    #[arg(long)]
    frontend: Option<String>,

    /// Endpoint subscribers connect to (overrides config)
    #[arg(long)]
    backend: Option<String>,

    /// Seconds between statistics reports (0 disables)
    #[arg(long, default_value_t = 30)]
    stats_interval: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let mut config = match &args.config {
        Some(path) => BrokerConfig::from_file(path)
            .with_context(|| format!("loading broker config from {}", path))?,
        None => BrokerConfig::default(),
    };
    if let Some(frontend) = args.frontend.clone() {
        config.frontend_endpoint = frontend;
    }
    if let Some(backend) = args.backend.clone() {
        config.backend_endpoint = backend;
    }

    info!("Starting SensorStream Broker");
    let broker = Broker::bind(config).await.context("binding broker endpoints")?;
    info!(
        frontend = %broker.frontend_endpoint(),
        backend = %broker.backend_endpoint(),
        "Broker ready"
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Received shutdown signal");
            shutdown.cancel();
        });
    }

    let run = broker.run(shutdown.clone());
    tokio::pin!(run);
    if args.stats_interval == 0 {
        run.await?;
    } else {
        let mut ticker = tokio::time::interval(Duration::from_secs(args.stats_interval));
        ticker.tick().await;
        loop {
            tokio::select! {
                result = &mut run => {
                    result?;
                    break;
                }
                _ = ticker.tick() => {
                    let stats = broker.stats();
                    info!(
                        forwarded = stats.forwarded,
                        dropped = stats.dropped,
                        publishers = stats.publishers,
                        subscribers = stats.subscribers,
                        "📊 Broker stats"
                    );
                }
            }
        }
    }

    Ok(())
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.to_lowercase()));

    if args.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
