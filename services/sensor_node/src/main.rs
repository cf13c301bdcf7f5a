//! Sensor node binary - simulated sensors publishing with an HTTP control API
//!
//! Usage:
//!   sensor-node
//!   sensor-node --endpoint tcp://*:6000 --api-port 9000
//!   sensor-node --connect --endpoint tcp://broker:5555 --no-api
//!   sensor-node --config config/sensor_node.toml --log-level debug

use anyhow::{Context, Result};
use clap::Parser;
use network::CancellationToken;
use sensor_node::{NodeConfig, Role, SensorNode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sensor-node")]
#[command(about = "SensorStream simulated sensor node")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Publisher endpoint (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// Connect to the endpoint instead of binding it
    #[arg(long)]
    connect: bool,

    /// Control API port (overrides config)
    #[arg(long)]
    api_port: Option<u16>,

    /// Disable the control API
    #[arg(long)]
    no_api: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(&self, config: &mut NodeConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.publisher.endpoint = endpoint.clone();
        }
        if self.connect {
            config.role = Role::Connect;
        }
        if let Some(port) = self.api_port {
            config.api.port = port;
        }
        if self.no_api {
            config.api.enabled = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let mut config = match &args.config {
        Some(path) => NodeConfig::from_file(path)
            .with_context(|| format!("loading node config from {}", path))?,
        None => NodeConfig::default(),
    };
    args.apply(&mut config);

    info!(sensors = config.sensors.len(), "Starting SensorStream node");
    let node = SensorNode::start(config).await.context("starting sensor node")?;

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

    let api = if node.config().api.enabled {
        let addr = node.config().api.socket_addr()?;
        let (_, server) = control_api::bind(node.api_state(), addr, shutdown.clone())
            .with_context(|| format!("binding control API on {}", addr))?;
        Some(tokio::spawn(server))
    } else {
        info!("Control API disabled");
        None
    };

    shutdown.cancelled().await;

    if let Some(api) = api {
        if let Err(e) = api.await {
            error!("Control API task failed: {}", e);
        }
    }
    node.shutdown().await;
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
