//! Sensor echo - subscribes to sensor topics and logs every decoded message
//!
//! Usage:
//!   sensor-echo
//!   sensor-echo --endpoint tcp://localhost:5556 --topic camera --topic imu

use anyhow::{Context, Result};
use clap::Parser;
use codec::{SensorMessage, SensorPayload};
use network::{CancellationToken, ErrorKind, Subscriber, SubscriberConfig};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sensor-echo")]
#[command(about = "Print SensorStream messages as they arrive")]
#[command(version)]
struct Args {
    /// Publisher or broker backend endpoint
    #[arg(long, default_value = "tcp://localhost:5555")]
    endpoint: String,

    /// Topic prefix to subscribe to; repeatable, defaults to everything
    #[arg(short, long = "topic")]
    topics: Vec<String>,

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

    let subscriber = Subscriber::new(SubscriberConfig::new(args.endpoint.clone()));
    subscriber
        .connect()
        .await
        .with_context(|| format!("connecting to {}", args.endpoint))?;

    let topics = if args.topics.is_empty() {
        vec![String::new()]
    } else {
        args.topics.clone()
    };
    for topic in &topics {
        subscriber.subscribe(topic)?;
    }
    info!(endpoint = %args.endpoint, ?topics, "📥 Echoing sensor messages");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            shutdown.cancel();
        });
    }

    loop {
        let (topic, data) = match subscriber.receive_raw_with_topic(&shutdown).await {
            Ok(message) => message,
            Err(e) => match e.kind() {
                ErrorKind::Timeout => continue,
                ErrorKind::Cancelled => break,
                _ => {
                    warn!(error = %e, "Receive failed");
                    continue;
                }
            },
        };
        let topic = String::from_utf8_lossy(&topic);
        match SensorMessage::decode(&data) {
            Ok(message) => log_message(&topic, &message),
            Err(e) => debug!(%topic, error = %e, bytes = data.len(), "Undecodable message"),
        }
    }

    info!(received = subscriber.messages_received(), "Sensor echo stopped");
    Ok(())
}

fn log_message(topic: &str, message: &SensorMessage) {
    let header = message.header();
    match message {
        SensorMessage::Camera(envelope) => {
            let frame = envelope.payload();
            info!(
                topic,
                sensor = %frame.sensor_id_lossy(),
                seq = header.sequence_number,
                frame_id = frame.frame_id,
                width = frame.width,
                height = frame.height,
                encoding = %String::from_utf8_lossy(&frame.encoding),
                "camera frame"
            );
        }
        SensorMessage::Lidar(envelope) => {
            let scan = envelope.payload();
            info!(
                topic,
                sensor = %scan.sensor_id_lossy(),
                seq = header.sequence_number,
                points = scan.num_points,
                duration_ms = scan.scan_duration_ms,
                "lidar scan"
            );
        }
        SensorMessage::Imu(envelope) => {
            let sample = envelope.payload();
            info!(
                topic,
                sensor = %sample.sensor_id_lossy(),
                seq = header.sequence_number,
                accel = ?sample.accel(),
                gyro = ?sample.gyro(),
                "imu sample"
            );
        }
    }
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
