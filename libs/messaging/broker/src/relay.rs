//! # Broker Relay
//!
//! ```text
//! Publisher ─connect─► [frontend listener] ─read frames─► [backend Publisher] ◄─connect─ Subscriber
//! Publisher ─connect─►        │                                   │           ◄─connect─ Subscriber
//! ```
//!
//! Messages are forwarded verbatim, frame for frame, without inspecting
//! payloads. Topic filtering is left to each subscriber, so the broker
//! forwards everything it receives. A subscriber that falls behind its
//! high-water mark stalls forwarding up to the send timeout, after which the
//! message is counted as dropped.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use network::frame::read_multipart;
use network::transports::{BoxedStream, Listener};
use network::{CancellationToken, Endpoint, Publisher, TransportError};
use tracing::{debug, info, warn};

use crate::config::BrokerConfig;
use crate::error::Result;

/// Forwarding counters
#[derive(Debug, Default)]
struct BrokerCounters {
    forwarded: AtomicU64,
    dropped: AtomicU64,
    publishers: AtomicUsize,
}

/// Point-in-time broker statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    pub forwarded: u64,
    pub dropped: u64,
    pub publishers: usize,
    pub subscribers: usize,
}

/// Bound broker: frontend listener plus backend publisher
pub struct Broker {
    config: BrokerConfig,
    frontend: Listener,
    backend: Arc<Publisher>,
    counters: Arc<BrokerCounters>,
}

impl Broker {
    /// Bind both endpoints; fails if either is unusable
    pub async fn bind(config: BrokerConfig) -> Result<Self> {
        let frontend_endpoint = Endpoint::parse(&config.frontend_endpoint)?;
        let frontend = Listener::bind(&frontend_endpoint).await?;

        let backend = Arc::new(Publisher::new(config.backend_config()));
        backend.bind().await?;

        info!(
            frontend = %frontend.local_endpoint(),
            backend = backend.local_endpoint().as_deref().unwrap_or("?"),
            "🔀 Broker bound"
        );
        Ok(Self {
            config,
            frontend,
            backend,
            counters: Arc::new(BrokerCounters::default()),
        })
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Resolved endpoint publishers connect to
    pub fn frontend_endpoint(&self) -> String {
        self.frontend.local_endpoint().to_string()
    }

    /// Resolved endpoint subscribers connect to
    pub fn backend_endpoint(&self) -> String {
        self.backend.local_endpoint().unwrap_or_default()
    }

    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            forwarded: self.counters.forwarded.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            publishers: self.counters.publishers.load(Ordering::Relaxed),
            subscribers: self.backend.peer_count(),
        }
    }

    /// Accept publishers and forward their messages until `shutdown`
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        info!("Broker running");
        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.frontend.accept() => accepted,
            };
            match accepted {
                Ok((stream, peer)) => {
                    info!(%peer, "Publisher connected to broker");
                    tokio::spawn(forward_from(
                        stream,
                        peer,
                        Arc::clone(&self.backend),
                        Arc::clone(&self.counters),
                        self.config.max_message_size,
                        shutdown.clone(),
                    ));
                }
                Err(e) => {
                    warn!(error = %e, "Frontend accept failed");
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                }
            }
        }
        let stats = self.stats();
        info!(
            forwarded = stats.forwarded,
            dropped = stats.dropped,
            "Broker stopped"
        );
        Ok(())
    }
}

async fn forward_from(
    mut stream: BoxedStream,
    peer: String,
    backend: Arc<Publisher>,
    counters: Arc<BrokerCounters>,
    max_message_size: usize,
    shutdown: CancellationToken,
) {
    counters.publishers.fetch_add(1, Ordering::Relaxed);
    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = read_multipart(&mut stream, max_message_size) => next,
        };
        let frames = match next {
            Ok(Some(frames)) => frames,
            Ok(None) => {
                debug!(%peer, "Publisher disconnected from broker");
                break;
            }
            Err(e) => {
                warn!(%peer, error = %e, "Dropping publisher connection");
                break;
            }
        };
        match backend.publish_multipart(&frames, &shutdown).await {
            Ok(()) => {
                counters.forwarded.fetch_add(1, Ordering::Relaxed);
            }
            Err(TransportError::Cancelled { .. }) => break,
            Err(e) => {
                counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    %peer,
                    error = %e,
                    category = e.category(),
                    retryable = e.is_retryable(),
                    "Failed to forward message"
                );
            }
        }
    }
    counters.publishers.fetch_sub(1, Ordering::Relaxed);
}
