//! Topic subscriber
//!
//! `connect` starts a background reader that (re)connects to the publisher
//! or broker endpoint and reads multipart messages. Each message whose first
//! frame starts with an active subscription prefix is queued on the inbound
//! queue (bounded by the high-water mark; newest arrivals are dropped when
//! full). `receive_*` calls drain that queue.
//!
//! Filtering happens on arrival: messages already queued stay deliverable
//! after their prefix is unsubscribed.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use codec::{Envelope, SensorPayload};
use parking_lot::{Mutex, RwLock};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::SubscriberConfig;
use crate::endpoint::Endpoint;
use crate::frame::read_multipart;
use crate::poll::Deadline;
use crate::queue::{TopicQueue, Topical};
use crate::transports;
use crate::{Result, TransportError};

/// Frames of one received message, topic first
#[derive(Debug)]
struct InboundMessage {
    frames: Vec<Bytes>,
}

impl Topical for InboundMessage {
    fn topic(&self) -> &[u8] {
        self.frames.first().map(|f| &f[..]).unwrap_or_default()
    }
}

/// Active topic prefixes
#[derive(Debug, Default)]
struct SubscriptionSet {
    prefixes: RwLock<BTreeSet<Vec<u8>>>,
}

impl SubscriptionSet {
    fn matches(&self, topic: &[u8]) -> bool {
        self.prefixes
            .read()
            .iter()
            .any(|prefix| topic.starts_with(prefix))
    }
}

/// Receives `[topic, data]` messages matching its subscribed prefixes
pub struct Subscriber {
    config: SubscriberConfig,
    inbound: Arc<TopicQueue<InboundMessage>>,
    subscriptions: Arc<SubscriptionSet>,
    endpoint: Mutex<Option<Endpoint>>,
    messages_received: AtomicU64,
    messages_dropped: Arc<AtomicU64>,
    shutdown: CancellationToken,
}

impl Subscriber {
    pub fn new(config: SubscriberConfig) -> Self {
        let inbound = Arc::new(TopicQueue::new(
            config.queue_capacity(),
            config.conflate,
            Arc::new(Notify::new()),
        ));
        Self {
            config,
            inbound,
            subscriptions: Arc::new(SubscriptionSet::default()),
            endpoint: Mutex::new(None),
            messages_received: AtomicU64::new(0),
            messages_dropped: Arc::new(AtomicU64::new(0)),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    /// Validate the endpoint and start the background reader
    pub async fn connect(&self) -> Result<()> {
        let endpoint = Endpoint::parse(&self.config.endpoint)?;
        if endpoint.connect_address().is_none() && matches!(endpoint, Endpoint::Tcp { .. }) {
            return Err(TransportError::connection(
                &self.config.endpoint,
                "wildcard host cannot be connected to",
            ));
        }
        {
            let mut current = self.endpoint.lock();
            if let Some(existing) = current.as_ref() {
                return Err(TransportError::AlreadyAttached {
                    endpoint: existing.to_string(),
                });
            }
            *current = Some(endpoint.clone());
        }

        tokio::spawn(reader_loop(ReaderContext {
            endpoint: endpoint.clone(),
            inbound: Arc::clone(&self.inbound),
            subscriptions: Arc::clone(&self.subscriptions),
            dropped: Arc::clone(&self.messages_dropped),
            shutdown: self.shutdown.clone(),
            max_message_size: self.config.max_message_size,
            reconnect_interval: self.config.reconnect_interval(),
        }));
        info!(%endpoint, "📥 Subscriber connecting");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.endpoint.lock().is_some()
    }

    /// Add a topic prefix; subscribing twice is harmless
    pub fn subscribe(&self, prefix: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(TransportError::not_connected("subscribe"));
        }
        if self
            .subscriptions
            .prefixes
            .write()
            .insert(prefix.as_bytes().to_vec())
        {
            debug!(prefix, "Subscribed");
        }
        Ok(())
    }

    /// Remove a topic prefix; fails if it is not currently subscribed
    pub fn unsubscribe(&self, prefix: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(TransportError::not_connected("unsubscribe"));
        }
        if !self.subscriptions.prefixes.write().remove(prefix.as_bytes()) {
            return Err(TransportError::NotSubscribed {
                prefix: prefix.to_string(),
            });
        }
        debug!(prefix, "Unsubscribed");
        Ok(())
    }

    /// Snapshot of the active prefixes
    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions
            .prefixes
            .read()
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    /// Matching messages discarded because the inbound queue was full
    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    /// Receive the next message's data frame
    pub async fn receive_raw(&self, cancel: &CancellationToken) -> Result<Bytes> {
        self.receive_raw_with_topic(cancel).await.map(|(_, data)| data)
    }

    /// Receive the next message as `(topic, data)`
    pub async fn receive_raw_with_topic(&self, cancel: &CancellationToken) -> Result<(Bytes, Bytes)> {
        if !self.is_connected() {
            return Err(TransportError::not_connected("receive"));
        }

        let deadline = Deadline::new(self.config.receive_timeout());
        loop {
            if cancel.is_cancelled() {
                return Err(TransportError::cancelled("receive"));
            }
            if let Some(message) = self.inbound.try_pop() {
                return self.accept(message);
            }
            let Some(slice) = deadline.next_slice() else {
                return Err(TransportError::timeout("receive", deadline.timeout_ms()));
            };
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = self.inbound.readable() => {}
                _ = tokio::time::sleep(slice) => {}
            }
        }
    }

    fn accept(&self, message: InboundMessage) -> Result<(Bytes, Bytes)> {
        let mut frames = message.frames.into_iter();
        let (Some(topic), Some(data)) = (frames.next(), frames.next()) else {
            return Err(TransportError::protocol_violation(
                "message carried a topic frame without a data frame",
            ));
        };
        let extra = frames.count();
        if extra > 0 {
            warn!(
                topic = %String::from_utf8_lossy(&topic),
                extra,
                "Discarding extra frames"
            );
        }
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        Ok((topic, data))
    }

    /// Receive and decode one envelope
    ///
    /// `None` covers both "nothing arrived" and "arrived but did not decode";
    /// use [`receive_raw`](Self::receive_raw) to tell them apart.
    pub async fn receive<T: SensorPayload>(&self, cancel: &CancellationToken) -> Option<Envelope<T>> {
        let data = match self.receive_raw(cancel).await {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "No message received");
                return None;
            }
        };
        match Envelope::<T>::decode(&data) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                debug!(error = %e, bytes = data.len(), "Dropping undecodable message");
                None
            }
        }
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("endpoint", &self.config.endpoint)
            .field("subscriptions", &self.subscriptions())
            .field("queued", &self.inbound.len())
            .field("messages_received", &self.messages_received())
            .finish()
    }
}

struct ReaderContext {
    endpoint: Endpoint,
    inbound: Arc<TopicQueue<InboundMessage>>,
    subscriptions: Arc<SubscriptionSet>,
    dropped: Arc<AtomicU64>,
    shutdown: CancellationToken,
    max_message_size: usize,
    reconnect_interval: Duration,
}

async fn reader_loop(ctx: ReaderContext) {
    let endpoint = &ctx.endpoint;
    loop {
        let connected = tokio::select! {
            _ = ctx.shutdown.cancelled() => break,
            connected = transports::connect(endpoint) => connected,
        };
        match connected {
            Ok(mut stream) => {
                info!(%endpoint, "Subscriber connected");
                loop {
                    let next = tokio::select! {
                        _ = ctx.shutdown.cancelled() => return,
                        next = read_multipart(&mut stream, ctx.max_message_size) => next,
                    };
                    match next {
                        Ok(Some(frames)) => {
                            let message = InboundMessage { frames };
                            if !ctx.subscriptions.matches(message.topic()) {
                                continue;
                            }
                            if !ctx.inbound.push(message) {
                                ctx.dropped.fetch_add(1, Ordering::Relaxed);
                                debug!(%endpoint, "Inbound queue full, dropping message");
                            }
                        }
                        Ok(None) => {
                            info!(%endpoint, "Publisher closed connection");
                            break;
                        }
                        Err(e) => {
                            warn!(%endpoint, error = %e, "Dropping connection");
                            break;
                        }
                    }
                }
            }
            Err(e) => debug!(%endpoint, error = %e, "Connect attempt failed"),
        }
        tokio::select! {
            _ = ctx.shutdown.cancelled() => break,
            _ = tokio::time::sleep(ctx.reconnect_interval) => {}
        }
    }
    debug!(%endpoint, "Subscriber reader stopped");
}
