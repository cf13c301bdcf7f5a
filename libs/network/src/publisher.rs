//! Topic publisher
//!
//! ## Roles
//!
//! - [`Publisher::bind`]: server role. Subscribers (or a broker) connect to
//!   us; each accepted peer gets its own outbound queue and writer task.
//! - [`Publisher::connect`]: client role, typically towards a broker's
//!   frontend. One outbound queue exists from the moment `connect` returns
//!   and a background connector (re)establishes the stream, so connecting
//!   before the far side is up succeeds.
//!
//! ## Send Path
//!
//! ```text
//! publish_raw ──► [every peer queue has room?] ──yes──► enqueue on all ──► writer tasks
//!                        │ no
//!                        ▼
//!            wait ≤100ms slice (readiness | cancel | timer), re-check timeout
//! ```
//!
//! A message is enqueued as one pre-encoded buffer holding both frames, so
//! peers never observe a topic frame without its data frame. With no peers
//! the message is dropped and the send still succeeds, as with any
//! fire-and-forget pub/sub socket.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use codec::{Envelope, SensorPayload};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::PublisherConfig;
use crate::endpoint::Endpoint;
use crate::frame::encode_multipart;
use crate::poll::Deadline;
use crate::queue::{TopicQueue, Topical};
use crate::transports::{self, BoxedStream, Listener};
use crate::{Result, TransportError};

/// One fully encoded multipart message awaiting transmission
#[derive(Debug, Clone)]
struct OutboundMessage {
    topic: Bytes,
    wire: Bytes,
}

impl Topical for OutboundMessage {
    fn topic(&self) -> &[u8] {
        &self.topic
    }
}

type PeerQueue = TopicQueue<OutboundMessage>;

/// Outbound queues of every live peer
struct LinkSet {
    links: Mutex<HashMap<u64, Arc<PeerQueue>>>,
    next_id: AtomicU64,
    space: Arc<Notify>,
    capacity: Option<usize>,
    conflate: bool,
}

impl LinkSet {
    fn new(capacity: Option<usize>, conflate: bool) -> Self {
        Self {
            links: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            space: Arc::new(Notify::new()),
            capacity,
            conflate,
        }
    }

    fn attach(&self) -> (u64, Arc<PeerQueue>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let queue = Arc::new(TopicQueue::new(
            self.capacity,
            self.conflate,
            Arc::clone(&self.space),
        ));
        self.links.lock().insert(id, Arc::clone(&queue));
        (id, queue)
    }

    fn detach(&self, id: u64) {
        self.links.lock().remove(&id);
        // A full peer going away may unblock senders
        self.space.notify_waiters();
    }

    fn len(&self) -> usize {
        self.links.lock().len()
    }

    /// Enqueue on every peer, or on none if any peer is at its high-water mark
    fn try_push_all(&self, message: &OutboundMessage) -> bool {
        let links = self.links.lock();
        if !links.values().all(|queue| queue.has_room()) {
            return false;
        }
        for queue in links.values() {
            queue.push(message.clone());
        }
        true
    }

    async fn writable(&self) {
        loop {
            let notified = self.space.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.links.lock().values().all(|queue| queue.has_room()) {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Debug, Clone)]
enum Attachment {
    Detached,
    Bound(Endpoint),
    Connected(Endpoint),
}

/// Publishes `[topic, data]` messages to every connected peer
pub struct Publisher {
    config: PublisherConfig,
    links: Arc<LinkSet>,
    attachment: Mutex<Attachment>,
    messages_sent: AtomicU64,
    shutdown: CancellationToken,
}

impl Publisher {
    pub fn new(config: PublisherConfig) -> Self {
        let links = Arc::new(LinkSet::new(config.queue_capacity(), config.conflate));
        Self {
            config,
            links,
            attachment: Mutex::new(Attachment::Detached),
            messages_sent: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Bind the configured endpoint and start accepting subscribers
    pub async fn bind(&self) -> Result<()> {
        let endpoint = Endpoint::parse(&self.config.endpoint)?;
        self.ensure_detached()?;

        let listener = Listener::bind(&endpoint).await?;
        let local = listener.local_endpoint();
        self.attach(Attachment::Bound(local.clone()))?;

        tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.links),
            self.shutdown.clone(),
        ));
        info!(endpoint = %local, "📡 Publisher bound");
        Ok(())
    }

    /// Connect to the configured endpoint; the stream is (re)established in
    /// the background
    pub async fn connect(&self) -> Result<()> {
        let endpoint = Endpoint::parse(&self.config.endpoint)?;
        if endpoint.connect_address().is_none() && matches!(endpoint, Endpoint::Tcp { .. }) {
            return Err(TransportError::connection(
                &self.config.endpoint,
                "wildcard host cannot be connected to",
            ));
        }
        self.attach(Attachment::Connected(endpoint.clone()))?;

        let (id, queue) = self.links.attach();
        tokio::spawn(connector_loop(
            endpoint.clone(),
            id,
            queue,
            Arc::clone(&self.links),
            self.shutdown.clone(),
            self.config.reconnect_interval(),
        ));
        info!(endpoint = %endpoint, "📡 Publisher connecting");
        Ok(())
    }

    fn ensure_detached(&self) -> Result<()> {
        match &*self.attachment.lock() {
            Attachment::Detached => Ok(()),
            Attachment::Bound(endpoint) | Attachment::Connected(endpoint) => {
                Err(TransportError::AlreadyAttached {
                    endpoint: endpoint.to_string(),
                })
            }
        }
    }

    fn attach(&self, target: Attachment) -> Result<()> {
        let mut attachment = self.attachment.lock();
        if let Attachment::Bound(endpoint) | Attachment::Connected(endpoint) = &*attachment {
            return Err(TransportError::AlreadyAttached {
                endpoint: endpoint.to_string(),
            });
        }
        *attachment = target;
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        !matches!(*self.attachment.lock(), Attachment::Detached)
    }

    /// Endpoint actually bound or connected to; resolves port 0 after bind
    pub fn local_endpoint(&self) -> Option<String> {
        match &*self.attachment.lock() {
            Attachment::Detached => None,
            Attachment::Bound(endpoint) | Attachment::Connected(endpoint) => {
                Some(endpoint.to_string())
            }
        }
    }

    /// Number of peers currently holding an outbound queue
    pub fn peer_count(&self) -> usize {
        self.links.len()
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    /// Encode `envelope` and publish it under `topic`
    pub async fn publish<T: SensorPayload>(&self, topic: &str, envelope: &Envelope<T>) -> Result<()> {
        self.publish_with(topic, envelope, &CancellationToken::new())
            .await
    }

    /// [`publish`](Self::publish) with a caller-supplied cancellation token
    pub async fn publish_with<T: SensorPayload>(
        &self,
        topic: &str,
        envelope: &Envelope<T>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.publish_raw(topic, &envelope.to_bytes(), cancel).await
    }

    /// Send `[topic, data]` to every peer
    ///
    /// Fails fast when not bound or connected. Otherwise waits for
    /// write-readiness up to the send timeout, in slices of at most 100ms,
    /// observing `cancel` between slices.
    pub async fn publish_raw(&self, topic: &str, data: &[u8], cancel: &CancellationToken) -> Result<()> {
        if !self.is_attached() {
            return Err(TransportError::not_connected("publish"));
        }
        let wire = encode_multipart(&[topic.as_bytes(), data])?;
        let message = OutboundMessage {
            topic: Bytes::copy_from_slice(topic.as_bytes()),
            wire,
        };
        self.deliver(message, cancel).await
    }

    /// Forward pre-split frames verbatim; the first frame is the topic
    pub async fn publish_multipart(&self, frames: &[Bytes], cancel: &CancellationToken) -> Result<()> {
        if !self.is_attached() {
            return Err(TransportError::not_connected("publish"));
        }
        let topic = frames
            .first()
            .cloned()
            .ok_or_else(|| TransportError::protocol_violation("message has no frames"))?;
        let wire = encode_multipart(frames)?;
        self.deliver(OutboundMessage { topic, wire }, cancel).await
    }

    async fn deliver(&self, message: OutboundMessage, cancel: &CancellationToken) -> Result<()> {
        if message.wire.len() > self.config.max_message_size {
            return Err(TransportError::protocol_violation(format!(
                "message of {} bytes exceeds max_message_size {}",
                message.wire.len(),
                self.config.max_message_size
            )));
        }

        let deadline = Deadline::new(self.config.send_timeout());
        loop {
            if cancel.is_cancelled() {
                return Err(TransportError::cancelled("publish"));
            }
            if self.links.try_push_all(&message) {
                self.messages_sent.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            let Some(slice) = deadline.next_slice() else {
                return Err(TransportError::timeout("publish", deadline.timeout_ms()));
            };
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = self.links.writable() => {}
                _ = tokio::time::sleep(slice) => {}
            }
        }
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("endpoint", &self.config.endpoint)
            .field("attachment", &*self.attachment.lock())
            .field("peers", &self.links.len())
            .field("messages_sent", &self.messages_sent())
            .finish()
    }
}

async fn accept_loop(listener: Listener, links: Arc<LinkSet>, shutdown: CancellationToken) {
    loop {
        let accepted = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };
        match accepted {
            Ok((stream, peer)) => {
                let (id, queue) = links.attach();
                debug!(%peer, "Subscriber connected");
                let links = Arc::clone(&links);
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    serve_peer(stream, &queue, &shutdown).await;
                    links.detach(id);
                    debug!(%peer, "Subscriber disconnected");
                });
            }
            Err(e) => {
                warn!(error = %e, "Accept failed");
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        }
    }
    debug!("Publisher accept loop stopped");
}

async fn connector_loop(
    endpoint: Endpoint,
    id: u64,
    queue: Arc<PeerQueue>,
    links: Arc<LinkSet>,
    shutdown: CancellationToken,
    reconnect_interval: std::time::Duration,
) {
    loop {
        let connected = tokio::select! {
            _ = shutdown.cancelled() => break,
            connected = transports::connect(&endpoint) => connected,
        };
        match connected {
            Ok(stream) => {
                info!(%endpoint, "Publisher connected");
                serve_peer(stream, &queue, &shutdown).await;
                if shutdown.is_cancelled() {
                    break;
                }
                warn!(%endpoint, "Publisher connection lost, reconnecting");
            }
            Err(e) => debug!(%endpoint, error = %e, "Connect attempt failed"),
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(reconnect_interval) => {}
        }
    }
    links.detach(id);
}

/// Drain `queue` onto `stream` until the peer goes away or shutdown
async fn serve_peer(stream: BoxedStream, queue: &PeerQueue, shutdown: &CancellationToken) {
    let (mut reader, mut writer) = tokio::io::split(stream);

    // Peers never send us anything; reading only detects the close
    let peer_closed = async move {
        let mut scratch = [0u8; 256];
        loop {
            match reader.read(&mut scratch).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    };
    tokio::pin!(peer_closed);

    loop {
        let message = tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = &mut peer_closed => break,
            message = queue.pop() => message,
        };
        // A peer that stops reading mid-message must not outlive shutdown
        let written = tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = &mut peer_closed => break,
            written = writer.write_all(&message.wire) => written,
        };
        if let Err(e) = written {
            debug!(error = %e, "Write to peer failed");
            break;
        }
    }
}
