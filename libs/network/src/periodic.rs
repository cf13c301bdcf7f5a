//! Fixed-interval publishing loop
//!
//! A [`PeriodicPublisher`] owns a generator closure and republishes a fresh
//! envelope every `interval` on one topic. The loop runs as a tokio task:
//!
//! ```text
//! generate ─► Envelope::new (fresh timestamp + sequence) ─► publish ─► sleep(interval) ─┐
//!    ▲                                                                                  │
//!    └──────────────────────────── until stop() / drop ─────────────────────────────────┘
//! ```
//!
//! Publish failures are logged and the loop keeps going; only cancellation
//! ends it. `start` while running returns [`TransportError::AlreadyRunning`].

use std::sync::Arc;
use std::time::Duration;

use codec::{Envelope, SensorPayload};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::cancel::CancellationToken;
use crate::publisher::Publisher;
use crate::{Result, TransportError};

type Generator<T> = Box<dyn FnMut() -> T + Send>;

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Publishes `generator()` on `topic` every `interval`
pub struct PeriodicPublisher<T: SensorPayload> {
    publisher: Arc<Publisher>,
    topic: String,
    generator: Arc<Mutex<Generator<T>>>,
    interval: Duration,
    worker: Mutex<Option<Worker>>,
}

impl<T: SensorPayload> PeriodicPublisher<T> {
    pub fn new(
        publisher: Arc<Publisher>,
        topic: impl Into<String>,
        generator: impl FnMut() -> T + Send + 'static,
        interval: Duration,
    ) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            generator: Arc::new(Mutex::new(Box::new(generator))),
            interval,
            worker: Mutex::new(None),
        }
    }

    pub fn publisher(&self) -> &Arc<Publisher> {
        &self.publisher
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the publishing loop on the current tokio runtime
    pub fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            TransportError::configuration("PeriodicPublisher::start requires a tokio runtime", None)
        })?;

        let mut worker = self.worker.lock();
        if let Some(existing) = worker.as_ref() {
            if !existing.handle.is_finished() && !existing.cancel.is_cancelled() {
                return Err(TransportError::AlreadyRunning {
                    what: format!("periodic publisher on '{}'", self.topic),
                });
            }
        }

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_loop(
            Arc::clone(&self.publisher),
            self.topic.clone(),
            Arc::clone(&self.generator),
            self.interval,
            cancel.clone(),
        ));
        *worker = Some(Worker { cancel, handle });
        debug!(topic = %self.topic, interval_ms = self.interval.as_millis() as u64, "Periodic publisher started");
        Ok(())
    }

    /// Cancel the loop and wait for it; no publish is in flight afterwards
    pub async fn stop(&self) {
        let worker = self.worker.lock().take();
        let Some(worker) = worker else {
            return;
        };
        worker.cancel.cancel();
        if let Err(e) = worker.handle.await {
            if e.is_panic() {
                error!(topic = %self.topic, "Periodic publisher task panicked");
            }
        }
        debug!(topic = %self.topic, "Periodic publisher stopped");
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.cancel.is_cancelled() && !w.handle.is_finished())
    }
}

impl<T: SensorPayload> Drop for PeriodicPublisher<T> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.cancel.cancel();
        }
    }
}

async fn run_loop<T: SensorPayload>(
    publisher: Arc<Publisher>,
    topic: String,
    generator: Arc<Mutex<Generator<T>>>,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let payload = {
            let mut generate = generator.lock();
            (*generate)()
        };
        let envelope = Envelope::new(payload);
        match publisher.publish_with(&topic, &envelope, &cancel).await {
            Ok(()) => {}
            Err(TransportError::Cancelled { .. }) => break,
            Err(e) => warn!(
                %topic,
                error = %e,
                category = e.category(),
                retryable = e.is_retryable(),
                "Periodic publish failed"
            ),
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
