//! Node assembly: publisher, sensors and the registry the API operates on

use std::sync::Arc;

use control_api::ApiState;
use network::Publisher;
use sensors::{build_sensor, SensorRegistry};
use tracing::{info, warn};

use crate::config::{NodeConfig, Role};
use crate::error::Result;

pub struct SensorNode {
    config: NodeConfig,
    publisher: Arc<Publisher>,
    registry: Arc<SensorRegistry>,
}

impl SensorNode {
    /// Attach the publisher, register the configured sensors and, with
    /// `autostart`, start them
    pub async fn start(config: NodeConfig) -> Result<Self> {
        config.validate()?;

        let publisher = Arc::new(Publisher::new(config.publisher.clone()));
        match config.role {
            Role::Bind => publisher.bind().await?,
            Role::Connect => publisher.connect().await?,
        }
        info!(
            role = ?config.role,
            endpoint = %publisher.local_endpoint().unwrap_or_else(|| config.publisher.endpoint.clone()),
            "📡 Publisher attached"
        );

        let mut registry = SensorRegistry::new();
        for spec in &config.sensors {
            registry.add(build_sensor(spec, Arc::clone(&publisher)));
        }
        let registry = Arc::new(registry);

        if config.autostart {
            for (id, error) in registry.start_all() {
                warn!(sensor = %id, error = %error, "Sensor not started");
            }
        }

        Ok(Self {
            config,
            publisher,
            registry,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn publisher(&self) -> &Arc<Publisher> {
        &self.publisher
    }

    pub fn registry(&self) -> &Arc<SensorRegistry> {
        &self.registry
    }

    pub fn api_state(&self) -> ApiState {
        ApiState::new(Arc::clone(&self.registry), Arc::clone(&self.publisher))
    }

    /// Stop every sensor; the publisher closes once the last handle drops
    pub async fn shutdown(&self) {
        self.registry.stop_all().await;
        info!(
            messages_sent = self.publisher.messages_sent(),
            "Sensor node stopped"
        );
    }
}
