//! # Sensor Node Integration Tests

use std::time::{Duration, Instant};

use codec::{MessageType, SensorMessage};
use network::{CancellationToken, PublisherConfig, Subscriber, SubscriberConfig};
use sensor_node::{NodeConfig, Role, SensorNode};
use sensors::{SensorKind, SensorSpec};

const WAIT: Duration = Duration::from_secs(5);

fn loopback_config(autostart: bool) -> NodeConfig {
    NodeConfig {
        role: Role::Bind,
        autostart,
        publisher: PublisherConfig::new("tcp://127.0.0.1:0"),
        sensors: vec![
            SensorSpec::new("camera_front", SensorKind::Camera, 5),
            SensorSpec::new("lidar_top", SensorKind::Lidar, 5),
            SensorSpec::new("imu_main", SensorKind::Imu, 5),
        ],
        ..NodeConfig::default()
    }
}

async fn subscribe_all(node: &SensorNode) -> Subscriber {
    let endpoint = node.publisher().local_endpoint().expect("bound endpoint");
    let mut config = SubscriberConfig::new(endpoint);
    config.receive_timeout_ms = 2000;
    let subscriber = Subscriber::new(config);
    subscriber.connect().await.unwrap();
    subscriber.subscribe("").unwrap();

    let started = Instant::now();
    while node.publisher().peer_count() < 1 {
        assert!(started.elapsed() < WAIT, "subscriber never connected");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    subscriber
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_node_publishes_every_sensor_kind() {
    let node = SensorNode::start(loopback_config(true)).await.unwrap();
    assert_eq!(node.registry().active_count(), 3);
    let subscriber = subscribe_all(&node).await;

    let cancel = CancellationToken::new();
    let mut seen = Vec::new();
    let started = Instant::now();
    while seen.len() < 3 {
        assert!(started.elapsed() < WAIT, "saw only {:?}", seen);
        let (topic, data) = subscriber.receive_raw_with_topic(&cancel).await.unwrap();
        let message = SensorMessage::decode(&data).unwrap();
        let expected_topic = match message.message_type() {
            MessageType::CameraFrame => "camera",
            MessageType::LidarScan => "lidar",
            MessageType::Imu => "imu",
        };
        assert_eq!(&topic[..], expected_topic.as_bytes());
        if !seen.contains(&message.message_type()) {
            seen.push(message.message_type());
        }
    }

    node.shutdown().await;
    assert_eq!(node.registry().active_count(), 0);
}

#[tokio::test]
async fn test_node_without_autostart_is_idle() {
    let node = SensorNode::start(loopback_config(false)).await.unwrap();
    assert_eq!(node.registry().len(), 3);
    assert_eq!(node.registry().active_count(), 0);

    node.registry().start("imu_main").unwrap();
    let status = node
        .api_state()
        .registry
        .statuses()
        .into_iter()
        .find(|s| s.id == "imu_main")
        .unwrap();
    assert!(status.active);
    node.shutdown().await;
}

#[tokio::test]
async fn test_connect_role_starts_without_a_listener() {
    let mut config = loopback_config(true);
    config.role = Role::Connect;
    config.publisher = PublisherConfig::new("tcp://127.0.0.1:9");

    let node = SensorNode::start(config).await.unwrap();
    assert_eq!(
        node.publisher().local_endpoint().as_deref(),
        Some("tcp://127.0.0.1:9")
    );
    assert_eq!(node.registry().active_count(), 3);
    node.shutdown().await;
}

#[tokio::test]
async fn test_invalid_endpoint_fails_start() {
    let mut config = loopback_config(true);
    config.publisher = PublisherConfig::new("udp://nowhere");
    assert!(SensorNode::start(config).await.is_err());
}
