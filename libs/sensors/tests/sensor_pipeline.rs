//! # Simulated Sensor Pipeline Tests
//!
//! Simulated sensors publishing through a bound loopback publisher into a
//! real subscriber.

use std::sync::Arc;
use std::time::{Duration, Instant};

use codec::{CameraFrameData, ImuData, LidarScanData};
use network::{CancellationToken, Publisher, PublisherConfig, Subscriber, SubscriberConfig};
use sensors::{
    build_sensor, CameraSensor, ImuSensor, Sensor, SensorKind, SensorRegistry, SensorSpec,
};

const WAIT: Duration = Duration::from_secs(5);

async fn pipeline(prefix: &str) -> (Arc<Publisher>, Subscriber) {
    let publisher = Arc::new(Publisher::new(PublisherConfig::new("tcp://127.0.0.1:0")));
    publisher.bind().await.expect("bind");

    let mut config = SubscriberConfig::new(publisher.local_endpoint().unwrap());
    config.receive_timeout_ms = 2000;
    let subscriber = Subscriber::new(config);
    subscriber.connect().await.expect("connect");
    subscriber.subscribe(prefix).expect("subscribe");

    let started = Instant::now();
    while publisher.peer_count() < 1 {
        assert!(started.elapsed() < WAIT, "subscriber never connected");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    (publisher, subscriber)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_camera_frames_count_up() {
    let (publisher, subscriber) = pipeline("camera").await;
    let camera = CameraSensor::camera("camera_front", publisher, Duration::from_millis(5));
    camera.start().unwrap();

    let cancel = CancellationToken::new();
    let mut frame_ids = Vec::new();
    for _ in 0..3 {
        let envelope = subscriber
            .receive::<CameraFrameData>(&cancel)
            .await
            .expect("camera frame");
        let frame = envelope.payload();
        assert_eq!(frame.sensor_id, b"camera_front");
        assert_eq!((frame.width, frame.height), (1920, 1080));
        assert_eq!(frame.encoding, b"RGB8");
        frame_ids.push(frame.frame_id);
    }
    camera.stop().await;

    assert!(frame_ids.windows(2).all(|w| w[1] == w[0] + 1), "{:?}", frame_ids);
    assert!(!camera.is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_imu_readings_stay_within_noise() {
    let (publisher, subscriber) = pipeline("imu").await;
    let imu = ImuSensor::imu("imu_main", publisher, Duration::from_millis(2));
    imu.start().unwrap();

    let cancel = CancellationToken::new();
    for _ in 0..5 {
        let envelope = subscriber.receive::<ImuData>(&cancel).await.expect("imu sample");
        let sample = envelope.payload();
        let [ax, ay, az] = sample.accel();
        assert!(ax.abs() <= 0.1 && ay.abs() <= 0.1);
        assert!((az - 9.81).abs() <= 0.1 + f32::EPSILON * 16.0);
        assert!(sample.gyro().iter().all(|g| g.abs() <= 0.1));
    }
    imu.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_registry_drives_configured_sensors() {
    let (publisher, subscriber) = pipeline("lidar").await;

    let mut registry = SensorRegistry::new();
    for spec in [
        SensorSpec::new("lidar_top", SensorKind::Lidar, 5),
        SensorSpec::new("camera_front", SensorKind::Camera, 5),
    ] {
        registry.add(build_sensor(&spec, Arc::clone(&publisher)));
    }

    assert!(registry.start_all().is_empty());
    assert_eq!(registry.active_count(), 2);

    let scan = subscriber
        .receive::<LidarScanData>(&CancellationToken::new())
        .await
        .expect("lidar scan");
    assert_eq!(scan.payload().sensor_id, b"lidar_top");
    assert_eq!(scan.payload().num_points, 100_000);
    assert_eq!(scan.payload().scan_duration_ms, 5.0);

    // Second start is refused while the loop is live
    let err = registry.start("lidar_top").unwrap_err();
    assert!(err.is_already_running());

    registry.stop_all().await;
    assert_eq!(registry.active_count(), 0);

    // Stopped sensors can be restarted
    registry.start("lidar_top").unwrap();
    assert!(registry.get("lidar_top").unwrap().is_active());
    registry.stop("lidar_top").await.unwrap();
}
