//! HTTP routes
//!
//! | Method | Path              | Response                                              |
//! |--------|-------------------|-------------------------------------------------------|
//! | GET    | `/health`         | `{"status":"ok","version":…}`                         |
//! | GET    | `/sensors`        | `{"sensors":[{"id","type","active"}]}`                |
//! | POST   | `/sensors/start`  | `?id=` required; 400 / 404 / 409 on failure           |
//! | POST   | `/sensors/stop`   | `?id=` required; 400 / 404 / 409 on failure           |
//! | GET    | `/metrics`        | publisher and sensor counters                         |
//!
//! Every body is JSON. Failures carry `{"status":"error","message":…}`.

use std::convert::Infallible;
use std::sync::Arc;

use network::Publisher;
use sensors::SensorRegistry;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::reply::{self, Json, WithStatus};
use warp::{Filter, Rejection, Reply};

/// Shared handles the handlers operate on
#[derive(Debug, Clone)]
pub struct ApiState {
    pub registry: Arc<SensorRegistry>,
    pub publisher: Arc<Publisher>,
}

impl ApiState {
    pub fn new(registry: Arc<SensorRegistry>, publisher: Arc<Publisher>) -> Self {
        Self {
            registry,
            publisher,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SensorQuery {
    id: Option<String>,
}

impl SensorQuery {
    fn id(self) -> Option<String> {
        self.id.filter(|id| !id.is_empty())
    }
}

type JsonReply = WithStatus<Json>;

fn ok(message: &str, id: &str) -> JsonReply {
    reply::with_status(
        reply::json(&json!({"status": "ok", "message": message, "sensor_id": id})),
        StatusCode::OK,
    )
}

fn error(status: StatusCode, message: &str) -> JsonReply {
    reply::with_status(
        reply::json(&json!({"status": "error", "message": message})),
        status,
    )
}

fn with_state(state: ApiState) -> impl Filter<Extract = (ApiState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// All control routes, with JSON bodies for rejections too
pub fn routes(
    state: ApiState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health_route = warp::path!("health").and(warp::get()).map(health);

    let list_route = warp::path!("sensors")
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(list_sensors);

    let start_route = warp::path!("sensors" / "start")
        .and(warp::post())
        .and(warp::query::<SensorQuery>())
        .and(with_state(state.clone()))
        .map(start_sensor);

    let stop_route = warp::path!("sensors" / "stop")
        .and(warp::post())
        .and(warp::query::<SensorQuery>())
        .and(with_state(state.clone()))
        .and_then(stop_sensor);

    let metrics_route = warp::path!("metrics")
        .and(warp::get())
        .and(with_state(state))
        .map(metrics);

    health_route
        .or(list_route)
        .or(start_route)
        .or(stop_route)
        .or(metrics_route)
        .recover(handle_rejection)
}

fn health() -> Json {
    reply::json(&json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

fn list_sensors(state: ApiState) -> Json {
    reply::json(&json!({"sensors": state.registry.statuses()}))
}

fn start_sensor(query: SensorQuery, state: ApiState) -> JsonReply {
    let Some(id) = query.id() else {
        return error(StatusCode::BAD_REQUEST, "Missing sensor id");
    };
    let Some(sensor) = state.registry.get(&id) else {
        return error(StatusCode::NOT_FOUND, "Sensor not found");
    };
    match sensor.start() {
        Ok(()) => {
            info!(sensor = %id, "Sensor started via API");
            ok("Sensor started", &id)
        }
        Err(e) if e.is_already_running() => error(StatusCode::CONFLICT, "Sensor already running"),
        Err(e) => {
            warn!(sensor = %id, error = %e, "Sensor failed to start");
            error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn stop_sensor(query: SensorQuery, state: ApiState) -> Result<JsonReply, Infallible> {
    let Some(id) = query.id() else {
        return Ok(error(StatusCode::BAD_REQUEST, "Missing sensor id"));
    };
    let Some(sensor) = state.registry.get(&id) else {
        return Ok(error(StatusCode::NOT_FOUND, "Sensor not found"));
    };
    if !sensor.is_active() {
        return Ok(error(StatusCode::CONFLICT, "Sensor not running"));
    }
    sensor.stop().await;
    info!(sensor = %id, "Sensor stopped via API");
    Ok(ok("Sensor stopped", &id))
}

fn metrics(state: ApiState) -> Json {
    reply::json(&json!({
        "messages_sent": state.publisher.messages_sent(),
        "peers": state.publisher.peer_count(),
        "sensors": state.registry.len(),
        "active_sensors": state.registry.active_count(),
    }))
}

async fn handle_rejection(rejection: Rejection) -> Result<JsonReply, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if rejection.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string")
    } else {
        warn!(?rejection, "Unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    };
    Ok(error(status, message))
}
