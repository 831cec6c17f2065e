use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_test::assert_ok;

use sensor_dashboard::scheduler::poll_once;
use sensor_dashboard::{DashboardState, Fetcher, HttpFetcher, ManualClock, SharedState};

// ---

/// Stand-in for the remote readings endpoint.
struct Upstream {
    status: Mutex<StatusCode>,
    body: Mutex<String>,
}

impl Upstream {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(StatusCode::OK),
            body: Mutex::new(body.to_string()),
        })
    }

    fn respond(&self, status: StatusCode, body: &str) {
        *self.status.lock().unwrap() = status;
        *self.body.lock().unwrap() = body.to_string();
    }
}

async fn upstream_sensors(
    State(upstream): State<Arc<Upstream>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    // ---
    if headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) != Some("application/json") {
        return (StatusCode::NOT_ACCEPTABLE, String::new()).into_response();
    }
    let status = *upstream.status.lock().unwrap();
    let body = upstream.body.lock().unwrap().clone();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn serve(app: Router) -> SocketAddr {
    // ---
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn start_upstream(upstream: Arc<Upstream>) -> String {
    let app = Router::new()
        .route("/api/sensors", get(upstream_sensors))
        .with_state(upstream);
    format!("http://{}/api/sensors", serve(app).await)
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap())
}

fn shared() -> SharedState {
    Arc::new(RwLock::new(DashboardState::default()))
}

const READINGS: &str = r#"[
    {"sensor_id": "sensor10", "timestamp": "2025-03-26T18:44:55Z",
     "temperature": 36.4, "co2_level": 720, "humidity": 48,
     "noise_level": 52, "light_intensity": 410, "air_quality_index": 35},
    {"sensor_id": "sensor2", "timestamp": "2025-03-26T13:44:55-05:00",
     "temperature": 22.0, "co2_level": 1180, "humidity": 41,
     "noise_level": 44, "light_intensity": 380, "air_quality_index": 28}
]"#;

#[tokio::test]
async fn http_fetcher_decodes_and_normalizes() -> Result<()> {
    // ---
    let url = start_upstream(Upstream::new(READINGS)).await;
    let fetcher = HttpFetcher::new(url, Duration::from_secs(5))?;

    let batch = assert_ok!(fetcher.fetch().await);
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].timestamp, batch[1].timestamp);
    assert_eq!(batch[1].co2_level, 1180.0);

    Ok(())
}

#[tokio::test]
async fn dashboard_read_models_after_poll() -> Result<()> {
    // ---
    let url = start_upstream(Upstream::new(READINGS)).await;
    let fetcher = HttpFetcher::new(url, Duration::from_secs(5))?;
    let state = shared();

    poll_once(&state, &fetcher, &clock()).await;
    // Same payload again is an echo: history unchanged
    poll_once(&state, &fetcher, &clock()).await;

    let base = format!("http://{}", serve(sensor_dashboard::router(state)).await);
    let client = Client::new();

    let view: Value = client
        .get(format!("{base}/api/dashboard"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(view["loading"], false);
    assert!(view["error"].is_null());
    assert_eq!(view["sensors"][0]["sensor_id"], "sensor2");
    assert_eq!(view["sensors"][1]["sensor_id"], "sensor10");
    assert_eq!(view["sensors"][1]["cards"][0]["color"], "red");
    assert_eq!(
        view["sensors"][0]["charts"][0]["points"]
            .as_array()
            .map(Vec::len),
        Some(1)
    );

    let warnings: Value = client
        .get(format!("{base}/api/warnings"))
        .send()
        .await?
        .json()
        .await?;
    // Each poll evaluates its batch, so both cycles contribute
    assert_eq!(warnings["count"], 4);
    assert_eq!(
        warnings["warnings"][0]["message"],
        "High temperature alert: 36.4°C"
    );
    assert_eq!(warnings["warnings"][1]["message"], "High CO2 alert: 1180 ppm");

    let history: Value = client
        .get(format!("{base}/api/sensors/sensor10/history"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(history.as_array().map(Vec::len), Some(1));

    let missing = client
        .get(format!("{base}/api/sensors/sensor99/history"))
        .send()
        .await?;
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let sensors: Value = client
        .get(format!("{base}/api/sensors"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(sensors[0]["sensor_id"], "sensor2");
    assert_eq!(sensors[1]["readings"], 1);

    let health: Value = client.get(format!("{base}/health")).send().await?.json().await?;
    assert_eq!(health["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn upstream_failure_then_recovery() -> Result<()> {
    // ---
    let upstream = Upstream::new(READINGS);
    upstream.respond(StatusCode::SERVICE_UNAVAILABLE, "");
    let url = start_upstream(upstream.clone()).await;
    let fetcher = HttpFetcher::new(url, Duration::from_secs(5))?;
    let state = shared();

    poll_once(&state, &fetcher, &clock()).await;
    {
        let view = state.read().await.view();
        assert!(!view.loading);
        assert_eq!(view.error.as_deref(), Some("Sensor API returned HTTP 503"));
    }

    upstream.respond(StatusCode::OK, "<html>oops</html>");
    poll_once(&state, &fetcher, &clock()).await;
    {
        let view = state.read().await.view();
        let error = view.error.unwrap_or_default();
        assert!(error.starts_with("Failed to decode sensor data"), "{error}");
        assert!(view.sensors.is_empty());
    }

    upstream.respond(StatusCode::OK, READINGS);
    poll_once(&state, &fetcher, &clock()).await;
    let view = state.read().await.view();
    assert!(view.error.is_none());
    assert_eq!(view.sensors.len(), 2);

    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() -> Result<()> {
    // ---
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let fetcher = HttpFetcher::new(format!("http://{addr}/api/sensors"), Duration::from_secs(2))?;
    let err = fetcher.fetch().await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to reach sensor API"));

    Ok(())
}
