//! Stand-in Sky Island service for tests and local development.
//!
//! `POST /api/v1/function` answers the way the real service does, minus the
//! jails: the reply's `data` simply echoes the call. Routes under
//! `/fixtures/` return the awkward responses a client has to cope with.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

/// Body accepted by the function endpoint. The flags are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct FunctionRequest {
    pub url: String,
    pub call: String,
    #[serde(default)]
    pub ip4: bool,
    #[serde(default)]
    pub cache_bust: bool,
}

/// Body returned by the function endpoint on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionResponse {
    pub timestamp: i64,
    pub data: String,
}

/// How long `/fixtures/stall` holds a request before answering.
pub const STALL: Duration = Duration::from_secs(30);

/// Length of the string inside the `/fixtures/large` reply.
pub const LARGE_BODY_BYTES: usize = 11 * 1024 * 1024;

pub type Stats = Arc<AtomicU64>;

pub fn app() -> Router {
    let stats: Stats = Arc::new(AtomicU64::new(0));
    Router::new()
        .route("/api/v1/function", post(run_function))
        .route("/api/v1/admin/api-stats", get(api_stats))
        .route("/fixtures/ok", post(ok))
        .route("/fixtures/empty", post(empty))
        .route("/fixtures/not-json", post(not_json))
        .route("/fixtures/redirect", post(redirect))
        .route("/fixtures/stall", post(stall))
        .route("/fixtures/large", post(large))
        .route("/fixtures/status/{code}", post(status))
        .route("/fixtures/headers", post(echo_headers))
        .with_state(stats)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error_body(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Unknown");
    (status, Json(json!({ "error": reason }))).into_response()
}

async fn run_function(State(stats): State<Stats>, headers: HeaderMap, body: Bytes) -> Response {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !is_json {
        return error_body(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    let req: FunctionRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("rejecting function request: {e}");
            return error_body(StatusCode::BAD_REQUEST);
        }
    };
    if req.url.is_empty() || req.call.is_empty() {
        return error_body(StatusCode::BAD_REQUEST);
    }

    stats.fetch_add(1, Ordering::Relaxed);
    tracing::info!(url = %req.url, call = %req.call, "running function");
    Json(FunctionResponse {
        timestamp: unix_now(),
        data: format!("{} <- {}", req.call, req.url),
    })
    .into_response()
}

async fn api_stats(State(stats): State<Stats>) -> Json<serde_json::Value> {
    Json(json!({ "function_calls": stats.load(Ordering::Relaxed) }))
}

async fn ok() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn not_json() -> &'static str {
    "not-json"
}

async fn redirect() -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, "/fixtures/ok")],
        Json(json!({ "redirected": false })),
    )
        .into_response()
}

async fn stall() -> Json<serde_json::Value> {
    tokio::time::sleep(STALL).await;
    Json(json!({ "stalled": true }))
}

async fn large() -> Json<serde_json::Value> {
    Json(json!({ "big": "a".repeat(LARGE_BODY_BYTES) }))
}

async fn status(Path(code): Path<u16>) -> Response {
    error_body(StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
}

async fn echo_headers(headers: HeaderMap) -> Json<serde_json::Value> {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(name, value)| {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            (name.as_str().to_string(), serde_json::Value::String(value))
        })
        .collect();
    Json(serde_json::Value::Object(map))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
