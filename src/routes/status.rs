//! Service-level endpoints.

use std::time::SystemTime;

use axum::Json;
use serde::Serialize;

use crate::constants::{
    version::{get_rust_version, get_version},
    STARTUP_TIME, WELCOME_MESSAGE,
};

/// `GET /`
pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: String,
    rust: String,
    uptime_secs: u64,
}

/// `GET /health`
///
/// Never touches the database, so load balancers can poll it freely.
pub async fn health() -> Json<HealthResponse> {
    let uptime = SystemTime::now()
        .duration_since(*STARTUP_TIME)
        .unwrap_or_default();

    Json(HealthResponse {
        status: "ok",
        version: get_version(),
        rust: get_rust_version(),
        uptime_secs: uptime.as_secs(),
    })
}
