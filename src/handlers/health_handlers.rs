//! Health & readiness handlers.
//!
//! - GET /health  -> liveness plus service identity
//! - GET /readyz  -> readiness that checks DB connectivity and disk I/O

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;
use tracing::error;

/// `GET /health`
///
/// Always 200; never touches the database or disk.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            service: state.info.service.clone(),
            version: state.info.version.clone(),
            environment: state.info.environment.clone(),
        }),
    )
}

/// `GET /readyz`
///
/// Runs `SELECT 1` against SQLite and a write/read/delete probe inside the
/// container directory. 200 when both pass, 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let sqlite_check = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*state.storage.db)
        .await
    {
        Ok(1) => Ok(()),
        Ok(v) => Err(format!("unexpected result: {}", v)),
        Err(e) => Err(format!("error: {}", e)),
    };
    let disk_check = state.storage.probe_disk().await;

    let sqlite = CheckStatus::new("sqlite", sqlite_check, "database unavailable");
    let disk = CheckStatus::new("disk", disk_check, "storage unavailable");
    let overall_ok = sqlite.ok && disk.ok;
    let checks = HashMap::from([("sqlite", sqlite), ("disk", disk)]);

    let body = ReadyResponse {
        status: if overall_ok { "ok" } else { "error" },
        checks,
    };
    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: String,
    version: String,
    environment: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    checks: HashMap<&'static str, CheckStatus>,
}

/// The failure detail goes to the log; callers only see a fixed message.
#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<&'static str>,
}

impl CheckStatus {
    fn new(name: &str, result: Result<(), String>, message: &'static str) -> Self {
        match result {
            Ok(()) => Self { ok: true, error: None },
            Err(detail) => {
                error!("Readiness check {} failed: {}", name, detail);
                Self {
                    ok: false,
                    error: Some(message),
                }
            }
        }
    }
}
