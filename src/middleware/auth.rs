//! Authentication middleware wrapped around the protected `/api` routes.

use crate::{
    services::auth::{Identity, extract_token},
    state::AppState,
};
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Reject the request with 401 unless it carries a verifiable bearer token.
///
/// On success the caller's [`Identity`] is added to the request extensions
/// before the inner handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return unauthorized("Authentication required", "No token provided");
    };

    let Some(identity) = state.verifier.verify(token) else {
        return unauthorized("Authentication failed", "Invalid or expired token");
    };

    tracing::debug!("authenticated request for {}", identity.subject);
    request.extensions_mut().insert::<Identity>(identity);
    next.run(request).await
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": error,
            "message": message,
            "status_code": StatusCode::UNAUTHORIZED.as_u16()
        })),
    )
        .into_response()
}
