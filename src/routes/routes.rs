//! Defines routes for the job tracker API.
//!
//! ## Structure
//! - **Public endpoints**
//!   - `GET    /health`           liveness and service identity
//!   - `GET    /readyz`           readiness (SQLite + disk)
//!   - `GET    /objects/{*key}`   signed download (signature in the query)
//!
//! - **Authenticated endpoints** (bearer token, see `middleware::auth`)
//!   - `POST   /api/applications/upload`        store a resume, get key + URL
//!   - `GET    /api/applications`               list (limit, status)
//!   - `POST   /api/applications`               create, optional `resume` file
//!   - `GET    /api/applications/{id}`          fetch one record
//!   - `PATCH  /api/applications/{id}`          partial update
//!   - `DELETE /api/applications/{id}`          delete record (not its resume)
//!   - `GET    /api/applications/{id}/resume`   fresh signed resume URL
//!   - `DELETE /api/objects/{*key}`             delete a stored object

use crate::{
    errors::AppError,
    handlers::{
        application_handlers::{
            create_application, delete_application, delete_object, get_application,
            get_resume_url, list_applications, update_application, upload_resume,
        },
        health_handlers::{health, readyz},
        object_handlers::download_object,
    },
    middleware::auth::require_auth,
    services::upload_validator::MAX_UPLOAD_BYTES,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};

/// Request bodies may exceed the upload ceiling so the validator, not the
/// transport, decides what is too large.
const MAX_REQUEST_BYTES: usize = MAX_UPLOAD_BYTES * 2;

/// Build the full router. Authentication wraps only the `/api` routes.
pub fn routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/applications/upload", post(upload_resume))
        .route(
            "/api/applications",
            get(list_applications).post(create_application),
        )
        .route(
            "/api/applications/{id}",
            get(get_application)
                .patch(update_application)
                .delete(delete_application),
        )
        .route("/api/applications/{id}/resume", get(get_resume_url))
        .route("/api/objects/{*key}", delete(delete_object))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/readyz", get(readyz))
        .route("/objects/{*key}", get(download_object))
        .merge(protected)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::not_found("The requested resource does not exist")
}
