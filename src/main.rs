use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use services::{
    application_store::ApplicationStore, auth::JwtVerifier, retry::RetryPolicy,
    storage_service::StorageService, upload_validator::UploadValidator, url_signer::UrlSigner,
};
use state::{AppState, ServiceInfo};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting job-tracker with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let db = Arc::new(db::connect(&cfg.database_url).await?);
    db::run_migrations(&db).await?;

    // --- Handle migration mode ---
    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize core services ---
    // A missing container is fatal: never serve traffic without one.
    let retry = RetryPolicy::default().with_max_attempts(cfg.upload_max_attempts);
    tracing::info!(
        "Upload retries: {} attempts, up to {:?} of backoff",
        retry.max_attempts,
        retry.max_total_backoff()
    );
    let storage = StorageService::open(
        db.clone(),
        cfg.storage_dir.clone(),
        &cfg.bucket,
        UrlSigner::new(cfg.signing_secret.clone(), cfg.public_base_url.clone()),
        retry,
    )
    .await
    .map_err(|err| {
        tracing::error!("Error accessing bucket {}: {}", cfg.bucket, err);
        err
    })
    .with_context(|| format!("initializing storage container `{}`", cfg.bucket))?;
    tracing::info!(
        "Using container {} (public access: {})",
        storage.container().name,
        storage.container().public_access
    );

    let state = AppState {
        storage,
        applications: ApplicationStore::new(db.clone()),
        validator: UploadValidator::new(),
        verifier: Arc::new(JwtVerifier::new(&cfg.auth_secret, cfg.client_id.as_deref())),
        info: ServiceInfo {
            service: "job-tracker".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            environment: cfg.environment.clone(),
        },
    };

    // --- Build router ---
    let app: Router = routes::routes::routes(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        "Application started in {} mode, listening on http://{}",
        cfg.environment,
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;

    Ok(())
}
