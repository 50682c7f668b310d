//! Shared handles injected into every handler.

use crate::services::{
    application_store::ApplicationStore, auth::TokenVerifier, storage_service::StorageService,
    upload_validator::UploadValidator,
};
use serde::Serialize;
use std::sync::Arc;

/// Static facts reported by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub environment: String,
}

/// Built once at startup; every field is safe for concurrent use.
#[derive(Clone)]
pub struct AppState {
    pub storage: StorageService,
    pub applications: ApplicationStore,
    pub validator: UploadValidator,
    pub verifier: Arc<dyn TokenVerifier>,
    pub info: ServiceInfo,
}
