//! HTTP handlers for job applications and resume uploads.
//!
//! Upload-bearing requests run Received → Validated → Stored → Persisted and
//! bail out with an error response at the first failed step.

use crate::{
    errors::AppError,
    models::application::{
        ApplicationRecord, ApplicationStatus, ApplicationUpdate, NewApplication,
    },
    services::{
        application_store::StoreError,
        auth::Identity,
        storage_service::StorageError,
        upload_validator::{FilePart, sanitize_filename},
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Page size used when `limit` is not given.
const DEFAULT_LIST_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub storage_path: String,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateApplicationResponse {
    pub message: String,
    pub application_id: Uuid,
    pub has_resume: bool,
}

#[derive(Debug, Serialize)]
pub struct DownloadUrlResponse {
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationList {
    pub applications: Vec<ApplicationRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteObjectResponse {
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListApplicationsQuery {
    pub limit: Option<usize>,
    pub status: Option<String>,
}

/// Text fields and file parts of a multipart request.
#[derive(Debug, Default)]
struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

impl MultipartForm {
    /// Buffer the request. Parts named in `file_fields`, or carrying a
    /// filename, are kept as files.
    async fn read(mut multipart: Multipart, file_fields: &[&str]) -> Result<Self, AppError> {
        let mut form = MultipartForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);

            if filename.is_some() || file_fields.contains(&name.as_str()) {
                let bytes = field.bytes().await?;
                form.files.insert(
                    name,
                    FilePart {
                        filename: filename.unwrap_or_default(),
                        bytes,
                    },
                );
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }
}

/// Name used for the stored object: sanitized, never empty.
fn storage_filename(file: &FilePart) -> String {
    let name = sanitize_filename(&file.filename);
    if name.is_empty() {
        "upload".to_string()
    } else {
        name
    }
}

fn parse_application_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("Application not found"))
}

/// `POST /api/applications/upload`: store a resume on its own.
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let form = MultipartForm::read(multipart?, &["file"]).await?;
    let file = form.files.get("file");
    state.validator.validate(file)?;
    let Some(file) = file else {
        return Err(AppError::bad_request("No file part in the request"));
    };

    let uploaded = state
        .storage
        .upload(file.bytes.clone(), &storage_filename(file))
        .await?;
    info!(
        "{} uploaded {} ({} bytes)",
        identity.subject, uploaded.key, uploaded.object.size_bytes
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".into(),
            storage_path: uploaded.key,
            download_url: uploaded.download_url,
        }),
    ))
}

/// `POST /api/applications`: create a record, optionally with a resume.
pub async fn create_application(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CreateApplicationResponse>), AppError> {
    let mut form = MultipartForm::read(multipart?, &["resume"]).await?;

    let resume_key = match form.files.get("resume") {
        Some(resume) => {
            state.validator.validate(Some(resume))?;
            let uploaded = state
                .storage
                .upload(resume.bytes.clone(), &storage_filename(resume))
                .await?;
            Some(uploaded.key)
        }
        None => None,
    };

    let new_application = NewApplication {
        company: form.fields.remove("company").unwrap_or_default(),
        position: form.fields.remove("position").unwrap_or_default(),
        status: form.fields.remove("status"),
        notes: form.fields.remove("notes"),
        resume_key: resume_key.clone(),
    };

    let application_id = match state.applications.create(new_application).await {
        Ok(id) => id,
        Err(err) => {
            if let Some(key) = &resume_key {
                discard_orphaned_resume(&state, key).await;
            }
            return Err(err.into());
        }
    };
    info!("{} created application {}", identity.subject, application_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateApplicationResponse {
            message: "Application created successfully".into(),
            application_id,
            has_resume: resume_key.is_some(),
        }),
    ))
}

/// The record never got written, so nothing references the upload any more.
async fn discard_orphaned_resume(state: &AppState, key: &str) {
    if let Err(err) = state.storage.delete(key).await {
        warn!("could not remove orphaned resume {}: {}", key, err);
    }
}

/// `GET /api/applications/{id}/resume`: fresh signed URL for the resume.
pub async fn get_resume_url(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DownloadUrlResponse>, AppError> {
    let Path(id) = id?;
    let id = parse_application_id(&id)?;
    let application = state.applications.get(id).await?;

    let Some(resume_key) = application.resume_key else {
        return Err(AppError::not_found("No resume attached to this application"));
    };

    let download_url = state
        .storage
        .signed_url(&resume_key)
        .await
        .map_err(|err| match err {
            StorageError::ObjectNotFound(_) | StorageError::InvalidObjectKey => {
                AppError::not_found("Resume file not found in storage")
            }
            other => other.into(),
        })?;

    Ok(Json(DownloadUrlResponse { download_url }))
}

/// `GET /api/applications?limit=&status=`: newest first.
pub async fn list_applications(
    State(state): State<AppState>,
    query: Result<Query<ListApplicationsQuery>, QueryRejection>,
) -> Result<Json<ApplicationList>, AppError> {
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ApplicationStatus>)
        .transpose()
        .map_err(|err| AppError::bad_request(err.to_string()))?;
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let applications = state.applications.list(limit, status).await?;
    Ok(Json(ApplicationList {
        count: applications.len(),
        applications,
    }))
}

/// `GET /api/applications/{id}`
pub async fn get_application(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let Path(id) = id?;
    let id = parse_application_id(&id)?;
    Ok(Json(state.applications.get(id).await?))
}

/// `PATCH /api/applications/{id}`: partial update, validated as a whole.
pub async fn update_application(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    update: Result<Json<ApplicationUpdate>, JsonRejection>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let Path(id) = id?;
    let id = parse_application_id(&id)?;
    let Json(update) = update?;
    Ok(Json(state.applications.update(id, update).await?))
}

/// `DELETE /api/applications/{id}`: removes the record only; an attached
/// resume stays in storage until deleted through `/api/objects`.
pub async fn delete_application(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    let id = parse_application_id(&id)?;
    if state.applications.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StoreError::NotFound(id).into())
    }
}

/// `DELETE /api/objects/{*key}`: explicit object removal.
pub async fn delete_object(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteObjectResponse>, AppError> {
    let Path(key) = key?;
    let deleted = state.storage.delete(&key).await?;
    Ok(Json(DeleteObjectResponse { deleted }))
}
