//! ApplicationStore: validated CRUD over job application records in SQLite.
//!
//! Every write path validates the complete post-write state before touching
//! the table, so a record that breaks a field rule is never persisted.

use crate::models::application::{
    ApplicationDraft, ApplicationRecord, ApplicationStatus, ApplicationUpdate, NewApplication,
    ValidationError,
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("application `{0}` not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Largest page `list` will return.
pub const MAX_LIST_LIMIT: usize = 100;

const RECORD_COLUMNS: &str =
    "id, company, position, status, notes, resume_key, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct ApplicationStore {
    db: Arc<SqlitePool>,
}

impl ApplicationStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Validate and insert a new record, returning its id.
    pub async fn create(&self, application: NewApplication) -> StoreResult<Uuid> {
        let fields = ApplicationDraft::from(application).validate()?;
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO applications
                (id, company, position, status, notes, resume_key, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&fields.company)
        .bind(&fields.position)
        .bind(fields.status)
        .bind(&fields.notes)
        .bind(&fields.resume_key)
        .bind(now)
        .bind(now)
        .execute(&*self.db)
        .await?;

        info!("Created application {} ({} / {})", id, fields.company, fields.position);
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<ApplicationRecord> {
        sqlx::query_as::<_, ApplicationRecord>(&format!(
            "SELECT {} FROM applications WHERE id = ?",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    /// Merge `update` over the stored record, re-validate the merged result
    /// and persist it.
    ///
    /// Concurrent updates to the same id are last-write-wins.
    pub async fn update(&self, id: Uuid, update: ApplicationUpdate) -> StoreResult<ApplicationRecord> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, ApplicationRecord>(&format!(
            "SELECT {} FROM applications WHERE id = ?",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        let fields = current.merged_with(update).validate()?;

        let updated = sqlx::query_as::<_, ApplicationRecord>(&format!(
            "UPDATE applications
             SET company = ?, position = ?, status = ?, notes = ?, resume_key = ?, updated_at = ?
             WHERE id = ?
             RETURNING {}",
            RECORD_COLUMNS
        ))
        .bind(&fields.company)
        .bind(&fields.position)
        .bind(fields.status)
        .bind(&fields.notes)
        .bind(&fields.resume_key)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Updated application {}", id);
        Ok(updated)
    }

    /// Snapshot of at most `limit` records, newest first, optionally
    /// restricted to one status before the limit applies.
    pub async fn list(
        &self,
        limit: usize,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<Vec<ApplicationRecord>> {
        let limit = limit.min(MAX_LIST_LIMIT);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM applications",
            RECORD_COLUMNS
        ));
        if let Some(status) = status {
            builder.push(" WHERE status = ");
            builder.push_bind(status);
        }
        builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        builder.push_bind(limit as i64);

        let records: Vec<ApplicationRecord> =
            builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(records)
    }

    /// Remove a record. The referenced resume object is left untouched.
    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
