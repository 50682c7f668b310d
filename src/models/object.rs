//! Represents an uploaded object held in a container.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata for a single stored object.
///
/// The payload bytes live on disk under the container directory; this row
/// carries what was attached at upload time.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct StoredObject {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Foreign key linking to the parent container.
    pub container_id: Uuid,

    /// Storage key, `<yyyy>/<mm>/<dd>/<uuid>[.<ext>]`.
    pub key: String,

    /// Filename supplied by the uploader (after sanitizing).
    pub original_filename: String,

    /// MIME type inferred from the original filename.
    pub content_type: String,

    /// Size in bytes.
    pub size_bytes: i64,

    /// MD5 checksum of the payload.
    pub etag: String,

    /// When the upload completed.
    pub uploaded_at: DateTime<Utc>,
}
