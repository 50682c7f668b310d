//! src/services/storage_service.rs
//!
//! StorageService is the object store gateway. Payload bytes live on local disk
//! beneath `base_path/{container}/{key}` and per-object metadata lives in
//! SQLite. Writes are retried with backoff, and reads happen only through
//! short-lived signed URLs minted here.

use crate::{
    models::{container::Container, object::StoredObject},
    services::{
        retry::{RetryPolicy, retry_with_backoff},
        url_signer::{SignatureCheck, UrlSigner},
    },
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("container `{name}` invalid: {reason}")]
    InvalidContainerName { name: String, reason: String },
    #[error("object `{0}` not found")]
    ObjectNotFound(String),
    #[error("invalid object key")]
    InvalidObjectKey,
    #[error("container `{0}` vanished after a concurrent create")]
    ContainerUnavailable(String),
    #[error("signature does not match")]
    SignatureInvalid,
    #[error("signed url expired")]
    UrlExpired,
    #[error("storing object failed after {attempts} attempt(s): {source}")]
    WriteFailed {
        attempts: u32,
        #[source]
        source: Box<StorageError>,
    },
    #[error("deleting object `{key}` failed: {source}")]
    DeleteFailed {
        key: String,
        #[source]
        source: Box<StorageError>,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Backend faults worth another attempt. Anything caused by the request
    /// itself is not.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Io(_) => true,
            StorageError::Sqlx(sqlx::Error::RowNotFound) => false,
            StorageError::Sqlx(err) => !is_unique_violation(err),
            _ => false,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// What a successful upload hands back to the caller.
#[derive(Debug, Clone)]
pub struct UploadedObject {
    pub key: String,
    pub download_url: String,
    pub object: StoredObject,
}

/// Gateway over one private container.
///
/// Cheap to clone; all clones share the SQLite pool.
#[derive(Clone, Debug)]
pub struct StorageService {
    /// Shared SQLite connection pool used for metadata operations.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where container directories live.
    pub base_path: PathBuf,

    container: Container,
    signer: UrlSigner,
    retry: RetryPolicy,
}

const MAX_OBJECT_KEY_LEN: usize = 1024;
const CONTAINER_NAME_MIN_LEN: usize = 3;
const CONTAINER_NAME_MAX_LEN: usize = 63;
const DEFAULT_REGION: &str = "local";
const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

impl StorageService {
    /// Ensure `container_name` exists and build a gateway bound to it.
    pub async fn open(
        db: Arc<SqlitePool>,
        base_path: impl Into<PathBuf>,
        container_name: &str,
        signer: UrlSigner,
        retry: RetryPolicy,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();
        let container = Self::ensure_container(&db, &base_path, container_name).await?;
        Ok(Self {
            db,
            base_path,
            container,
            signer,
            retry,
        })
    }

    /// Look up a container by name, creating it (private) when absent.
    ///
    /// Idempotent; concurrent creators converge on the same row.
    pub async fn ensure_container(
        db: &SqlitePool,
        base_path: &Path,
        name: &str,
    ) -> StorageResult<Container> {
        ensure_container_name_safe(name)?;
        fs::create_dir_all(base_path.join(name)).await?;

        if let Some(existing) = fetch_container(db, name).await? {
            debug!("using existing container {}", name);
            return Ok(existing);
        }

        let container = Container {
            id: Uuid::new_v4(),
            name: name.to_string(),
            region: DEFAULT_REGION.to_string(),
            storage_class: DEFAULT_STORAGE_CLASS.to_string(),
            public_access: false,
            created_at: Utc::now(),
        };

        match sqlx::query(
            "INSERT INTO containers (id, name, region, storage_class, public_access, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(container.id)
        .bind(&container.name)
        .bind(&container.region)
        .bind(&container.storage_class)
        .bind(container.public_access)
        .bind(container.created_at)
        .execute(db)
        .await
        {
            Ok(_) => {
                info!("Created new container: {}", name);
                Ok(container)
            }
            Err(err) if is_unique_violation(&err) => {
                debug!("container {} created concurrently; reloading", name);
                fetch_container(db, name)
                    .await?
                    .ok_or_else(|| StorageError::ContainerUnavailable(name.to_string()))
            }
            Err(err) => Err(StorageError::Sqlx(err)),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Store `bytes` under a freshly generated key and return the key with a
    /// signed download URL.
    ///
    /// Transient write failures are retried per the configured policy; once it
    /// is exhausted the error is `WriteFailed` and nothing is visible under the
    /// key.
    pub async fn upload(&self, bytes: Bytes, original_filename: &str) -> StorageResult<UploadedObject> {
        let key = generate_object_key(original_filename, Utc::now());
        let content_type = content_type_for(original_filename);

        let object = retry_with_backoff(&self.retry, StorageError::is_transient, |attempt| {
            debug!("writing object {} (attempt {})", key, attempt);
            self.write_object(&key, &bytes, original_filename, &content_type)
        })
        .await
        .map_err(|failure| {
            error!(
                "Error uploading file {} after {} attempt(s): {}",
                original_filename, failure.attempts, failure.last_error
            );
            StorageError::WriteFailed {
                attempts: failure.attempts,
                source: Box::new(failure.last_error),
            }
        })?;

        let download_url = self.signer.sign(&self.container.name, &key, Utc::now());
        info!("Successfully uploaded file: {}", key);

        Ok(UploadedObject {
            key,
            download_url,
            object,
        })
    }

    /// Mint a new signed GET URL for an existing object.
    pub async fn signed_url(&self, key: &str) -> StorageResult<String> {
        ensure_key_safe(key)?;
        self.fetch_object(key).await?;

        if !fs::try_exists(self.object_path(key)).await? {
            warn!("File not found: {}", key);
            return Err(StorageError::ObjectNotFound(key.to_string()));
        }

        Ok(self.signer.sign(&self.container.name, key, Utc::now()))
    }

    /// Check a signed download request and open the payload for streaming.
    pub async fn open_signed(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
    ) -> StorageResult<(StoredObject, File)> {
        ensure_key_safe(key)?;
        match self
            .signer
            .verify(&self.container.name, key, expires, signature, Utc::now())
        {
            SignatureCheck::Valid => {}
            SignatureCheck::Expired => return Err(StorageError::UrlExpired),
            SignatureCheck::Invalid => return Err(StorageError::SignatureInvalid),
        }

        let object = self.fetch_object(key).await?;
        let file = File::open(self.object_path(key)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::ObjectNotFound(key.to_string())
            } else {
                StorageError::Io(err)
            }
        })?;

        Ok((object, file))
    }

    /// Remove an object and its metadata.
    ///
    /// Returns `Ok(false)` when there was nothing to delete.
    pub async fn delete(&self, key: &str) -> StorageResult<bool> {
        ensure_key_safe(key)?;
        let delete_failed = |source: StorageError| StorageError::DeleteFailed {
            key: key.to_string(),
            source: Box::new(source),
        };

        let object = match self.fetch_object(key).await {
            Ok(object) => object,
            Err(StorageError::ObjectNotFound(_)) => {
                warn!("Attempted to delete non-existent file: {}", key);
                return Ok(false);
            }
            Err(err) => return Err(delete_failed(err)),
        };

        // Bytes before metadata: a failed removal leaves the row in place.
        let file_path = self.object_path(key);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed physical file {}", file_path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("file {} already missing", file_path.display());
            }
            Err(err) => {
                error!("Error deleting file {}: {}", key, err);
                return Err(delete_failed(err.into()));
            }
        }

        sqlx::query("DELETE FROM objects WHERE id = ?")
            .bind(object.id)
            .execute(&*self.db)
            .await
            .map_err(|err| delete_failed(err.into()))?;

        if let Some(parent) = file_path.parent() {
            self.prune_empty_dirs(parent, &self.container_root()).await;
        }

        info!("Successfully deleted file: {}", key);
        Ok(true)
    }

    /// Best-effort write/read/delete round trip inside the container directory.
    /// The error text is for logs, not for callers.
    pub async fn probe_disk(&self) -> Result<(), String> {
        let tmp_path = self
            .container_root()
            .join(format!(".readyz-{}", Uuid::new_v4()));
        fs::write(&tmp_path, b"readyz")
            .await
            .map_err(|e| format!("could not write tmp file: {}", e))?;

        let read = fs::read(&tmp_path).await;
        let removed = fs::remove_file(&tmp_path).await;
        match read {
            Ok(bytes) if bytes == b"readyz" => {
                removed.map_err(|e| format!("could not remove tmp file: {}", e))
            }
            Ok(_) => Err("file content mismatch".to_string()),
            Err(e) => Err(format!("could not read tmp file: {}", e)),
        }
    }

    fn container_root(&self) -> PathBuf {
        self.base_path.join(&self.container.name)
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.container_root().join(key)
    }

    async fn fetch_object(&self, key: &str) -> StorageResult<StoredObject> {
        sqlx::query_as::<_, StoredObject>(
            "SELECT id, container_id, key, original_filename, content_type, size_bytes,
                    etag, uploaded_at
             FROM objects
             WHERE container_id = ? AND key = ?",
        )
        .bind(self.container.id)
        .bind(key)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StorageError::ObjectNotFound(key.to_string()),
            other => StorageError::Sqlx(other),
        })
    }

    /// One write attempt: temp file, fsync, rename into place, then the
    /// metadata row. Leaves nothing behind on failure.
    async fn write_object(
        &self,
        key: &str,
        bytes: &Bytes,
        original_filename: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let file_path = self.object_path(key);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StorageError::Io(io::Error::other("object path missing parent directory"))
        })?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        if let Err(err) = write_synced(&tmp_path, bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }

        let insert_result = sqlx::query_as::<_, StoredObject>(
            r#"
            INSERT INTO objects (
                id, container_id, key, original_filename, content_type,
                size_bytes, etag, uploaded_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, container_id, key, original_filename, content_type,
                      size_bytes, etag, uploaded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(self.container.id)
        .bind(key)
        .bind(original_filename)
        .bind(content_type)
        .bind(bytes.len() as i64)
        .bind(format!("{:x}", md5::compute(bytes)))
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match insert_result {
            Ok(object) => Ok(object),
            Err(err) => {
                let _ = fs::remove_file(&file_path).await;
                Err(StorageError::Sqlx(err))
            }
        }
    }

    /// Remove empty date directories up to (not including) the container root.
    async fn prune_empty_dirs(&self, start: &Path, stop: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(stop) && current != stop {
            match fs::remove_dir(&current).await {
                Ok(_) => match current.parent() {
                    Some(parent) => current = parent.to_path_buf(),
                    None => break,
                },
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

async fn fetch_container(db: &SqlitePool, name: &str) -> StorageResult<Option<Container>> {
    let container = sqlx::query_as::<_, Container>(
        "SELECT id, name, region, storage_class, public_access, created_at
         FROM containers WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(container)
}

/// `<yyyy>/<mm>/<dd>/<uuid>[.<ext>]`, with the extension copied verbatim from
/// the original filename.
pub fn generate_object_key(original_filename: &str, now: DateTime<Utc>) -> String {
    let mut key = format!("{}/{}", now.format("%Y/%m/%d"), Uuid::new_v4());
    if let Some((_, ext)) = original_filename.rsplit_once('.') {
        if !ext.is_empty() {
            key.push('.');
            key.push_str(ext);
        }
    }
    key
}

/// Infer a MIME type from the filename extension.
pub fn content_type_for(filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let mime = match ext.as_deref() {
        Some("pdf") => mime::APPLICATION_PDF,
        Some("txt") => mime::TEXT_PLAIN,
        Some("csv") => mime::TEXT_CSV,
        Some("htm" | "html") => mime::TEXT_HTML,
        Some("xml") => mime::TEXT_XML,
        Some("json") => mime::APPLICATION_JSON,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("doc") => return "application/msword".to_string(),
        Some("docx") => {
            return "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                .to_string();
        }
        Some("rtf") => return "application/rtf".to_string(),
        _ => mime::APPLICATION_OCTET_STREAM,
    };
    mime.to_string()
}

/// Rejects keys that are empty, absolute, contain `..` or control bytes.
fn ensure_key_safe(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
        return Err(StorageError::InvalidObjectKey);
    }
    if key.starts_with('/') || key.contains("..") {
        return Err(StorageError::InvalidObjectKey);
    }
    if key.bytes().any(|b| b.is_ascii_control() || b == b'\\') {
        return Err(StorageError::InvalidObjectKey);
    }
    Ok(())
}

/// Container names follow DNS-style rules: 3–63 chars of lowercase letters,
/// digits, dots and hyphens, starting and ending alphanumeric.
fn ensure_container_name_safe(name: &str) -> StorageResult<()> {
    let invalid = |reason: &str| {
        Err(StorageError::InvalidContainerName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.len() < CONTAINER_NAME_MIN_LEN || name.len() > CONTAINER_NAME_MAX_LEN {
        return invalid("must be between 3 and 63 characters");
    }
    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
    {
        return invalid("allowed characters are lowercase letters, digits, dots, and hyphens");
    }
    if name.starts_with(['.', '-']) || name.ends_with(['.', '-']) {
        return invalid("must start and end with a lowercase letter or digit");
    }
    if name.contains("..") {
        return invalid("cannot contain consecutive dots");
    }
    Ok(())
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tokio::io::AsyncReadExt;

    async fn service(dir: &Path) -> StorageService {
        let pool = Arc::new(db::test_pool().await);
        StorageService::open(
            pool,
            dir,
            "job-tracker-resumes",
            UrlSigner::new("test-secret", "http://localhost:8080"),
            RetryPolicy::default(),
        )
        .await
        .unwrap()
    }

    fn query_param(url: &str, name: &str) -> String {
        url.split_once('?')
            .unwrap()
            .1
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .unwrap()
            .to_string()
    }

    #[test]
    fn object_key_has_date_prefix_and_extension() {
        let now = DateTime::parse_from_rfc3339("2024-03-07T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let key = generate_object_key("My_CV.Docx", now);
        assert!(key.starts_with("2024/03/07/"));
        assert!(key.ends_with(".Docx"));

        let bare = generate_object_key("README", now);
        assert_eq!(bare.len(), "2024/03/07/".len() + 36);
        assert_ne!(generate_object_key("a.pdf", now), generate_object_key("a.pdf", now));
    }

    #[test]
    fn content_type_inference() {
        assert_eq!(content_type_for("cv.PDF"), "application/pdf");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("cv.doc"), "application/msword");
        assert_eq!(content_type_for("cv.rtf"), "application/rtf");
        assert_eq!(content_type_for("blob.weird"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn rejects_unsafe_keys_and_container_names() {
        assert!(ensure_key_safe("2024/01/01/x.pdf").is_ok());
        assert!(ensure_key_safe("").is_err());
        assert!(ensure_key_safe("/etc/passwd").is_err());
        assert!(ensure_key_safe("2024/../../x").is_err());
        assert!(ensure_container_name_safe("job-tracker-resumes").is_ok());
        assert!(ensure_container_name_safe("ab").is_err());
        assert!(ensure_container_name_safe("Upper").is_err());
        assert!(ensure_container_name_safe("-edge").is_err());
    }

    #[tokio::test]
    async fn ensure_container_is_idempotent_and_private() {
        let dir = tempfile::tempdir().unwrap();
        let pool = db::test_pool().await;

        let first = StorageService::ensure_container(&pool, dir.path(), "resumes")
            .await
            .unwrap();
        let second = StorageService::ensure_container(&pool, dir.path(), "resumes")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert!(!first.public_access);
        assert!(dir.path().join("resumes").is_dir());
    }

    #[tokio::test]
    async fn upload_then_fetch_via_signed_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path()).await;
        let payload = Bytes::from_static(b"%PDF-1.4 resume body");

        let uploaded = storage.upload(payload.clone(), "resume.pdf").await.unwrap();
        assert!(uploaded.key.ends_with(".pdf"));
        assert_eq!(uploaded.object.content_type, "application/pdf");
        assert_eq!(uploaded.object.size_bytes, payload.len() as i64);
        assert_eq!(uploaded.object.original_filename, "resume.pdf");

        let url = storage.signed_url(&uploaded.key).await.unwrap();
        let key = url
            .split_once("/objects/")
            .unwrap()
            .1
            .split_once('?')
            .unwrap()
            .0;
        assert_eq!(key, uploaded.key);

        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        let signature = query_param(&url, "signature");
        let (meta, mut file) = storage.open_signed(key, expires, &signature).await.unwrap();
        let mut body = Vec::new();
        file.read_to_end(&mut body).await.unwrap();

        assert_eq!(body, payload.as_ref());
        assert_eq!(meta.content_type, "application/pdf");
        assert_eq!(meta.etag, format!("{:x}", md5::compute(&payload)));
    }

    #[tokio::test]
    async fn open_signed_rejects_bad_signature() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path()).await;
        let uploaded = storage
            .upload(Bytes::from_static(b"hello"), "a.txt")
            .await
            .unwrap();
        let expires: i64 = query_param(&uploaded.download_url, "expires").parse().unwrap();

        let err = storage
            .open_signed(&uploaded.key, expires, "AAAA")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::SignatureInvalid));
    }

    #[tokio::test]
    async fn signed_url_for_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path()).await;

        let err = storage.signed_url("2024/01/01/missing.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::ObjectNotFound(_)));
    }

    #[tokio::test]
    async fn delete_twice_reports_true_then_false() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path()).await;
        let uploaded = storage
            .upload(Bytes::from_static(b"bye"), "cv.txt")
            .await
            .unwrap();

        assert!(storage.delete(&uploaded.key).await.unwrap());
        assert!(!storage.delete(&uploaded.key).await.unwrap());
        assert!(matches!(
            storage.signed_url(&uploaded.key).await,
            Err(StorageError::ObjectNotFound(_))
        ));
        // date directories are pruned once empty
        assert!(
            std::fs::read_dir(dir.path().join("job-tracker-resumes"))
                .unwrap()
                .next()
                .is_none()
        );
    }

    #[tokio::test]
    async fn failed_file_removal_keeps_the_object_deletable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path()).await;
        let uploaded = storage
            .upload(Bytes::from_static(b"keep me"), "cv.txt")
            .await
            .unwrap();

        // A non-empty directory in place of the payload makes removal fail.
        let path = dir.path().join("job-tracker-resumes").join(&uploaded.key);
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inner"), b"x").unwrap();

        let err = storage.delete(&uploaded.key).await.unwrap_err();
        assert!(matches!(err, StorageError::DeleteFailed { .. }));
        let err = storage.delete(&uploaded.key).await.unwrap_err();
        assert!(
            matches!(err, StorageError::DeleteFailed { .. }),
            "metadata must survive a failed file removal"
        );

        std::fs::remove_dir_all(&path).unwrap();
        assert!(storage.delete(&uploaded.key).await.unwrap());
        assert!(!storage.delete(&uploaded.key).await.unwrap());
    }

    #[test]
    fn vanished_container_is_reported_explicitly() {
        let err = StorageError::ContainerUnavailable("resumes".into());
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "container `resumes` vanished after a concurrent create"
        );
    }

    #[tokio::test]
    async fn upload_gives_up_when_backend_keeps_failing() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = service(dir.path()).await;
        storage.retry = RetryPolicy {
            max_attempts: 2,
            initial_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(1),
        };
        sqlx::query("DROP TABLE objects")
            .execute(&*storage.db)
            .await
            .unwrap();

        let err = storage
            .upload(Bytes::from_static(b"data"), "cv.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { attempts: 2, .. }));
        assert!(
            std::fs::read_dir(dir.path().join("job-tracker-resumes"))
                .unwrap()
                .flatten()
                .all(|entry| entry.path().is_dir()),
            "no payload file should be left behind"
        );
    }
}
