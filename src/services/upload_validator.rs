//! Checks an uploaded file before any storage call is made.

use bytes::Bytes;
use thiserror::Error;

/// Extensions accepted for resume uploads (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "txt", "rtf"];

/// Largest accepted payload: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A file part received from a multipart request, fully buffered.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("No file provided")]
    MissingFile,
    #[error("File type not allowed. Accepted types: {}", ALLOWED_EXTENSIONS.join(", "))]
    DisallowedType,
    #[error("File size exceeds maximum limit of {}MB", .max_bytes / 1024 / 1024)]
    TooLarge { max_bytes: usize },
}

/// Pure decision function over a candidate upload.
///
/// The payload is only borrowed, so later stages see the same bytes the check
/// saw.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_bytes: usize,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks presence, then extension, then size.
    pub fn validate(&self, file: Option<&FilePart>) -> Result<(), UploadRejection> {
        let file = match file {
            Some(file) if !file.filename.is_empty() => file,
            _ => return Err(UploadRejection::MissingFile),
        };

        if !is_allowed_extension(&file.filename) {
            return Err(UploadRejection::DisallowedType);
        }

        if file.bytes.len() > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                max_bytes: self.max_bytes,
            });
        }

        Ok(())
    }
}

/// Extension is whatever follows the last `.`; a name without a dot has none.
fn is_allowed_extension(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Directory parts are dropped, whitespace becomes `_`, anything outside
/// `[A-Za-z0-9._-]` is removed and leading dots are stripped. Returns an empty
/// string when nothing usable is left.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}
