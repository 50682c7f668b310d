//! Represents a storage container, the top-level namespace for stored objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named container holding uploaded objects.
///
/// Containers are created once (normally at startup) and are always private:
/// objects inside are only reachable through signed URLs.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Container {
    /// Unique identifier for this container (UUID for internal DB use).
    pub id: Uuid,

    /// Container name (DNS-style naming rules).
    pub name: String,

    /// Location the container is hosted in ("local" for disk-backed storage).
    pub region: String,

    /// Storage class applied to new objects.
    pub storage_class: String,

    /// Whether anonymous reads are allowed. Always false for containers we create.
    pub public_access: bool,

    /// When this container was created.
    pub created_at: DateTime<Utc>,
}
