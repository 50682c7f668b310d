//! Job application records and the field rules every write must satisfy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

/// Where an application currently stands.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interviewing,
    Offered,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Offered,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known status.
#[derive(Debug, Error)]
#[error("unknown application status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A persisted job application.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct ApplicationRecord {
    /// Assigned by the store on creation; never changes.
    pub id: Uuid,

    pub company: String,

    pub position: String,

    pub status: ApplicationStatus,

    pub notes: Option<String>,

    /// Storage key of the attached resume, if any.
    pub resume_key: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every successful update.
    pub updated_at: DateTime<Utc>,
}

/// Fields submitted when creating an application.
///
/// `status` stays a raw string until validation so that an unknown value is
/// reported alongside every other violation. `resume_key` is only ever set
/// from a key the object store just generated.
#[derive(Clone, Debug, Default)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub resume_key: Option<String>,
}

/// Partial update. Absent fields keep their current value.
///
/// The resume reference is not client-editable; unknown fields are refused.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ApplicationUpdate {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Every field rule an application violated, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid application data: {}", .violations.join(", "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

/// Fields that passed validation, normalized and ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFields {
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub resume_key: Option<String>,
}

/// The full, unvalidated state of an application about to be written.
#[derive(Debug, Clone)]
pub struct ApplicationDraft {
    pub company: String,
    pub position: String,
    pub status: String,
    pub notes: Option<String>,
    pub resume_key: Option<String>,
}

impl ApplicationDraft {
    /// Check all field rules at once and collect every violation.
    pub fn validate(self) -> Result<ValidFields, ValidationError> {
        let mut violations = Vec::new();

        let company = self.company.trim().to_string();
        if company.is_empty() {
            violations.push("Company name is required".to_string());
        }

        let position = self.position.trim().to_string();
        if position.is_empty() {
            violations.push("Position is required".to_string());
        }

        let status = match self.status.parse::<ApplicationStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                let allowed = ApplicationStatus::ALL.map(|s| s.as_str()).join(", ");
                violations.push(format!("Status must be one of: {}", allowed));
                None
            }
        };

        match status {
            Some(status) if violations.is_empty() => Ok(ValidFields {
                company,
                position,
                status,
                notes: self.notes,
                resume_key: self.resume_key,
            }),
            _ => Err(ValidationError { violations }),
        }
    }
}

impl From<NewApplication> for ApplicationDraft {
    fn from(new: NewApplication) -> Self {
        Self {
            company: new.company,
            position: new.position,
            status: new
                .status
                .unwrap_or_else(|| ApplicationStatus::default().to_string()),
            notes: new.notes,
            resume_key: new.resume_key,
        }
    }
}

impl ApplicationRecord {
    /// Merge `update` over the current state.
    pub fn merged_with(&self, update: ApplicationUpdate) -> ApplicationDraft {
        ApplicationDraft {
            company: update.company.unwrap_or_else(|| self.company.clone()),
            position: update.position.unwrap_or_else(|| self.position.clone()),
            status: update.status.unwrap_or_else(|| self.status.to_string()),
            notes: update.notes.or_else(|| self.notes.clone()),
            resume_key: self.resume_key.clone(),
        }
    }
}
