//! Core data models for the job tracker.
//!
//! Application records are the tracked entity; containers and stored objects
//! describe the blob storage that holds uploaded resumes. All of them map to
//! SQLite rows via `sqlx::FromRow` and serialize as JSON via `serde`.

pub mod application;
pub mod container;
pub mod object;
