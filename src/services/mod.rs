//! Domain services: upload validation, the object store gateway, the
//! application record store and token verification.

pub mod application_store;
pub mod auth;
pub mod retry;
pub mod storage_service;
pub mod upload_validator;
pub mod url_signer;
