//! Shared error types for the services crate.

use thiserror::Error;

use attend_core::model::{SessionError, SubjectError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SubjectService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubjectServiceError {
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by a `TipAdvisor` backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TipError {
    #[error("tip generation is not configured")]
    Disabled,
    #[error("tip backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("tip backend returned no choices")]
    EmptyResponse,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The single user-facing failure of the tips flow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TipsServiceError {
    #[error("Failed to generate tips. Please try again.")]
    Unavailable,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
