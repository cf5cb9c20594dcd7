//! Error taxonomy for the todo domain.
//!
//! # Design
//! `NotFound` gets a dedicated variant because every id-addressed operation
//! except delete must fail when the record is absent, and the HTTP layer maps
//! it to 404. Field validation failures travel as a map so the caller can put
//! each message next to its input. Anything raised by the storage
//! collaborator lands in `Storage` (or `Migration` while the schema is set up)
//! and is treated as unanticipated.

use thiserror::Error;

use crate::form::FieldErrors;

/// Errors returned by `TodoService` and the storage collaborators.
#[derive(Debug, Error)]
pub enum TodoError {
    /// No todo is stored under this id.
    #[error("Todo not found with id: {0}")]
    NotFound(i64),

    /// One or more fields failed validation.
    #[error("Invalid input")]
    Validation(FieldErrors),

    /// The storage collaborator failed.
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    /// The schema could not be brought up to date.
    #[error("migration failure: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, TodoError>;
