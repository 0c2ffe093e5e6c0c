//! Service-layer error types.
//!
//! `ServiceError` is transport-agnostic. The HTTP crate maps each kind to a
//! status code and a structured error body.

use crate::types::Violation;

/// Expected failures of catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No movie carries the requested id.
    #[error("Movie with [id={id}] was not found.")]
    NotFound { id: u64 },

    /// A movie with the same title is already stored.
    #[error("Movie with [title={title}] already exists")]
    AlreadyExists { title: String },

    /// The submitted record broke one or more structural rules.
    #[error("Validation failed")]
    ValidationFailed { violations: Vec<Violation> },
}

impl ServiceError {
    /// Stable symbolic name of the failure kind, as reported to clients.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "MovieNotFoundException",
            Self::AlreadyExists { .. } => "MovieAlreadyExistsException",
            Self::ValidationFailed { .. } => "MethodArgumentNotValidException",
        }
    }
}
