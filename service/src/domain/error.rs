use thiserror::Error;

use crate::domain::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid credentials supplied")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("not allowed")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DomainError {
    pub fn validation(message: impl std::fmt::Display) -> Self {
        Self::Validation(message.to_string())
    }
}
