use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Whether the operator can fix this by retrying with different input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Domain(_))
    }
}
