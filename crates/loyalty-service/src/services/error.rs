//! Service layer error types

use loyalty_common::AppError;
use loyalty_core::DomainError;

/// Service layer error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Collaborator failure or domain rule violation
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Application error (configuration, etc.)
    #[error("{0}")]
    App(#[from] AppError),

    /// A collaborator needed for this operation is not configured
    #[error("{collaborator} is not configured")]
    Disabled { collaborator: &'static str },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn disabled(collaborator: &'static str) -> Self {
        Self::Disabled { collaborator }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Disabled { .. } => "COLLABORATOR_DISABLED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the same call could succeed on a later event
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_transient(),
            Self::App(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
