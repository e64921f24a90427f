//! Handler error types

use loyalty_service::ServiceError;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Dispatch frame without a usable payload
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Payload did not match the event shape
    #[error("Failed to decode {event}: {source}")]
    Decode {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Business collaborator failed
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

impl HandlerError {
    pub(crate) fn decode(event: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { event, source }
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Service(e) => e.error_code(),
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
