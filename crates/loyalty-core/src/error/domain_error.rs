//! Domain errors - failures reported by collaborators and domain rules

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status {status} from {collaborator}")]
    UnexpectedStatus {
        collaborator: &'static str,
        status: u16,
    },

    #[error("Malformed response from {collaborator}: {message}")]
    MalformedResponse {
        collaborator: &'static str,
        message: String,
    },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid presence config: {0}")]
    InvalidPresenceConfig(String),

    #[error("Invalid reward table entry: {0}")]
    InvalidRewardEntry(String),

    #[error("Points must be positive, got {0}")]
    InvalidPoints(i64),
}

impl DomainError {
    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            Self::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            Self::InvalidPresenceConfig(_) => "INVALID_PRESENCE_CONFIG",
            Self::InvalidRewardEntry(_) => "INVALID_REWARD_ENTRY",
            Self::InvalidPoints(_) => "INVALID_POINTS",
        }
    }

    /// Check if retrying the same call later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPresenceConfig(_) | Self::InvalidRewardEntry(_) | Self::InvalidPoints(_)
        )
    }
}
