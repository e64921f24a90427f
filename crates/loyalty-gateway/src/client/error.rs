//! Gateway client errors

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Gateway client error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Socket failure while connecting, reading or writing
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Frame was not valid JSON or did not match the envelope
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Frame decoded but violated the protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// No Hello within the allowed time after connecting
    #[error("Timed out waiting for Hello")]
    HelloTimeout,
}

impl GatewayError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// True when the connection itself is unusable
    ///
    /// Decode and protocol errors only affect the offending frame.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::WebSocket(_) | Self::HelloTimeout)
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
