//! Outcome of a single connection

use std::fmt;

use super::GatewayError;
use crate::protocol::CloseCode;

/// What the outer loop does after a connection ends
#[derive(Debug)]
pub enum LoopAction {
    /// Shutdown was requested; stop for good
    Shutdown,
    /// Wait, then connect again
    Reconnect(ReconnectReason),
}

/// Why a connection ended
#[derive(Debug)]
pub enum ReconnectReason {
    /// Gateway closed the socket, with its close code if one was sent
    Closed(Option<u16>),
    /// Reconnect (op 7)
    ServerRequested,
    /// Invalid Session (op 9)
    InvalidSession { resumable: bool },
    /// Heartbeat went unacknowledged
    Zombie,
    Transport(GatewayError),
}

impl ReconnectReason {
    /// Whether the next connection may Resume
    ///
    /// Invalid Session always starts over, whatever its `d` flag says.
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        match self {
            Self::Closed(code) => CloseCode::allows_resume(*code),
            Self::InvalidSession { .. } => false,
            Self::ServerRequested | Self::Zombie | Self::Transport(_) => true,
        }
    }

    /// Invalid Session uses its own delay
    #[must_use]
    pub fn is_invalid_session(&self) -> bool {
        matches!(self, Self::InvalidSession { .. })
    }
}

impl fmt::Display for ReconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(Some(code)) => match CloseCode::from_u16(*code) {
                Some(known) => write!(f, "closed: {known}"),
                None => write!(f, "closed ({code})"),
            },
            Self::Closed(None) => f.write_str("connection lost"),
            Self::ServerRequested => f.write_str("reconnect requested"),
            Self::InvalidSession { resumable } => {
                write!(f, "invalid session (resumable: {resumable})")
            }
            Self::Zombie => f.write_str("heartbeat not acknowledged"),
            Self::Transport(e) => write!(f, "{e}"),
        }
    }
}
