//! Connection lifecycle states

use std::fmt;

/// Gateway connection state
///
/// ```text
/// Disconnected -> Connecting -> Connected -> Identifying | Resuming -> Ready -> Closing -> Disconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Opening the socket
    Connecting,
    /// Socket open, waiting for Hello
    Connected,
    /// Identify sent, waiting for READY
    Identifying,
    /// Resume sent, waiting for RESUMED
    Resuming,
    /// Session established
    Ready,
    /// Close frame sent or received
    Closing,
}

impl ConnectionState {
    /// Check if moving to `next` follows the lifecycle
    ///
    /// Any state may fall back to `Disconnected` on a transport failure.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use ConnectionState::{
            Closing, Connected, Connecting, Disconnected, Identifying, Ready, Resuming,
        };

        matches!(
            (self, next),
            (_, Disconnected)
                | (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connected, Identifying | Resuming)
                | (Identifying | Resuming, Ready)
                | (Connecting | Connected | Identifying | Resuming | Ready, Closing)
        )
    }

    /// Check if a socket is open in this state
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(
            self,
            Self::Connected | Self::Identifying | Self::Resuming | Self::Ready
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Identifying => "IDENTIFYING",
            Self::Resuming => "RESUMING",
            Self::Ready => "READY",
            Self::Closing => "CLOSING",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
