//! Dispatch event names

use std::fmt;

/// Dispatch events this client reacts to
///
/// Everything else Discord dispatches is carried as `Other` and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    /// Sent after a successful Identify
    Ready,
    /// Sent after a successful Resume
    Resumed,
    /// A message was posted
    MessageCreate,
    /// A thread was created (or the bot was added to one)
    ThreadCreate,
    Other(String),
}

impl GatewayEventType {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "READY" => Self::Ready,
            "RESUMED" => Self::Resumed,
            "MESSAGE_CREATE" => Self::MessageCreate,
            "THREAD_CREATE" => Self::ThreadCreate,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::ThreadCreate => "THREAD_CREATE",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
