//! Gateway close codes
//!
//! Codes Discord closes the socket with, and whether the session survives.

/// Discord gateway close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    UnknownOpcode = 4001,
    DecodeError = 4002,
    NotAuthenticated = 4003,
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    InvalidSequence = 4007,
    RateLimited = 4008,
    SessionTimedOut = 4009,
    InvalidShard = 4010,
    ShardingRequired = 4011,
    InvalidApiVersion = 4012,
    InvalidIntents = 4013,
    DisallowedIntents = 4014,
}

impl CloseCode {
    /// Normal closure; Discord drops the session when the client sends it
    pub const NORMAL: u16 = 1000;

    /// Codes after which the session can never be resumed
    pub const NON_RESUMABLE: [u16; 6] = [4004, 4010, 4011, 4012, 4013, 4014];

    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownOpcode),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::NotAuthenticated),
            4004 => Some(Self::AuthenticationFailed),
            4005 => Some(Self::AlreadyAuthenticated),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimedOut),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::ShardingRequired),
            4012 => Some(Self::InvalidApiVersion),
            4013 => Some(Self::InvalidIntents),
            4014 => Some(Self::DisallowedIntents),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if a raw close code leaves the session resumable
    ///
    /// Anything outside the non-resumable set, including unknown and
    /// missing codes, keeps the session.
    #[must_use]
    pub fn allows_resume(code: Option<u16>) -> bool {
        !code.is_some_and(|c| Self::NON_RESUMABLE.contains(&c))
    }

    #[must_use]
    pub fn is_resumable(self) -> bool {
        Self::allows_resume(Some(self.as_u16()))
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error",
            Self::UnknownOpcode => "Unknown opcode",
            Self::DecodeError => "Decode error",
            Self::NotAuthenticated => "Not authenticated",
            Self::AuthenticationFailed => "Authentication failed",
            Self::AlreadyAuthenticated => "Already authenticated",
            Self::InvalidSequence => "Invalid sequence number",
            Self::RateLimited => "Rate limited",
            Self::SessionTimedOut => "Session timed out",
            Self::InvalidShard => "Invalid shard",
            Self::ShardingRequired => "Sharding required",
            Self::InvalidApiVersion => "Invalid API version",
            Self::InvalidIntents => "Invalid intents",
            Self::DisallowedIntents => "Disallowed intents",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_resumable_set() {
        for code in [4004, 4010, 4011, 4012, 4013, 4014] {
            assert!(!CloseCode::allows_resume(Some(code)), "{code} must not resume");
            assert!(!CloseCode::from_u16(code).unwrap().is_resumable());
        }
    }

    #[test]
    fn test_other_codes_resume() {
        for code in [4000, 4001, 4002, 4003, 4005, 4007, 4008, 4009] {
            assert!(CloseCode::allows_resume(Some(code)), "{code} should resume");
        }
        assert!(CloseCode::allows_resume(Some(1006)));
        assert!(CloseCode::allows_resume(Some(4999)));
        assert!(CloseCode::allows_resume(None));
    }

    #[test]
    fn test_from_u16() {
        assert_eq!(CloseCode::from_u16(4009), Some(CloseCode::SessionTimedOut));
        assert_eq!(CloseCode::from_u16(4006), None);
        assert_eq!(u16::from(CloseCode::DisallowedIntents), 4014);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CloseCode::AuthenticationFailed.to_string(),
            "Authentication failed (4004)"
        );
    }
}
