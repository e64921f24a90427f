//! Session management
//!
//! Tracks what is needed to resume after a disconnect.

use tracing::{debug, info};

/// Session identity carried across reconnects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionManager {
    session_id: Option<String>,
    resume_gateway_url: Option<String>,
    sequence: Option<u64>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff both a session id and a resume URL are held
    #[must_use]
    pub fn has_valid_session(&self) -> bool {
        self.session_id.is_some() && self.resume_gateway_url.is_some()
    }

    /// Store the identity from a READY dispatch
    pub fn store_ready(&mut self, session_id: impl Into<String>, resume_gateway_url: impl Into<String>) {
        let session_id = session_id.into();
        info!(session_id = %session_id, "Session established");
        self.session_id = Some(session_id);
        self.resume_gateway_url = Some(resume_gateway_url.into());
    }

    /// Record the sequence number of a received dispatch
    ///
    /// Never moves backwards.
    pub fn update_sequence(&mut self, sequence: u64) {
        if !self.sequence.is_some_and(|current| sequence <= current) {
            self.sequence = Some(sequence);
        }
    }

    /// Forget the session; the next connection identifies fresh
    pub fn invalidate(&mut self) {
        if self.session_id.is_some() {
            debug!(session_id = ?self.session_id, "Session invalidated");
        }
        self.session_id = None;
        self.resume_gateway_url = None;
        self.sequence = None;
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn resume_gateway_url(&self) -> Option<&str> {
        self.resume_gateway_url.as_deref()
    }

    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }
}
