//! Gateway protocol definitions
//!
//! Op codes, close codes, the frame envelope and command payloads.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{
    ActivityPayload, HelloPayload, IdentifyPayload, IdentifyProperties, PresenceUpdatePayload,
    ResumePayload,
};

/// Gateway API version requested in the connection URL
pub const API_VERSION: u8 = 10;

/// Append the version and encoding query to a gateway base URL
///
/// URLs that already carry a query string are used as-is.
#[must_use]
pub fn connect_url(base: &str) -> String {
    if base.contains('?') {
        base.to_string()
    } else {
        format!(
            "{}/?v={API_VERSION}&encoding=json",
            base.trim_end_matches('/')
        )
    }
}
