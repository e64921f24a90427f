//! Event payload definitions
//!
//! Only the fields the bot reads; unknown fields are ignored.

use loyalty_core::Snowflake;
use serde::{Deserialize, Serialize};

// === Connection Events ===

/// READY event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    #[serde(default)]
    pub v: u8,

    pub user: UserPayload,

    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL to use when resuming
    pub resume_gateway_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

// === Message Events ===

/// MESSAGE_CREATE event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreateEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub author: UserPayload,
    #[serde(default)]
    pub content: String,
}

// === Thread Events ===

/// THREAD_CREATE event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadCreateEvent {
    pub id: Snowflake,
    /// Forum or text channel the thread belongs to
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    /// Thread creator
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: String,
}
