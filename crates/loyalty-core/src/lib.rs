//! # loyalty-core
//!
//! Domain layer for the loyalty bot: Discord ids, gateway intents, presence and
//! reward models, and the traits through which external collaborators are reached.
//! This crate has no knowledge of HTTP or WebSocket transports.

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ActivityType, Embed, PointsAward, PresenceConfig, PresenceStatus, RewardReason, RewardTable,
};
pub use error::DomainError;
pub use traits::{DmApi, MessageApi, PointsApi, PresenceConfigSource, RepoResult};
pub use value_objects::{GatewayIntents, Snowflake, SnowflakeParseError};
