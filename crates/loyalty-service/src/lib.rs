//! # loyalty-service
//!
//! Application layer: the reward rules triggered by gateway events, the
//! presence state the gateway publishes, and the HTTP clients that reach the
//! external collaborators.

pub mod clients;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clients::{DiscordRestClient, HttpConfigSource, HttpPointsClient};
pub use services::{
    ForumRewardService, MessageCounter, MessageReward, MessageRewardService, PresenceService,
    PresenceSnapshot, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
