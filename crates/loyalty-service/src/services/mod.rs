//! Business logic services
//!
//! Reward rules run in response to gateway dispatch events; the presence
//! service owns what the bot shows next to its name.

pub mod context;
pub mod counter;
pub mod error;
pub mod forum_reward;
pub mod message_reward;
pub mod presence;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use counter::MessageCounter;
pub use error::{ServiceError, ServiceResult};
pub use forum_reward::ForumRewardService;
pub use message_reward::{MessageReward, MessageRewardService};
pub use presence::{PresenceService, PresenceSnapshot};
