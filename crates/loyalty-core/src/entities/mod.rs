//! Domain entities - presence configuration and reward models

mod embed;
mod presence;
mod reward;

pub use embed::Embed;
pub use presence::{ActivityType, PresenceConfig, PresenceStatus};
pub use reward::{PointsAward, RewardReason, RewardTable};
