//! Configuration structs

mod bot_config;

pub use bot_config::{
    AppSettings, BotConfig, ConfigError, DiscordConfig, Environment, PointsConfig,
    PresenceSourceConfig, ReconnectConfig, ReconnectStrategy, RewardsConfig,
};
