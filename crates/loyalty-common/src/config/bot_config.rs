//! Bot configuration structs
//!
//! Loads configuration from environment variables (and an optional `.env` file).

use loyalty_core::{GatewayIntents, RewardTable, Snowflake};
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub app: AppSettings,
    pub discord: DiscordConfig,
    pub reconnect: ReconnectConfig,
    pub points: PointsConfig,
    pub presence: PresenceSourceConfig,
    pub rewards: RewardsConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Discord connection settings
#[derive(Clone)]
pub struct DiscordConfig {
    /// Bot token (never logged)
    pub token: String,
    /// Base gateway URL, without query string
    pub gateway_url: String,
    /// REST API base used for channel messages and DMs
    pub api_base: String,
    pub intents: GatewayIntents,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("gateway_url", &self.gateway_url)
            .field("api_base", &self.api_base)
            .field("intents", &self.intents)
            .finish()
    }
}

/// How the delay before a reconnect attempt is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectStrategy {
    /// Same delay before every attempt
    #[default]
    Fixed,
    /// Doubling delay with jitter, capped at `max_delay_ms`
    Exponential,
}

impl FromStr for ReconnectStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "exponential" | "backoff" => Ok(Self::Exponential),
            _ => Err(()),
        }
    }
}

/// Reconnect policy settings
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub strategy: ReconnectStrategy,
    pub delay_ms: u64,
    pub max_delay_ms: u64,
    pub invalid_session_delay_ms: u64,
}

impl ReconnectConfig {
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    #[must_use]
    pub fn invalid_session_delay(&self) -> Duration {
        Duration::from_millis(self.invalid_session_delay_ms)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            strategy: ReconnectStrategy::Fixed,
            delay_ms: default_reconnect_delay_ms(),
            max_delay_ms: default_reconnect_max_delay_ms(),
            invalid_session_delay_ms: default_invalid_session_delay_ms(),
        }
    }
}

/// Points collaborator settings
#[derive(Clone, Default)]
pub struct PointsConfig {
    /// Award endpoint; rewards are disabled when unset
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for PointsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointsConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// External presence config source settings
#[derive(Debug, Clone)]
pub struct PresenceSourceConfig {
    /// Polling is disabled when unset
    pub url: Option<String>,
    pub poll_interval_secs: u64,
}

impl PresenceSourceConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for PresenceSourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Message and forum reward settings
#[derive(Debug, Clone)]
pub struct RewardsConfig {
    /// Channels whose messages are counted
    pub tracked_channels: HashSet<Snowflake>,
    /// Every Nth message in a tracked channel earns points
    pub message_threshold: u32,
    pub points_per_milestone: i64,
    /// Upper bound on tracked (user, channel) counters
    pub counter_capacity: usize,
    pub ack_delete_delay_secs: u64,
    pub forum_rewards: RewardTable,
    /// DM the thread owner after a forum award
    pub forum_reward_dm: bool,
}

impl RewardsConfig {
    #[must_use]
    pub fn ack_delete_delay(&self) -> Duration {
        Duration::from_secs(self.ack_delete_delay_secs)
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            tracked_channels: HashSet::new(),
            message_threshold: default_message_threshold(),
            points_per_milestone: default_points_per_milestone(),
            counter_capacity: default_counter_capacity(),
            ack_delete_delay_secs: default_ack_delete_delay_secs(),
            forum_rewards: RewardTable::new(),
            forum_reward_dm: false,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "loyalty-bot".to_string()
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    5_000
}

fn default_reconnect_max_delay_ms() -> u64 {
    60_000
}

fn default_invalid_session_delay_ms() -> u64 {
    2_000
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_message_threshold() -> u32 {
    5
}

fn default_points_per_milestone() -> i64 {
    1
}

fn default_counter_capacity() -> usize {
    10_000
}

fn default_ack_delete_delay_secs() -> u64 {
    5
}

impl BotConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `DISCORD_TOKEN` is missing or a value is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("DISCORD_TOKEN").ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?;

        let strategy = match get("RECONNECT_STRATEGY") {
            Some(raw) => raw
                .parse()
                .map_err(|()| ConfigError::InvalidValue("RECONNECT_STRATEGY", raw))?,
            None => ReconnectStrategy::default(),
        };

        let tracked_channels = match get("TRACKED_CHANNEL_IDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    Snowflake::parse(s)
                        .map_err(|_| ConfigError::InvalidValue("TRACKED_CHANNEL_IDS", s.to_string()))
                })
                .collect::<Result<HashSet<_>, _>>()?,
            None => HashSet::new(),
        };

        let forum_rewards = match get("FORUM_REWARDS") {
            Some(raw) => RewardTable::parse(&raw)
                .map_err(|e| ConfigError::InvalidValue("FORUM_REWARDS", e.to_string()))?,
            None => RewardTable::new(),
        };

        let message_threshold = parse_or(&get, "MESSAGE_REWARD_THRESHOLD", default_message_threshold)?;
        if message_threshold == 0 {
            return Err(ConfigError::InvalidValue(
                "MESSAGE_REWARD_THRESHOLD",
                "0".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: get("APP_NAME").unwrap_or_else(default_app_name),
                env: get("APP_ENV")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
            },
            discord: DiscordConfig {
                token,
                gateway_url: get("GATEWAY_URL").unwrap_or_else(default_gateway_url),
                api_base: get("DISCORD_API_BASE").unwrap_or_else(default_api_base),
                intents: GatewayIntents::LOYALTY_BOT,
            },
            reconnect: ReconnectConfig {
                strategy,
                delay_ms: parse_or(&get, "RECONNECT_DELAY_MS", default_reconnect_delay_ms)?,
                max_delay_ms: parse_or(&get, "RECONNECT_MAX_DELAY_MS", default_reconnect_max_delay_ms)?,
                invalid_session_delay_ms: parse_or(
                    &get,
                    "INVALID_SESSION_DELAY_MS",
                    default_invalid_session_delay_ms,
                )?,
            },
            points: PointsConfig {
                api_url: get("POINTS_API_URL"),
                api_key: get("POINTS_API_KEY"),
            },
            presence: PresenceSourceConfig {
                url: get("PRESENCE_CONFIG_URL"),
                poll_interval_secs: parse_or(&get, "CONFIG_POLL_INTERVAL_SECS", default_poll_interval_secs)?,
            },
            rewards: RewardsConfig {
                tracked_channels,
                message_threshold,
                points_per_milestone: parse_or(&get, "MESSAGE_REWARD_POINTS", default_points_per_milestone)?,
                counter_capacity: parse_or(&get, "MESSAGE_COUNTER_CAPACITY", default_counter_capacity)?,
                ack_delete_delay_secs: parse_or(&get, "ACK_DELETE_DELAY_SECS", default_ack_delete_delay_secs)?,
                forum_rewards,
                forum_reward_dm: parse_or(&get, "FORUM_REWARD_DM", || false)?,
            },
        })
    }
}

/// Parse an optional variable, falling back to a default when unset
fn parse_or<T, G, D>(get: &G, key: &'static str, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
    D: FnOnce() -> T,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
