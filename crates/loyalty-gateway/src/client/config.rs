//! Gateway client settings

use std::time::Duration;

use loyalty_common::{BotConfig, ReconnectConfig};
use loyalty_core::GatewayIntents;

/// Default time to wait for Hello after the socket opens
pub const DEFAULT_HELLO_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one gateway client
#[derive(Clone)]
pub struct GatewayConfig {
    pub token: String,
    /// Base URL for fresh connections; the version query is appended
    pub gateway_url: String,
    pub intents: GatewayIntents,
    pub reconnect: ReconnectConfig,
    pub hello_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(token: impl Into<String>, gateway_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            gateway_url: gateway_url.into(),
            intents: GatewayIntents::LOYALTY_BOT,
            reconnect: ReconnectConfig::default(),
            hello_timeout: DEFAULT_HELLO_TIMEOUT,
        }
    }

    pub fn from_bot_config(config: &BotConfig) -> Self {
        Self {
            token: config.discord.token.clone(),
            gateway_url: config.discord.gateway_url.clone(),
            intents: config.discord.intents,
            reconnect: config.reconnect.clone(),
            hello_timeout: DEFAULT_HELLO_TIMEOUT,
        }
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_hello_timeout(mut self, timeout: Duration) -> Self {
        self.hello_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("token", &"<redacted>")
            .field("gateway_url", &self.gateway_url)
            .field("intents", &self.intents)
            .field("reconnect", &self.reconnect)
            .field("hello_timeout", &self.hello_timeout)
            .finish()
    }
}
