//! # loyalty-gateway
//!
//! Discord gateway client for the loyalty bot: keeps one WebSocket session
//! alive, resumes it when possible, and routes dispatch events to the reward
//! services.

pub mod client;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod reconnect;

use std::sync::Arc;

use loyalty_common::{AppResult, BotConfig};
use loyalty_core::PresenceConfig;
use loyalty_service::{
    ForumRewardService, MessageRewardService, PresenceService, ServiceContext,
};
use tokio_util::sync::CancellationToken;

pub use client::{GatewayClient, GatewayConfig, GatewayError};
pub use handlers::EventDispatcher;

/// Wire the services and the event dispatcher around a context
pub fn build_dispatcher(
    config: &BotConfig,
    ctx: ServiceContext,
    shutdown: CancellationToken,
) -> EventDispatcher {
    let messages = Arc::new(MessageRewardService::new(ctx.clone(), &config.rewards));
    let forum = Arc::new(ForumRewardService::new(ctx.clone(), &config.rewards));
    let presence = Arc::new(PresenceService::new(ctx, PresenceConfig::default()));

    EventDispatcher::new(
        messages,
        forum,
        presence,
        config.presence.poll_interval(),
        shutdown,
    )
}

/// Run the bot until `shutdown` is cancelled
pub async fn run(config: BotConfig, shutdown: CancellationToken) -> AppResult<()> {
    let ctx = ServiceContext::from_config(&config, shutdown.clone());
    if !ctx.has_points() {
        tracing::warn!("POINTS_API_URL not set; rewards will not be awarded");
    }
    if ctx.presence_source().is_none() {
        tracing::info!("PRESENCE_CONFIG_URL not set; using the default presence");
    }
    tracing::info!(
        tracked_channels = config.rewards.tracked_channels.len(),
        rewarded_forums = config.rewards.forum_rewards.len(),
        threshold = config.rewards.message_threshold,
        "Reward rules loaded"
    );

    let dispatcher = build_dispatcher(&config, ctx, shutdown.clone());
    let client = GatewayClient::new(GatewayConfig::from_bot_config(&config), dispatcher, shutdown);
    client.start().await;

    Ok(())
}
