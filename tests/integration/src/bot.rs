//! Runs the gateway client against a fake gateway

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use loyalty_common::{ReconnectConfig, ReconnectStrategy, RewardsConfig};
use loyalty_core::{PresenceConfig, RewardTable, Snowflake};
use loyalty_gateway::connection::ConnectionState;
use loyalty_gateway::{EventDispatcher, GatewayClient, GatewayConfig};
use loyalty_service::testing::TestCollaborators;
use loyalty_service::{ForumRewardService, MessageRewardService, PresenceService};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const TRACKED_CHANNEL: Snowflake = Snowflake::new(100);
pub const REWARDED_FORUM: Snowflake = Snowflake::new(900);
pub const FORUM_POINTS: i64 = 10;

/// A running bot wired to recording collaborators
pub struct TestBot {
    pub collab: TestCollaborators,
    pub state: watch::Receiver<ConnectionState>,
    pub presence: Arc<PresenceService>,
    handle: JoinHandle<()>,
}

impl TestBot {
    /// Start the client against `gateway_url` with short reconnect delays
    pub fn start(gateway_url: &str) -> Result<Self> {
        Self::start_with_delay(gateway_url, 50)
    }

    /// Start the client with a fixed reconnect delay of `delay_ms`
    pub fn start_with_delay(gateway_url: &str, delay_ms: u64) -> Result<Self> {
        let collab = TestCollaborators::new();
        let ctx = collab.context()?;

        let rewards = RewardsConfig {
            tracked_channels: [TRACKED_CHANNEL].into_iter().collect(),
            forum_rewards: RewardTable::new().with_forum(REWARDED_FORUM, FORUM_POINTS),
            ..RewardsConfig::default()
        };
        let presence = Arc::new(PresenceService::new(ctx.clone(), PresenceConfig::default()));
        let dispatcher = EventDispatcher::new(
            Arc::new(MessageRewardService::new(ctx.clone(), &rewards)),
            Arc::new(ForumRewardService::new(ctx, &rewards)),
            presence.clone(),
            Duration::from_secs(30),
            collab.shutdown.clone(),
        );

        let config = GatewayConfig::new("test-token", gateway_url).with_reconnect(ReconnectConfig {
            strategy: ReconnectStrategy::Fixed,
            delay_ms,
            max_delay_ms: delay_ms,
            invalid_session_delay_ms: delay_ms,
        });
        let client = GatewayClient::new(config, dispatcher, collab.shutdown.clone());
        let state = client.state_receiver();
        let handle = tokio::spawn(client.start());

        Ok(Self {
            collab,
            state,
            presence,
            handle,
        })
    }

    /// Wait until the client reports `expected`
    pub async fn wait_for_state(&mut self, expected: ConnectionState) -> Result<()> {
        let wait = self.state.wait_for(|state| *state == expected);
        match tokio::time::timeout(crate::STEP_TIMEOUT, wait).await {
            Ok(Ok(_)) => Ok(()),
            _ => bail!("client never reached {expected}"),
        }
    }

    /// Cancel the shutdown token and wait for the client to stop
    pub async fn shutdown(self) -> Result<()> {
        self.collab.shutdown.cancel();
        tokio::time::timeout(crate::STEP_TIMEOUT, self.handle).await??;
        Ok(())
    }
}

/// Poll `check` until it holds or the step timeout passes
pub async fn eventually<F: Fn() -> bool>(check: F) -> Result<()> {
    let deadline = tokio::time::Instant::now() + crate::STEP_TIMEOUT;
    while !check() {
        if tokio::time::Instant::now() > deadline {
            bail!("condition not met in time");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}
