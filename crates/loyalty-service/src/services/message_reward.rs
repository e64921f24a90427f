//! Message reward service
//!
//! Counts messages in tracked channels and rewards every Nth one with points
//! and a short-lived acknowledgement message.

use std::collections::HashSet;
use std::time::Duration;

use loyalty_common::RewardsConfig;
use loyalty_core::{PointsAward, RewardReason, Snowflake};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::counter::MessageCounter;
use super::error::ServiceResult;

/// Result of a rewarded message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageReward {
    pub points: i64,
    /// Acknowledgement message scheduled for deletion
    pub ack_message_id: Option<Snowflake>,
}

/// Message reward service
pub struct MessageRewardService {
    ctx: ServiceContext,
    tracked_channels: HashSet<Snowflake>,
    points_per_milestone: i64,
    ack_delete_delay: Duration,
    counter: Mutex<MessageCounter>,
}

impl MessageRewardService {
    pub fn new(ctx: ServiceContext, config: &RewardsConfig) -> Self {
        Self {
            ctx,
            tracked_channels: config.tracked_channels.clone(),
            points_per_milestone: config.points_per_milestone,
            ack_delete_delay: config.ack_delete_delay(),
            counter: Mutex::new(MessageCounter::new(
                config.message_threshold,
                config.counter_capacity,
            )),
        }
    }

    pub fn is_tracked(&self, channel_id: Snowflake) -> bool {
        self.tracked_channels.contains(&channel_id)
    }

    /// Current count toward the next milestone
    pub fn count(&self, user_id: Snowflake, channel_id: Snowflake) -> u32 {
        self.counter.lock().count(user_id, channel_id)
    }

    /// Handle a MESSAGE_CREATE
    ///
    /// Returns `Ok(None)` when the message does not complete a milestone.
    #[instrument(skip(self))]
    pub async fn on_message(
        &self,
        author_id: Snowflake,
        channel_id: Snowflake,
        author_is_bot: bool,
    ) -> ServiceResult<Option<MessageReward>> {
        if author_is_bot || !self.is_tracked(channel_id) {
            return Ok(None);
        }

        let (milestone, threshold) = {
            let mut counter = self.counter.lock();
            (counter.record(author_id, channel_id), counter.threshold())
        };
        if !milestone {
            debug!("Message counted");
            return Ok(None);
        }

        let award = PointsAward::new(
            author_id,
            self.points_per_milestone,
            RewardReason::MessageMilestone {
                channel_id,
                messages: threshold,
            },
        )?;
        self.ctx.points()?.award(&award).await?;
        info!(points = award.points, "Message milestone rewarded");

        let content = format!(
            "<@{author_id}> earned {} point(s) for sending {threshold} messages!",
            award.points
        );
        let ack_message_id = match self.ctx.messages().create_message(channel_id, &content).await {
            Ok(message_id) => {
                self.schedule_delete(channel_id, message_id);
                Some(message_id)
            }
            Err(e) => {
                warn!(error = %e, "Failed to post acknowledgement");
                None
            }
        };

        Ok(Some(MessageReward {
            points: award.points,
            ack_message_id,
        }))
    }

    /// Delete the acknowledgement after the configured delay
    ///
    /// Skipped if shutdown is signalled first.
    fn schedule_delete(&self, channel_id: Snowflake, message_id: Snowflake) {
        let messages = self.ctx.messages_arc();
        let shutdown = self.ctx.shutdown().clone();
        let delay = self.ack_delete_delay;

        tokio::spawn(async move {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!(message_id = %message_id, "Shutdown before acknowledgement delete");
                }
                () = tokio::time::sleep(delay) => {
                    if let Err(e) = messages.delete_message(channel_id, message_id).await {
                        warn!(error = %e, message_id = %message_id, "Failed to delete acknowledgement");
                    }
                }
            }
        });
    }
}
