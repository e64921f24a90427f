//! MESSAGE_CREATE handler

use loyalty_service::{MessageReward, MessageRewardService};

use super::HandlerResult;
use crate::events::MessageCreateEvent;

/// Counts tracked-channel messages toward rewards
pub struct MessageCreateHandler;

impl MessageCreateHandler {
    pub async fn handle(
        service: &MessageRewardService,
        event: MessageCreateEvent,
    ) -> HandlerResult<Option<MessageReward>> {
        tracing::trace!(
            message_id = %event.id,
            channel_id = %event.channel_id,
            "Message received"
        );

        let reward = service
            .on_message(event.author.id, event.channel_id, event.author.bot)
            .await?;

        Ok(reward)
    }
}
