//! THREAD_CREATE handler

use loyalty_service::ForumRewardService;

use super::HandlerResult;
use crate::events::ThreadCreateEvent;

/// Rewards thread creators in configured forums
pub struct ThreadCreateHandler;

impl ThreadCreateHandler {
    /// Returns the points awarded, if any
    pub async fn handle(
        service: &ForumRewardService,
        event: ThreadCreateEvent,
    ) -> HandlerResult<Option<i64>> {
        tracing::debug!(
            thread_id = %event.id,
            parent_id = ?event.parent_id,
            name = %event.name,
            "Thread created"
        );

        let points = service
            .on_thread_created(event.id, event.parent_id, event.owner_id)
            .await?;

        Ok(points)
    }
}
