//! Forum reward service
//!
//! Awards points to the creator of a thread in a rewarded forum.

use loyalty_common::RewardsConfig;
use loyalty_core::{Embed, PointsAward, RewardReason, RewardTable, Snowflake};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Forum reward service
pub struct ForumRewardService {
    ctx: ServiceContext,
    table: RewardTable,
    notify_owner: bool,
}

impl ForumRewardService {
    pub fn new(ctx: ServiceContext, config: &RewardsConfig) -> Self {
        Self {
            ctx,
            table: config.forum_rewards.clone(),
            notify_owner: config.forum_reward_dm,
        }
    }

    /// Handle a THREAD_CREATE
    ///
    /// Returns the points awarded, or `None` if the parent forum is not in
    /// the reward table.
    #[instrument(skip(self))]
    pub async fn on_thread_created(
        &self,
        thread_id: Snowflake,
        parent_id: Option<Snowflake>,
        owner_id: Option<Snowflake>,
    ) -> ServiceResult<Option<i64>> {
        let Some(forum_id) = parent_id else {
            return Ok(None);
        };
        let Some(points) = self.table.points_for(forum_id) else {
            debug!("Forum not rewarded");
            return Ok(None);
        };
        let Some(owner_id) = owner_id else {
            warn!("Thread has no owner; skipping reward");
            return Ok(None);
        };

        let award = PointsAward::new(
            owner_id,
            points,
            RewardReason::ForumThread {
                forum_id,
                thread_id,
            },
        )?;
        self.ctx.points()?.award(&award).await?;
        info!(user_id = %owner_id, points, "Forum thread rewarded");

        if self.notify_owner {
            self.notify(owner_id, thread_id, points);
        }

        Ok(Some(points))
    }

    fn notify(&self, owner_id: Snowflake, thread_id: Snowflake, points: i64) {
        let dm = self.ctx.dm_arc();
        let shutdown = self.ctx.shutdown().clone();
        let embed = Embed::new(
            "Points awarded",
            format!("You earned {points} point(s) for starting <#{thread_id}>."),
        )
        .with_color(Embed::REWARD_COLOR)
        .with_timestamp(chrono::Utc::now());

        tokio::spawn(async move {
            tokio::select! {
                () = shutdown.cancelled() => {}
                result = dm.send_dm_embed(owner_id, &embed) => {
                    if let Err(e) = result {
                        warn!(error = %e, user_id = %owner_id, "Failed to send reward DM");
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestCollaborators;
    use std::time::Duration;

    const FORUM: Snowflake = Snowflake::new(900);
    const OWNER: Snowflake = Snowflake::new(42);
    const THREAD: Snowflake = Snowflake::new(7);

    fn service(collab: &TestCollaborators, dm: bool) -> ForumRewardService {
        let config = RewardsConfig {
            forum_rewards: RewardTable::new().with_forum(FORUM, 15),
            forum_reward_dm: dm,
            ..RewardsConfig::default()
        };
        ForumRewardService::new(collab.context().unwrap(), &config)
    }

    #[tokio::test]
    async fn test_rewarded_forum_awards_mapped_points() {
        let collab = TestCollaborators::new();
        let service = service(&collab, false);

        let points = service
            .on_thread_created(THREAD, Some(FORUM), Some(OWNER))
            .await
            .unwrap();

        assert_eq!(points, Some(15));
        let awards = collab.points.awards();
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].user_id, OWNER);
        assert_eq!(awards[0].points, 15);
        assert_eq!(awards[0].reason, "Created thread <#7> in forum <#900>");
    }

    #[tokio::test]
    async fn test_other_forums_award_nothing() {
        let collab = TestCollaborators::new();
        let service = service(&collab, false);

        let points = service
            .on_thread_created(THREAD, Some(Snowflake::new(1)), Some(OWNER))
            .await
            .unwrap();
        assert_eq!(points, None);

        let points = service.on_thread_created(THREAD, None, Some(OWNER)).await.unwrap();
        assert_eq!(points, None);

        assert!(collab.points.awards().is_empty());
    }

    #[tokio::test]
    async fn test_owner_is_notified_by_dm() {
        let collab = TestCollaborators::new();
        let service = service(&collab, true);

        service
            .on_thread_created(THREAD, Some(FORUM), Some(OWNER))
            .await
            .unwrap();

        // Let the spawned DM task run
        for _ in 0..10 {
            if !collab.dm.sent().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(collab.dm.opened(), vec![OWNER]);
        let sent = collab.dm.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Snowflake::new(43));
        assert_eq!(sent[0].1.color, Some(Embed::REWARD_COLOR));
        assert!(sent[0].1.description.contains("15 point(s)"));
    }
}
