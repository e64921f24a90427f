//! Collaborator traits - the interfaces external systems are reached through
//!
//! The domain layer defines what it needs; `loyalty-service` provides the
//! HTTP implementations and tests provide in-memory ones.

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{Embed, PointsAward};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for collaborator operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Points Collaborator
// ============================================================================

#[async_trait]
pub trait PointsApi: Send + Sync {
    /// Credit points to a user's loyalty account
    async fn award(&self, award: &PointsAward) -> RepoResult<()>;
}

// ============================================================================
// Channel Message Collaborator
// ============================================================================

#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Post a message to a channel, returning the new message id
    async fn create_message(&self, channel_id: Snowflake, content: &str) -> RepoResult<Snowflake>;

    /// Delete a message from a channel
    async fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Direct Message Collaborator
// ============================================================================

#[async_trait]
pub trait DmApi: Send + Sync {
    /// Open (or reuse) a DM channel with a user, returning its id
    async fn open_dm(&self, user_id: Snowflake) -> RepoResult<Snowflake>;

    /// Send an embed into a channel
    async fn send_embed(&self, channel_id: Snowflake, embed: &Embed) -> RepoResult<()>;

    /// Open a DM channel and send an embed into it
    async fn send_dm_embed(&self, user_id: Snowflake, embed: &Embed) -> RepoResult<()> {
        let channel_id = self.open_dm(user_id).await?;
        self.send_embed(channel_id, embed).await
    }
}

// ============================================================================
// Presence Config Source
// ============================================================================

#[async_trait]
pub trait PresenceConfigSource: Send + Sync {
    /// Fetch the current presence document (merged shallowly by the caller)
    async fn fetch(&self) -> RepoResult<Value>;
}
