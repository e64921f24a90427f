//! Reward models
//!
//! Points awards sent to the points collaborator and the forum reward table.

use crate::error::DomainError;
use crate::value_objects::Snowflake;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Why points were awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardReason {
    /// The user reached a message-count milestone in a tracked channel
    MessageMilestone { channel_id: Snowflake, messages: u32 },
    /// The user opened a thread in a rewarded forum
    ForumThread {
        forum_id: Snowflake,
        thread_id: Snowflake,
    },
}

impl fmt::Display for RewardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageMilestone {
                channel_id,
                messages,
            } => write!(f, "Sent {messages} messages in <#{channel_id}>"),
            Self::ForumThread {
                forum_id,
                thread_id,
            } => write!(f, "Created thread <#{thread_id}> in forum <#{forum_id}>"),
        }
    }
}

/// Body of a points-award call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsAward {
    pub user_id: Snowflake,
    pub points: i64,
    pub reason: String,
}

impl PointsAward {
    /// Build an award, rejecting non-positive point values
    pub fn new(user_id: Snowflake, points: i64, reason: RewardReason) -> Result<Self, DomainError> {
        if points <= 0 {
            return Err(DomainError::InvalidPoints(points));
        }
        Ok(Self {
            user_id,
            points,
            reason: reason.to_string(),
        })
    }
}

/// Forum id → points table for THREAD_CREATE rewards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardTable {
    entries: HashMap<Snowflake, i64>,
}

impl RewardTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a forum entry
    #[must_use]
    pub fn with_forum(mut self, forum_id: Snowflake, points: i64) -> Self {
        self.entries.insert(forum_id, points);
        self
    }

    /// Parse `forumId:points,forumId:points`
    ///
    /// Blank input yields an empty table.
    pub fn parse(spec: &str) -> Result<Self, DomainError> {
        let mut table = Self::new();

        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (forum, points) = entry
                .split_once(':')
                .ok_or_else(|| DomainError::InvalidRewardEntry(entry.to_string()))?;

            let forum_id = Snowflake::parse(forum)
                .map_err(|_| DomainError::InvalidRewardEntry(entry.to_string()))?;
            let points: i64 = points
                .trim()
                .parse()
                .map_err(|_| DomainError::InvalidRewardEntry(entry.to_string()))?;
            if points <= 0 {
                return Err(DomainError::InvalidPoints(points));
            }

            table.entries.insert(forum_id, points);
        }

        Ok(table)
    }

    /// Points awarded for a thread under `forum_id`, if rewarded
    #[must_use]
    pub fn points_for(&self, forum_id: Snowflake) -> Option<i64> {
        self.entries.get(&forum_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
