//! In-memory collaborators that record every call

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use loyalty_core::{
    DmApi, DomainError, Embed, MessageApi, PointsApi, PointsAward, PresenceConfigSource,
    RepoResult, Snowflake,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::services::{ServiceContext, ServiceContextBuilder, ServiceResult};

#[derive(Debug, Default)]
pub struct RecordingPoints {
    awards: Mutex<Vec<PointsAward>>,
    failing: AtomicBool,
}

impl RecordingPoints {
    pub fn awards(&self) -> Vec<PointsAward> {
        self.awards.lock().clone()
    }

    /// Make every later call fail with a 500
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PointsApi for RecordingPoints {
    async fn award(&self, award: &PointsAward) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::UnexpectedStatus {
                collaborator: "points",
                status: 500,
            });
        }
        self.awards.lock().push(award.clone());
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingMessages {
    created: Mutex<Vec<(Snowflake, String)>>,
    deleted: Mutex<Vec<(Snowflake, Snowflake)>>,
    next_id: AtomicU64,
}

impl Default for RecordingMessages {
    fn default() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1_000),
        }
    }
}

impl RecordingMessages {
    pub fn created(&self) -> Vec<(Snowflake, String)> {
        self.created.lock().clone()
    }

    pub fn deleted(&self) -> Vec<(Snowflake, Snowflake)> {
        self.deleted.lock().clone()
    }
}

#[async_trait]
impl MessageApi for RecordingMessages {
    async fn create_message(&self, channel_id: Snowflake, content: &str) -> RepoResult<Snowflake> {
        self.created.lock().push((channel_id, content.to_string()));
        Ok(Snowflake::new(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake) -> RepoResult<()> {
        self.deleted.lock().push((channel_id, message_id));
        Ok(())
    }
}

/// DM channel ids are the user id plus 1
#[derive(Debug, Default)]
pub struct RecordingDm {
    opened: Mutex<Vec<Snowflake>>,
    sent: Mutex<Vec<(Snowflake, Embed)>>,
}

impl RecordingDm {
    pub fn opened(&self) -> Vec<Snowflake> {
        self.opened.lock().clone()
    }

    pub fn sent(&self) -> Vec<(Snowflake, Embed)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl DmApi for RecordingDm {
    async fn open_dm(&self, user_id: Snowflake) -> RepoResult<Snowflake> {
        self.opened.lock().push(user_id);
        Ok(Snowflake::new(user_id.into_inner() + 1))
    }

    async fn send_embed(&self, channel_id: Snowflake, embed: &Embed) -> RepoResult<()> {
        self.sent.lock().push((channel_id, embed.clone()));
        Ok(())
    }
}

/// Serves queued documents in order, repeating the last one
#[derive(Debug, Default)]
pub struct ScriptedConfigSource {
    queue: Mutex<VecDeque<Value>>,
    last: Mutex<Option<Value>>,
    fetches: AtomicU64,
}

impl ScriptedConfigSource {
    pub fn new(documents: impl IntoIterator<Item = Value>) -> Self {
        Self {
            queue: Mutex::new(documents.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn push(&self, document: Value) {
        self.queue.lock().push_back(document);
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PresenceConfigSource for ScriptedConfigSource {
    async fn fetch(&self) -> RepoResult<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock();
        if let Some(next) = self.queue.lock().pop_front() {
            *last = Some(next);
        }
        last.clone().ok_or_else(|| DomainError::UnexpectedStatus {
            collaborator: "presence-config",
            status: 404,
        })
    }
}

/// Recording collaborators plus a context wired to them
pub struct TestCollaborators {
    pub points: Arc<RecordingPoints>,
    pub messages: Arc<RecordingMessages>,
    pub dm: Arc<RecordingDm>,
    pub config_source: Arc<ScriptedConfigSource>,
    pub shutdown: CancellationToken,
}

impl Default for TestCollaborators {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCollaborators {
    pub fn new() -> Self {
        Self {
            points: Arc::new(RecordingPoints::default()),
            messages: Arc::new(RecordingMessages::default()),
            dm: Arc::new(RecordingDm::default()),
            config_source: Arc::new(ScriptedConfigSource::default()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Context with every collaborator configured
    pub fn context(&self) -> ServiceResult<ServiceContext> {
        ServiceContextBuilder::new()
            .points(self.points.clone())
            .messages(self.messages.clone())
            .dm(self.dm.clone())
            .presence_source(self.config_source.clone())
            .shutdown(self.shutdown.clone())
            .build()
    }
}
