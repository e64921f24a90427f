//! Service context - dependency container for services
//!
//! Holds the collaborator handles the reward and presence services call.

use std::sync::Arc;

use loyalty_common::BotConfig;
use loyalty_core::{DmApi, MessageApi, PointsApi, PresenceConfigSource};
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::clients::{DiscordRestClient, HttpConfigSource, HttpPointsClient};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all collaborators
///
/// Cloning is cheap; every field is shared. The cancellation token is the
/// one the gateway cancels on shutdown, so background work spawned by
/// services (delayed deletes, DMs) stops with the process.
#[derive(Clone)]
pub struct ServiceContext {
    points: Option<Arc<dyn PointsApi>>,
    messages: Arc<dyn MessageApi>,
    dm: Arc<dyn DmApi>,
    presence_source: Option<Arc<dyn PresenceConfigSource>>,
    shutdown: CancellationToken,
}

impl ServiceContext {
    /// Build the HTTP-backed context from configuration
    pub fn from_config(config: &BotConfig, shutdown: CancellationToken) -> Self {
        let http = Client::new();
        let discord = Arc::new(DiscordRestClient::with_client(
            http.clone(),
            &config.discord.api_base,
            config.discord.token.clone(),
        ));

        let points = config.points.api_url.as_ref().map(|url| {
            Arc::new(HttpPointsClient::with_client(
                http.clone(),
                url.clone(),
                config.points.api_key.clone(),
            )) as Arc<dyn PointsApi>
        });
        let presence_source = config.presence.url.as_ref().map(|url| {
            Arc::new(HttpConfigSource::with_client(http.clone(), url.clone()))
                as Arc<dyn PresenceConfigSource>
        });

        Self {
            points,
            messages: discord.clone(),
            dm: discord,
            presence_source,
            shutdown,
        }
    }

    /// Get the points collaborator, if configured
    pub fn points(&self) -> ServiceResult<&dyn PointsApi> {
        self.points
            .as_deref()
            .ok_or_else(|| ServiceError::disabled("points"))
    }

    pub fn has_points(&self) -> bool {
        self.points.is_some()
    }

    pub fn messages(&self) -> &dyn MessageApi {
        self.messages.as_ref()
    }

    /// Shared handle, for work spawned past the current call
    pub fn messages_arc(&self) -> Arc<dyn MessageApi> {
        Arc::clone(&self.messages)
    }

    pub fn dm(&self) -> &dyn DmApi {
        self.dm.as_ref()
    }

    pub fn dm_arc(&self) -> Arc<dyn DmApi> {
        Arc::clone(&self.dm)
    }

    pub fn presence_source(&self) -> Option<&dyn PresenceConfigSource> {
        self.presence_source.as_deref()
    }

    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}

/// Builder for `ServiceContext`
#[derive(Default)]
pub struct ServiceContextBuilder {
    points: Option<Arc<dyn PointsApi>>,
    messages: Option<Arc<dyn MessageApi>>,
    dm: Option<Arc<dyn DmApi>>,
    presence_source: Option<Arc<dyn PresenceConfigSource>>,
    shutdown: Option<CancellationToken>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(mut self, points: Arc<dyn PointsApi>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn messages(mut self, messages: Arc<dyn MessageApi>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn dm(mut self, dm: Arc<dyn DmApi>) -> Self {
        self.dm = Some(dm);
        self
    }

    pub fn presence_source(mut self, source: Arc<dyn PresenceConfigSource>) -> Self {
        self.presence_source = Some(source);
        self
    }

    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Build the context
    ///
    /// # Errors
    /// Returns an error if the message or DM collaborator is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            points: self.points,
            messages: self
                .messages
                .ok_or_else(|| ServiceError::internal("message collaborator is required"))?,
            dm: self
                .dm
                .ok_or_else(|| ServiceError::internal("dm collaborator is required"))?,
            presence_source: self.presence_source,
            shutdown: self.shutdown.unwrap_or_default(),
        })
    }
}
