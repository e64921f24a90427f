//! Dispatch event handlers
//!
//! Routes op 0 dispatch frames to the reward services by event name.

mod error;
mod message;
mod thread;

pub use error::{HandlerError, HandlerResult};
pub use message::MessageCreateHandler;
pub use thread::ThreadCreateHandler;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use loyalty_service::{ForumRewardService, MessageRewardService, PresenceService};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::events::{GatewayEventType, MessageCreateEvent, ReadyEvent, ThreadCreateEvent};

/// What the connection has to do after a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// New session established
    Ready(ReadyEvent),
    /// Previous session resumed
    Resumed,
    /// Business handler started in the background
    Spawned,
    /// Event not handled by this bot
    Ignored,
}

/// Routes dispatch events to their handlers
///
/// Payloads are decoded synchronously so malformed frames surface to the
/// connection; the collaborator calls run as tasks so the read loop keeps
/// serving heartbeats. Spawned tasks stop when `shutdown` fires.
pub struct EventDispatcher {
    messages: Arc<MessageRewardService>,
    forum: Arc<ForumRewardService>,
    presence: Arc<PresenceService>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(
        messages: Arc<MessageRewardService>,
        forum: Arc<ForumRewardService>,
        presence: Arc<PresenceService>,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            messages,
            forum,
            presence,
            poll_interval,
            shutdown,
        }
    }

    pub fn presence(&self) -> &Arc<PresenceService> {
        &self.presence
    }

    /// Handle a dispatch frame
    pub fn dispatch(&self, event: &str, data: Option<Value>) -> HandlerResult<DispatchOutcome> {
        match GatewayEventType::parse(event) {
            GatewayEventType::Ready => {
                let ready: ReadyEvent = decode("READY", data)?;
                tracing::info!(
                    session_id = %ready.session_id,
                    user = %ready.user.username,
                    "Gateway ready"
                );

                // No-op after the first READY
                self.presence.start(self.poll_interval);

                Ok(DispatchOutcome::Ready(ready))
            }
            GatewayEventType::Resumed => Ok(DispatchOutcome::Resumed),
            GatewayEventType::MessageCreate => {
                let message: MessageCreateEvent = decode("MESSAGE_CREATE", data)?;
                let service = self.messages.clone();
                self.spawn("MESSAGE_CREATE", async move {
                    MessageCreateHandler::handle(&service, message).await.map(drop)
                });
                Ok(DispatchOutcome::Spawned)
            }
            GatewayEventType::ThreadCreate => {
                let thread: ThreadCreateEvent = decode("THREAD_CREATE", data)?;
                let service = self.forum.clone();
                self.spawn("THREAD_CREATE", async move {
                    ThreadCreateHandler::handle(&service, thread).await.map(drop)
                });
                Ok(DispatchOutcome::Spawned)
            }
            GatewayEventType::Other(name) => {
                tracing::trace!(event = %name, "Ignoring dispatch");
                Ok(DispatchOutcome::Ignored)
            }
        }
    }

    fn spawn<F>(&self, event: &'static str, handler: F)
    where
        F: Future<Output = HandlerResult<()>> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::debug!(event, "Handler cancelled by shutdown");
                }
                result = handler => {
                    if let Err(e) = result {
                        tracing::warn!(event, code = e.error_code(), error = %e, "Handler failed");
                    }
                }
            }
        });
    }
}

fn decode<T: DeserializeOwned>(event: &'static str, data: Option<Value>) -> HandlerResult<T> {
    let data = data.ok_or_else(|| HandlerError::InvalidPayload(format!("{event} without data")))?;
    serde_json::from_value(data).map_err(|e| HandlerError::decode(event, e))
}
