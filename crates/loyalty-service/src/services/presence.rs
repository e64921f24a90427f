//! Presence service
//!
//! Owns the current presence configuration, polls the external config source
//! and advances the status rotation. Every change is published on a watch
//! channel; the gateway forwards it to Discord as a presence update.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loyalty_core::{ActivityType, PresenceConfig, PresenceStatus};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// What the bot should currently show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub status: PresenceStatus,
    /// Activity name and type; `None` shows no activity
    pub activity: Option<(String, ActivityType)>,
}

impl PresenceSnapshot {
    fn from_config(config: &PresenceConfig, step: usize) -> Self {
        Self {
            status: config.status(),
            activity: config
                .activity_at(step)
                .map(|name| (name.to_string(), config.activity_type)),
        }
    }
}

/// Presence service
pub struct PresenceService {
    ctx: ServiceContext,
    config: RwLock<PresenceConfig>,
    step: AtomicUsize,
    started: AtomicBool,
    updates: watch::Sender<PresenceSnapshot>,
}

impl PresenceService {
    pub fn new(ctx: ServiceContext, initial: PresenceConfig) -> Self {
        let (updates, _) = watch::channel(PresenceSnapshot::from_config(&initial, 0));
        Self {
            ctx,
            config: RwLock::new(initial),
            step: AtomicUsize::new(0),
            started: AtomicBool::new(false),
            updates,
        }
    }

    pub fn current(&self) -> PresenceConfig {
        self.config.read().clone()
    }

    /// Presence for the current rotation step
    pub fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot::from_config(&self.config.read(), self.step.load(Ordering::SeqCst))
    }

    /// Receive every published presence change
    pub fn subscribe(&self) -> watch::Receiver<PresenceSnapshot> {
        self.updates.subscribe()
    }

    /// Fetch the external document and merge it over the current config
    ///
    /// Returns true if the published presence changed.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ServiceResult<bool> {
        let source = self
            .ctx
            .presence_source()
            .ok_or_else(|| ServiceError::disabled("presence config source"))?;
        let document = source.fetch().await?;

        let merged = self.config.read().merged_with(&document)?;
        {
            let mut config = self.config.write();
            if *config == merged {
                return Ok(false);
            }
            *config = merged;
        }
        debug!("Presence config updated");
        Ok(self.publish())
    }

    /// Move to the next rotation entry
    ///
    /// Returns true if the published presence changed.
    pub fn advance(&self) -> bool {
        if !self.config.read().rotation_enabled() {
            return false;
        }
        self.step.fetch_add(1, Ordering::SeqCst);
        self.publish()
    }

    fn publish(&self) -> bool {
        let next = self.snapshot();
        self.updates.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    /// Start config polling and rotation; later calls are no-ops
    ///
    /// Both loops stop when the context's shutdown token is cancelled.
    pub fn start(self: &Arc<Self>, poll_interval: Duration) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }

        if self.ctx.presence_source().is_some() {
            tokio::spawn(Arc::clone(self).poll_loop(poll_interval));
        } else {
            debug!("No presence config source; polling disabled");
        }
        tokio::spawn(Arc::clone(self).rotation_loop());

        info!(poll_interval_secs = poll_interval.as_secs(), "Presence loops started");
        true
    }

    async fn poll_loop(self: Arc<Self>, poll_interval: Duration) {
        let shutdown = self.ctx.shutdown().clone();
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match self.refresh().await {
                        Ok(true) => info!("Presence changed by config poll"),
                        Ok(false) => {}
                        Err(e) => warn!(error = %e, code = e.error_code(), "Presence config poll failed"),
                    }
                }
            }
        }
        debug!("Config poll loop stopped");
    }

    async fn rotation_loop(self: Arc<Self>) {
        let shutdown = self.ctx.shutdown().clone();

        loop {
            // Re-read each round; polling may change the interval
            let interval = Duration::from_secs(self.config.read().rotation_interval.max(1));
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(interval) => {
                    if self.advance() {
                        debug!("Presence rotated");
                    }
                }
            }
        }
        debug!("Rotation loop stopped");
    }
}
