//! Heartbeat controller
//!
//! Sends a heartbeat every interval and detects a zombied connection: if the
//! previous heartbeat was not acknowledged by the next tick, the connection
//! is reported dead exactly once and no further heartbeats are sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use super::SessionManager;
use crate::protocol::GatewayMessage;

/// Outcome of a scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    /// Previous heartbeat was acknowledged; send the next one
    Send,
    /// Previous heartbeat is still outstanding
    Zombie,
}

/// Per-connection heartbeat state
#[derive(Debug)]
pub struct HeartbeatController {
    interval: Duration,
    acked: AtomicBool,
}

impl HeartbeatController {
    /// Starts acknowledged so the first tick never reports a zombie
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            acked: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Decide what the scheduled tick does
    ///
    /// On `Send`, the new heartbeat becomes the one outstanding.
    pub fn tick(&self) -> Beat {
        if self.acked.swap(false, Ordering::SeqCst) {
            Beat::Send
        } else {
            Beat::Zombie
        }
    }

    /// Mark the outstanding heartbeat acknowledged (op 11)
    pub fn ack(&self) {
        self.acked.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_acked(&self) -> bool {
        self.acked.load(Ordering::SeqCst)
    }
}

/// Drive the heartbeat for one connection
///
/// The first beat is sent one full interval after start. Returns when
/// `cancel` fires, the outbound channel closes, or a zombie is detected; in
/// the last case `zombie` is signalled before returning.
pub async fn run_heartbeat(
    controller: Arc<HeartbeatController>,
    session: Arc<Mutex<SessionManager>>,
    outbound: mpsc::Sender<GatewayMessage>,
    zombie: oneshot::Sender<()>,
    cancel: CancellationToken,
) {
    let period = controller.interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        match controller.tick() {
            Beat::Send => {
                let sequence = session.lock().sequence();
                trace!(?sequence, "Sending heartbeat");
                if outbound.send(GatewayMessage::heartbeat(sequence)).await.is_err() {
                    return;
                }
            }
            Beat::Zombie => {
                warn!(
                    interval_ms = period.as_millis() as u64,
                    "Heartbeat not acknowledged; connection is zombied"
                );
                let _ = zombie.send(());
                return;
            }
        }
    }
}
