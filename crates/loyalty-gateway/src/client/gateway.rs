//! Gateway client
//!
//! Owns the socket for the life of the process. Each pass of the outer loop
//! opens one connection, runs it until it ends, then decides whether the
//! session survives and how long to wait before the next attempt.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use loyalty_service::PresenceSnapshot;
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::{GatewayConfig, GatewayError, GatewayResult, LoopAction, ReconnectReason};
use crate::connection::{run_heartbeat, ConnectionState, HeartbeatController, SessionManager};
use crate::handlers::{DispatchOutcome, EventDispatcher};
use crate::protocol::{
    connect_url, CloseCode, GatewayMessage, IdentifyPayload, OpCode, PresenceUpdatePayload,
    ResumePayload,
};
use crate::reconnect::ReconnectPolicy;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Buffer for frames queued by the heartbeat task
const OUTBOUND_BUFFER: usize = 16;

/// Close code for closes we start and intend to resume from
const RESUMABLE_CLOSE: u16 = 4000;

/// Per-connection state, dropped when the socket closes
struct Link {
    write: WsSink,
    outbound: mpsc::Sender<GatewayMessage>,
    heartbeat: Option<Arc<HeartbeatController>>,
    zombie: Option<oneshot::Sender<()>>,
    cancel: CancellationToken,
    resuming: bool,
}

/// Discord gateway client
pub struct GatewayClient {
    config: GatewayConfig,
    dispatcher: EventDispatcher,
    session: Arc<Mutex<SessionManager>>,
    policy: ReconnectPolicy,
    state: watch::Sender<ConnectionState>,
    /// Outlives each connection so changes made while disconnected are still seen
    presence_rx: watch::Receiver<PresenceSnapshot>,
    shutdown: CancellationToken,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, dispatcher: EventDispatcher, shutdown: CancellationToken) -> Self {
        let policy = ReconnectPolicy::new(&config.reconnect);
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let presence_rx = dispatcher.presence().subscribe();

        Self {
            config,
            dispatcher,
            session: Arc::new(Mutex::new(SessionManager::new())),
            policy,
            state,
            presence_rx,
            shutdown,
        }
    }

    /// Observe lifecycle transitions
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Arc<Mutex<SessionManager>> {
        self.session.clone()
    }

    /// Begin the lifecycle and run until shutdown, reconnecting indefinitely
    pub async fn start(mut self) {
        info!(gateway_url = %self.config.gateway_url, "Gateway client starting");

        while !self.shutdown.is_cancelled() {
            let action = self.run_connection().await;
            self.set_state(ConnectionState::Disconnected);

            let reason = match action {
                LoopAction::Shutdown => break,
                LoopAction::Reconnect(reason) => reason,
            };

            let delay = self.prepare_reconnect(&reason);
            info!(
                reason = %reason,
                delay_ms = delay.as_millis() as u64,
                attempt = self.policy.attempts(),
                "Reconnecting"
            );

            if !self.sleep_or_shutdown(delay).await {
                break;
            }
        }

        self.set_state(ConnectionState::Disconnected);
        info!("Gateway client stopped");
    }

    /// Apply the session rule for `reason` and pick the delay
    fn prepare_reconnect(&mut self, reason: &ReconnectReason) -> Duration {
        if !reason.is_resumable() {
            self.session.lock().invalidate();
        }

        if reason.is_invalid_session() {
            self.policy.invalid_session_delay()
        } else {
            self.policy.next_delay()
        }
    }

    async fn sleep_or_shutdown(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }

    /// One connection from open to close
    async fn run_connection(&mut self) -> LoopAction {
        let (url, resuming) = {
            let session = self.session.lock();
            match session.resume_gateway_url() {
                Some(resume_url) if session.has_valid_session() => (connect_url(resume_url), true),
                _ => (connect_url(&self.config.gateway_url), false),
            }
        };

        self.set_state(ConnectionState::Connecting);
        info!(url = %url, resuming, "Connecting to gateway");

        let stream = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => return LoopAction::Shutdown,
            result = connect_async(url.as_str()) => match result {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = %e, "Gateway connection failed");
                    return LoopAction::Reconnect(ReconnectReason::Transport(e.into()));
                }
            },
        };

        self.set_state(ConnectionState::Connected);
        let (write, mut read) = stream.split();
        let (outbound, mut outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (zombie, mut zombie_rx) = oneshot::channel();
        let mut link = Link {
            write,
            outbound,
            heartbeat: None,
            zombie: Some(zombie),
            cancel: self.shutdown.child_token(),
            resuming,
        };

        let mut presence_rx = self.presence_rx.clone();
        let mut presence_open = true;
        let mut zombie_armed = true;
        let hello_deadline = tokio::time::sleep(self.config.hello_timeout);
        tokio::pin!(hello_deadline);

        let action = loop {
            let ready = *self.state.borrow() == ConnectionState::Ready;

            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => {
                    info!("Shutdown requested; closing gateway connection");
                    self.close(&mut link, CloseCode::NORMAL, "shutting down").await;
                    break LoopAction::Shutdown;
                }

                result = &mut zombie_rx, if zombie_armed => {
                    zombie_armed = false;
                    if result.is_ok() {
                        self.close(&mut link, RESUMABLE_CLOSE, "heartbeat timeout").await;
                        break LoopAction::Reconnect(ReconnectReason::Zombie);
                    }
                }

                Some(message) = outbound_rx.recv() => {
                    if let Err(e) = send(&mut link.write, &message).await {
                        break LoopAction::Reconnect(ReconnectReason::Transport(e));
                    }
                }

                () = &mut hello_deadline, if link.heartbeat.is_none() => {
                    warn!(
                        timeout_ms = self.config.hello_timeout.as_millis() as u64,
                        "No Hello from gateway"
                    );
                    self.close(&mut link, RESUMABLE_CLOSE, "hello timeout").await;
                    break LoopAction::Reconnect(ReconnectReason::Transport(GatewayError::HelloTimeout));
                }

                changed = presence_rx.changed(), if ready && presence_open => {
                    if changed.is_err() {
                        presence_open = false;
                        continue;
                    }
                    let payload = PresenceUpdatePayload::from(&*presence_rx.borrow_and_update());
                    let frame = match GatewayMessage::presence_update(&payload) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "Presence update not encodable");
                            continue;
                        }
                    };
                    debug!(status = ?payload.status, "Sending presence update");
                    if let Err(e) = send(&mut link.write, &frame).await {
                        break LoopAction::Reconnect(ReconnectReason::Transport(e));
                    }
                }

                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let message = match GatewayMessage::from_json(&text) {
                            Ok(message) => message,
                            Err(e) => {
                                warn!(error = %e, "Dropping malformed frame");
                                continue;
                            }
                        };

                        match self.handle_message(&mut link, &mut presence_rx, message).await {
                            Ok(None) => {}
                            Ok(Some(action)) => break action,
                            Err(e) if e.is_transport() => {
                                break LoopAction::Reconnect(ReconnectReason::Transport(e));
                            }
                            Err(e) => warn!(error = %e, "Dropping frame"),
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let code = frame.map(|f| u16::from(f.code));
                        info!(close_code = ?code, "Gateway closed the connection");
                        break LoopAction::Reconnect(ReconnectReason::Closed(code));
                    }
                    Some(Ok(Message::Binary(_))) => debug!("Ignoring binary frame"),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Gateway read failed");
                        break LoopAction::Reconnect(ReconnectReason::Transport(e.into()));
                    }
                    None => break LoopAction::Reconnect(ReconnectReason::Closed(None)),
                },
            }
        };

        link.cancel.cancel();
        self.presence_rx = presence_rx;
        action
    }

    /// Handle one decoded frame
    ///
    /// Returns an action when the frame ends the connection.
    async fn handle_message(
        &mut self,
        link: &mut Link,
        presence_rx: &mut watch::Receiver<PresenceSnapshot>,
        message: GatewayMessage,
    ) -> GatewayResult<Option<LoopAction>> {
        if let Some(sequence) = message.s {
            self.session.lock().update_sequence(sequence);
        }

        match message.op {
            OpCode::Hello => {
                let hello = message
                    .as_hello()
                    .ok_or_else(|| GatewayError::protocol("Hello without heartbeat_interval"))?;
                self.on_hello(link, presence_rx, hello.heartbeat_interval).await?;
            }
            OpCode::HeartbeatAck => {
                trace!("Heartbeat acknowledged");
                if let Some(heartbeat) = &link.heartbeat {
                    heartbeat.ack();
                }
            }
            OpCode::Heartbeat => {
                let sequence = self.session.lock().sequence();
                debug!(?sequence, "Gateway requested a heartbeat");
                send(&mut link.write, &GatewayMessage::heartbeat(sequence)).await?;
            }
            OpCode::Reconnect => {
                info!("Gateway requested reconnect");
                self.close(link, RESUMABLE_CLOSE, "reconnect requested").await;
                return Ok(Some(LoopAction::Reconnect(ReconnectReason::ServerRequested)));
            }
            OpCode::InvalidSession => {
                let resumable = message.as_invalid_session().unwrap_or(false);
                warn!(resumable, "Session invalidated by gateway");
                self.close(link, CloseCode::NORMAL, "invalid session").await;
                return Ok(Some(LoopAction::Reconnect(ReconnectReason::InvalidSession {
                    resumable,
                })));
            }
            OpCode::Dispatch => {
                let GatewayMessage { t, d, .. } = message;
                let event = t.ok_or_else(|| GatewayError::protocol("Dispatch without event name"))?;
                self.on_dispatch(&event, d);
            }
            op => debug!(op = %op, "Ignoring client-only op code"),
        }

        Ok(None)
    }

    async fn on_hello(
        &mut self,
        link: &mut Link,
        presence_rx: &mut watch::Receiver<PresenceSnapshot>,
        interval_ms: u64,
    ) -> GatewayResult<()> {
        let Some(zombie) = link.zombie.take() else {
            debug!("Ignoring repeated Hello");
            return Ok(());
        };

        info!(heartbeat_interval_ms = interval_ms, "Hello received");
        let controller = Arc::new(HeartbeatController::new(Duration::from_millis(interval_ms)));
        tokio::spawn(run_heartbeat(
            controller.clone(),
            self.session.clone(),
            link.outbound.clone(),
            zombie,
            link.cancel.clone(),
        ));
        link.heartbeat = Some(controller);

        let resume = if link.resuming {
            self.resume_payload()
        } else {
            None
        };

        let frame = match resume {
            Some(payload) => {
                self.set_state(ConnectionState::Resuming);
                info!(session_id = %payload.session_id, seq = ?payload.seq, "Resuming session");
                GatewayMessage::resume(&payload)?
            }
            None => {
                self.session.lock().invalidate();
                self.set_state(ConnectionState::Identifying);
                let presence = PresenceUpdatePayload::from(&*presence_rx.borrow_and_update());
                info!(intents = self.config.intents.bits(), "Identifying");
                GatewayMessage::identify(
                    &IdentifyPayload::new(self.config.token.clone(), self.config.intents)
                        .with_presence(presence),
                )?
            }
        };

        send(&mut link.write, &frame).await
    }

    fn resume_payload(&self) -> Option<ResumePayload> {
        let session = self.session.lock();
        let session_id = session.session_id()?.to_string();

        Some(ResumePayload {
            token: self.config.token.clone(),
            session_id,
            seq: session.sequence(),
        })
    }

    fn on_dispatch(&mut self, event: &str, data: Option<serde_json::Value>) {
        trace!(event, "Dispatch received");

        match self.dispatcher.dispatch(event, data) {
            Ok(DispatchOutcome::Ready(ready)) => {
                self.session
                    .lock()
                    .store_ready(ready.session_id, ready.resume_gateway_url);
                self.set_state(ConnectionState::Ready);
                self.policy.reset();
            }
            Ok(DispatchOutcome::Resumed) => {
                info!("Session resumed");
                self.set_state(ConnectionState::Ready);
                self.policy.reset();
            }
            Ok(DispatchOutcome::Spawned | DispatchOutcome::Ignored) => {}
            Err(e) => warn!(event, code = e.error_code(), error = %e, "Dropping dispatch"),
        }
    }

    /// Send a close frame; the socket is dropped right after
    async fn close(&self, link: &mut Link, code: u16, reason: &'static str) {
        self.set_state(ConnectionState::Closing);
        debug!(close_code = code, reason, "Closing gateway connection");

        let frame = CloseFrame {
            code: WsCloseCode::from(code),
            reason: reason.into(),
        };
        if let Err(e) = link.write.send(Message::Close(Some(frame))).await {
            debug!(error = %e, "Close frame not sent");
        }
    }

    fn set_state(&self, next: ConnectionState) {
        let current = *self.state.borrow();
        if current == next {
            return;
        }
        if !current.can_transition_to(next) {
            warn!(from = %current, to = %next, "Unexpected state transition");
        }
        debug!(from = %current, to = %next, "Connection state changed");
        self.state.send_replace(next);
    }
}

async fn send(write: &mut WsSink, message: &GatewayMessage) -> GatewayResult<()> {
    let json = message.to_json()?;
    trace!(op = %message.op, "Sending frame");
    write.send(Message::Text(json)).await?;
    Ok(())
}
