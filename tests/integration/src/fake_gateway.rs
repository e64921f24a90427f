//! In-process fake gateway
//!
//! Accepts WebSocket connections on a random local port and hands each one
//! to the test, which then plays the Discord side of the protocol.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use futures_util::{SinkExt, StreamExt};
use loyalty_gateway::protocol::{GatewayMessage, OpCode};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// How long any single expectation may wait
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Fake gateway listening on localhost
pub struct FakeGateway {
    addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<GatewaySocket>,
    _handle: JoinHandle<()>,
}

impl FakeGateway {
    /// Bind a random port and start accepting
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, connections) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Ok(socket) = GatewaySocket::accept(stream).await {
                        let _ = tx.send(socket);
                    }
                });
            }
        });

        Ok(Self {
            addr,
            connections,
            _handle: handle,
        })
    }

    /// Base URL for fresh connections
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// URL handed out as `resume_gateway_url`
    pub fn resume_url(&self) -> String {
        format!("ws://{}/resume", self.addr)
    }

    /// Wait for the client to open the next connection
    pub async fn next_connection(&mut self) -> Result<GatewaySocket> {
        tokio::time::timeout(STEP_TIMEOUT, self.connections.recv())
            .await
            .map_err(|_| anyhow!("client did not connect"))?
            .ok_or_else(|| anyhow!("listener stopped"))
    }

    /// Accept a connection and complete the handshake: Hello, then the
    /// client's Identify or Resume
    pub async fn handshake(&mut self, heartbeat_interval: u64) -> Result<(GatewaySocket, GatewayMessage)> {
        let mut socket = self.next_connection().await?;
        socket.send(&GatewayMessage::hello(heartbeat_interval)).await?;
        let first = socket.recv_skipping_heartbeats().await?;
        Ok((socket, first))
    }
}

/// One accepted client connection
pub struct GatewaySocket {
    ws: WebSocketStream<TcpStream>,
    /// Request path and query the client connected with
    pub path: String,
    sequence: u64,
}

impl GatewaySocket {
    async fn accept(stream: TcpStream) -> Result<Self> {
        let mut path = String::new();
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            path = request.uri().to_string();
            Ok(response)
        };
        let ws = tokio_tungstenite::accept_hdr_async(stream, callback).await?;

        Ok(Self {
            ws,
            path,
            sequence: 0,
        })
    }

    pub async fn send(&mut self, message: &GatewayMessage) -> Result<()> {
        self.ws.send(Message::Text(message.to_json()?)).await?;
        Ok(())
    }

    /// Send a dispatch with the next sequence number
    pub async fn dispatch(&mut self, event: &str, data: Value) -> Result<u64> {
        self.sequence += 1;
        self.send(&GatewayMessage::dispatch(event, self.sequence, data)).await?;
        Ok(self.sequence)
    }

    /// Send READY for `session_id`
    pub async fn ready(&mut self, session_id: &str, resume_url: &str) -> Result<u64> {
        self.dispatch(
            "READY",
            json!({
                "v": 10,
                "user": {"id": "1", "username": "loyalty", "bot": true},
                "guilds": [],
                "session_id": session_id,
                "resume_gateway_url": resume_url,
            }),
        )
        .await
    }

    pub async fn close(&mut self, code: u16) -> Result<()> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: "".into(),
        };
        self.ws.send(Message::Close(Some(frame))).await?;
        Ok(())
    }

    /// Next frame sent by the client
    pub async fn recv(&mut self) -> Result<GatewayMessage> {
        loop {
            let frame = tokio::time::timeout(STEP_TIMEOUT, self.ws.next())
                .await
                .map_err(|_| anyhow!("no frame from client"))?;

            match frame {
                Some(Ok(Message::Text(text))) => return Ok(GatewayMessage::from_json(&text)?),
                Some(Ok(Message::Close(frame))) => {
                    bail!("client closed: {:?}", frame.map(|f| u16::from(f.code)))
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => bail!("connection ended"),
            }
        }
    }

    pub async fn recv_skipping_heartbeats(&mut self) -> Result<GatewayMessage> {
        loop {
            let message = self.recv().await?;
            if message.op != OpCode::Heartbeat {
                return Ok(message);
            }
        }
    }

    /// Wait for the client to close; returns the close code it sent
    pub async fn expect_closed(&mut self) -> Result<Option<u16>> {
        loop {
            let frame = tokio::time::timeout(STEP_TIMEOUT, self.ws.next())
                .await
                .map_err(|_| anyhow!("client did not close"))?;

            match frame {
                Some(Ok(Message::Close(frame))) => return Ok(frame.map(|f| u16::from(f.code))),
                Some(Ok(_)) => {}
                Some(Err(_)) | None => return Ok(None),
            }
        }
    }
}
