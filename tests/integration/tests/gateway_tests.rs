//! Gateway Integration Tests
//!
//! Runs the real gateway client against an in-process fake gateway over
//! localhost sockets. No external services are needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use integration_tests::{
    eventually, FakeGateway, TestBot, FORUM_POINTS, REWARDED_FORUM, TRACKED_CHANNEL,
};
use loyalty_gateway::connection::ConnectionState;
use loyalty_gateway::protocol::{GatewayMessage, OpCode};
use serde_json::json;

/// Long enough that no heartbeat fires during a test
const QUIET_INTERVAL: u64 = 41_250;

// ============================================================================
// Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_hello_without_session_identifies() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let mut bot = TestBot::start(&gateway.url()).unwrap();

    let (socket, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    assert!(socket.path.contains("v=10"));
    assert!(socket.path.contains("encoding=json"));
    assert!(!socket.path.starts_with("/resume"));

    assert_eq!(first.op, OpCode::Identify);
    let identify = first.as_identify().unwrap();
    assert_eq!(identify.token, "test-token");
    assert_eq!(identify.intents.bits(), 33281);
    assert!(identify.presence.is_some());

    bot.wait_for_state(ConnectionState::Identifying).await.unwrap();
    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_ready_transitions_to_ready() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let mut bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();

    bot.wait_for_state(ConnectionState::Ready).await.unwrap();
    bot.shutdown().await.unwrap();
}

// ============================================================================
// Reconnect Tests
// ============================================================================

#[tokio::test]
async fn test_resumable_close_resumes_at_resume_url() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let mut bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();
    let last = socket.dispatch("GUILD_CREATE", json!({"id": "5"})).await.unwrap();
    bot.wait_for_state(ConnectionState::Ready).await.unwrap();

    socket.close(4009).await.unwrap();

    let (socket, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    assert!(socket.path.starts_with("/resume"));
    assert_eq!(first.op, OpCode::Resume);

    let resume = first.as_resume().unwrap();
    assert_eq!(resume.session_id, "abc");
    assert_eq!(resume.seq, Some(last));
    assert_eq!(resume.token, "test-token");

    bot.wait_for_state(ConnectionState::Resuming).await.unwrap();
    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_resumed_returns_to_ready() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let mut bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();
    bot.wait_for_state(ConnectionState::Ready).await.unwrap();
    socket.close(4000).await.unwrap();

    let (mut socket, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    assert_eq!(first.op, OpCode::Resume);
    bot.wait_for_state(ConnectionState::Resuming).await.unwrap();

    socket.dispatch("RESUMED", json!({})).await.unwrap();
    bot.wait_for_state(ConnectionState::Ready).await.unwrap();
    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_non_resumable_close_identifies_fresh() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let mut bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();

    for code in [4004, 4010, 4011, 4012, 4013, 4014] {
        socket.ready("abc", &gateway.resume_url()).await.unwrap();
        bot.wait_for_state(ConnectionState::Ready).await.unwrap();

        socket.close(code).await.unwrap();

        let (next, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
        assert!(!next.path.starts_with("/resume"), "{code}");
        assert_eq!(first.op, OpCode::Identify, "{code}");
        socket = next;
    }

    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_session_identifies_fresh() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();

    // Even when the gateway marks it resumable
    socket.send(&GatewayMessage::invalid_session(true)).await.unwrap();
    socket.expect_closed().await.unwrap();

    let (socket, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    assert!(!socket.path.starts_with("/resume"));
    assert_eq!(first.op, OpCode::Identify);

    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reconnect_request_resumes() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();

    socket.send(&GatewayMessage::reconnect()).await.unwrap();
    assert_eq!(socket.expect_closed().await.unwrap(), Some(4000));

    let (_, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    assert_eq!(first.op, OpCode::Resume);

    bot.shutdown().await.unwrap();
}

// ============================================================================
// Heartbeat Tests
// ============================================================================

#[tokio::test]
async fn test_heartbeat_carries_last_sequence() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(200).await.unwrap();
    let seq = socket.ready("abc", &gateway.resume_url()).await.unwrap();

    let beat = socket.recv().await.unwrap();
    assert_eq!(beat.op, OpCode::Heartbeat);
    assert_eq!(beat.d, Some(json!(seq)));
    socket.send(&GatewayMessage::heartbeat_ack()).await.unwrap();

    // Acknowledged, so the next beat follows instead of a close
    let beat = socket.recv().await.unwrap();
    assert_eq!(beat.op, OpCode::Heartbeat);

    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_missed_ack_closes_and_resumes() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(200).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();

    let beat = socket.recv().await.unwrap();
    assert_eq!(beat.op, OpCode::Heartbeat);

    // No ack: the next tick declares the connection dead
    assert_eq!(socket.expect_closed().await.unwrap(), Some(4000));

    let (socket, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    assert!(socket.path.starts_with("/resume"));
    assert_eq!(first.op, OpCode::Resume);

    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_heartbeat_request_answered_immediately() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    let seq = socket.ready("abc", &gateway.resume_url()).await.unwrap();

    socket.send(&GatewayMessage::heartbeat(None)).await.unwrap();
    let beat = socket.recv().await.unwrap();
    assert_eq!(beat.op, OpCode::Heartbeat);
    assert_eq!(beat.d, Some(json!(seq)));

    bot.shutdown().await.unwrap();
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_fifth_message_awards_points() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();

    for n in 0..5 {
        socket
            .dispatch(
                "MESSAGE_CREATE",
                json!({
                    "id": (1000 + n).to_string(),
                    "channel_id": TRACKED_CHANNEL.to_string(),
                    "author": {"id": "42", "username": "member"},
                    "content": "gm"
                }),
            )
            .await
            .unwrap();
    }

    let points = bot.collab.points.clone();
    eventually(|| points.awards().len() == 1).await.unwrap();

    let messages = bot.collab.messages.clone();
    eventually(|| messages.created().len() == 1).await.unwrap();
    let (channel, content) = &messages.created()[0];
    assert_eq!(*channel, TRACKED_CHANNEL);
    assert!(content.contains("<@42>"));

    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_thread_in_rewarded_forum_awards_owner() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();
    socket
        .dispatch(
            "THREAD_CREATE",
            json!({
                "id": "7",
                "parent_id": REWARDED_FORUM.to_string(),
                "owner_id": "42",
                "name": "Show and tell"
            }),
        )
        .await
        .unwrap();

    let points = bot.collab.points.clone();
    eventually(|| points.awards().len() == 1).await.unwrap();
    assert_eq!(points.awards()[0].points, FORUM_POINTS);

    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_malformed_frame_is_dropped() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let mut bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.dispatch("MESSAGE_CREATE", json!({"id": "1"})).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();

    bot.wait_for_state(ConnectionState::Ready).await.unwrap();
    bot.shutdown().await.unwrap();
}

// ============================================================================
// Presence and Shutdown Tests
// ============================================================================

#[tokio::test]
async fn test_polled_config_sends_presence_update() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let bot = TestBot::start(&gateway.url()).unwrap();
    bot.collab
        .config_source
        .push(json!({"status": "Double points weekend"}));

    let (mut socket, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    assert_eq!(first.op, OpCode::Identify);
    socket.ready("abc", &gateway.resume_url()).await.unwrap();

    let update = socket.recv_skipping_heartbeats().await.unwrap();
    assert_eq!(update.op, OpCode::PresenceUpdate);
    let d = update.d.unwrap();
    assert_eq!(d["status"], "online");
    assert_eq!(d["activities"][0]["name"], "Double points weekend");

    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_presence_changed_while_disconnected_is_sent_after_resume() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let mut bot = TestBot::start_with_delay(&gateway.url(), 500).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();
    bot.wait_for_state(ConnectionState::Ready).await.unwrap();

    // The poll started by READY finds no document and changes nothing
    let source = bot.collab.config_source.clone();
    eventually(|| source.fetches() >= 1).await.unwrap();

    socket.close(4000).await.unwrap();
    bot.wait_for_state(ConnectionState::Disconnected).await.unwrap();

    bot.collab.config_source.push(json!({"status": "Double points"}));
    assert!(bot.presence.refresh().await.unwrap());

    let (mut socket, first) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    assert_eq!(first.op, OpCode::Resume);
    socket.dispatch("RESUMED", json!({})).await.unwrap();

    let update = socket.recv_skipping_heartbeats().await.unwrap();
    assert_eq!(update.op, OpCode::PresenceUpdate);
    assert_eq!(update.d.unwrap()["activities"][0]["name"], "Double points");

    bot.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_normally() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let mut bot = TestBot::start(&gateway.url()).unwrap();

    let (mut socket, _) = gateway.handshake(QUIET_INTERVAL).await.unwrap();
    socket.ready("abc", &gateway.resume_url()).await.unwrap();
    bot.wait_for_state(ConnectionState::Ready).await.unwrap();

    bot.collab.shutdown.cancel();
    assert_eq!(socket.expect_closed().await.unwrap(), Some(1000));
    bot.shutdown().await.unwrap();
}
