use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::fixtures::test_app::TestApp;

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for WS frame")
            .expect("WS stream ended")
            .expect("WS read failed");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("WS frame is not JSON");
        }
    }
}

/// Read frames until one of the given type arrives.
async fn wait_for(ws: &mut WsStream, frame_type: &str) -> Value {
    loop {
        let frame = next_json(ws).await;
        if frame["type"] == frame_type {
            return frame;
        }
    }
}

#[tokio::test]
async fn session_opens_with_connected_frame_and_answers_ping() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("socketeer").await;

    let (mut ws, _) = connect_async(app.ws_url(&user.access_token))
        .await
        .expect("WS handshake failed");

    let connected = next_json(&mut ws).await;
    assert_eq!(connected["type"], "connected");
    assert_eq!(connected["user_id"], user.id.to_hex());

    ws.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();
    let pong = next_json(&mut ws).await;
    assert_eq!(pong["type"], "pong");
}

#[tokio::test]
async fn invalid_token_is_rejected_at_handshake() {
    let app = TestApp::spawn().await;

    let result = connect_async(app.ws_url("not-a-jwt")).await;
    assert!(result.is_err(), "handshake must fail for a bad token");
}

#[tokio::test]
async fn check_in_streams_gamification_events_to_the_session() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("livewire").await;

    let (mut ws, _) = connect_async(app.ws_url(&user.access_token))
        .await
        .unwrap();
    let connected = next_json(&mut ws).await;
    assert_eq!(connected["type"], "connected");

    let resp = app
        .auth_post("/api/event/checkin", &user.access_token)
        .json(&serde_json::json!({ "visit_id": "live-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let points = wait_for(&mut ws, "points_updated").await;
    assert_eq!(points["data"]["amount"], 10);
    assert_eq!(points["data"]["reason"], "check_in");

    let streak = wait_for(&mut ws, "streak_updated").await;
    assert_eq!(streak["data"]["streak"], 1);

    let unlocked = wait_for(&mut ws, "achievement_unlocked").await;
    assert_eq!(unlocked["data"]["badge_id"], "first_visit");

    // The persisted badge notification also arrives as a frame
    let notification = wait_for(&mut ws, "notification").await;
    assert_eq!(notification["notification"]["type"], "achievement_earned");
    assert_eq!(
        notification["notification"]["navigation"]["route"],
        "/achievements"
    );
}

#[tokio::test]
async fn mission_claim_streams_completion_event() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("finisher").await;

    app.auth_post(
        "/api/gamification/missions/weekly_explorer/progress",
        &user.access_token,
    )
    .json(&serde_json::json!({ "requirement_index": 0, "increment_by": 3 }))
    .send()
    .await
    .unwrap();

    let (mut ws, _) = connect_async(app.ws_url(&user.access_token))
        .await
        .unwrap();
    next_json(&mut ws).await; // connected

    let resp = app
        .auth_post(
            "/api/gamification/missions/weekly_explorer/complete",
            &user.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let completed = wait_for(&mut ws, "mission_completed").await;
    assert_eq!(completed["data"]["mission_id"], "weekly_explorer");
    assert_eq!(completed["data"]["points_awarded"], 150);
}
