use serde_json::Value;

use barkpark_services::dao::event_key::EventKeyDao;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn first_check_in_awards_points_streak_and_badge() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("rex").await;

    let resp = app
        .auth_post("/api/event/checkin", &user.access_token)
        .json(&serde_json::json!({ "visit_id": "visit-1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();

    assert_eq!(json["duplicate"], false);
    assert_eq!(json["points"]["amount"], 10);
    assert_eq!(json["streak"]["current"], 1);
    assert_eq!(json["streak"]["previous"], 0);

    let badges = json["badges"].as_array().unwrap();
    assert!(
        badges.iter().any(|b| b["badge_id"] == "first_visit"),
        "first check-in should earn the first_visit badge: {badges:?}"
    );

    // Exactly one unread feed entry: the badge notification
    let resp = app
        .auth_get("/api/notification?unread_only=true", &user.access_token)
        .send()
        .await
        .unwrap();
    let feed: Value = resp.json().await.unwrap();
    let items = feed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "achievement_earned");
    assert_eq!(items[0]["is_read"], false);
}

#[tokio::test]
async fn replayed_visit_id_is_a_no_op() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("fido").await;

    let body = serde_json::json!({ "visit_id": "visit-once" });
    let first: Value = app
        .auth_post("/api/event/checkin", &user.access_token)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["duplicate"], false);

    let replay: Value = app
        .auth_post("/api/event/checkin", &user.access_token)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(replay["duplicate"], true);

    // Totals unchanged by the replay
    let stats: Value = app
        .auth_get("/api/gamification/stats", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // 10 for the check-in, 20 for the first_visit badge reward
    assert_eq!(stats["points"], 30);
    assert_eq!(stats["current_streak"], 1);
}

/// A claim left behind by a failed pass is released, so the retry is
/// processed in full rather than mistaken for a replay.
#[tokio::test]
async fn released_event_key_lets_a_retry_process() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("retrier").await;
    let keys = EventKeyDao::new(&app.db);

    // First delivery claims the key, then fails mid-pass; the engine
    // compensates by releasing the claim before surfacing the error.
    assert!(keys.try_claim(user.id, "checkin:visit-err").await.unwrap());
    assert!(keys.release(user.id, "checkin:visit-err").await.unwrap());

    let json: Value = app
        .auth_post("/api/event/checkin", &user.access_token)
        .json(&serde_json::json!({ "visit_id": "visit-err" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["duplicate"], false, "retry must not look like a replay");
    assert_eq!(json["points"]["amount"], 10);

    // Releasing an unclaimed key is a no-op
    assert!(!keys.release(user.id, "checkin:never-claimed").await.unwrap());
}

#[tokio::test]
async fn checkout_awards_points_without_touching_streak() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("bella").await;

    let json: Value = app
        .auth_post("/api/event/checkout", &user.access_token)
        .json(&serde_json::json!({ "visit_id": "visit-2" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["points"]["amount"], 5);
    assert!(json["streak"].is_null());
}

#[tokio::test]
async fn rating_update_earns_reduced_rate() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("luna").await;

    let created: Value = app
        .auth_post("/api/event/rating", &user.access_token)
        .json(&serde_json::json!({ "rating_id": "r1", "is_update": false }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["points"]["amount"], 15);
    let badges = created["badges"].as_array().unwrap();
    assert!(badges.iter().any(|b| b["badge_id"] == "first_rating"));

    let updated: Value = app
        .auth_post("/api/event/rating", &user.access_token)
        .json(&serde_json::json!({ "rating_id": "r1", "is_update": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["points"]["amount"], 5);
}

#[tokio::test]
async fn friend_accepted_creates_feed_entry() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("max").await;
    let friend = app.seed_user("buddy").await;

    let json: Value = app
        .auth_post("/api/event/friend-accepted", &user.access_token)
        .json(&serde_json::json!({
            "friend_id": friend.id.to_hex(),
            "request_id": "req-1",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["points"]["amount"], 10);

    let feed: Value = app
        .auth_get("/api/notification", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = feed["items"].as_array().unwrap();
    assert!(items.iter().any(|n| n["type"] == "friend_accepted"));
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/event/checkin"))
        .json(&serde_json::json!({ "visit_id": "v" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.token_for_missing_user();

    let resp = app
        .auth_post("/api/event/checkin", &token)
        .json(&serde_json::json!({ "visit_id": "v" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
