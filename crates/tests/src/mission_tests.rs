use serde_json::Value;

use crate::fixtures::seed::SeededUser;
use crate::fixtures::test_app::TestApp;

async fn progress(app: &TestApp, user: &SeededUser, mission_id: &str, by: u32) -> reqwest::Response {
    app.auth_post(
        &format!("/api/gamification/missions/{mission_id}/progress"),
        &user.access_token,
    )
    .json(&serde_json::json!({ "requirement_index": 0, "increment_by": by }))
    .send()
    .await
    .unwrap()
}

#[tokio::test]
async fn mission_completes_on_third_qualifying_update() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("explorer").await;

    for expected in 1..=2u32 {
        let json: Value = progress(&app, &user, "weekly_explorer", 1)
            .await
            .json()
            .await
            .unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["newly_completed"], false);
        assert_eq!(json["progress"][0]["current"], expected);
    }

    let third: Value = progress(&app, &user, "weekly_explorer", 1)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(third["status"], "completed");
    assert_eq!(third["newly_completed"], true);
    assert_eq!(third["progress"][0]["current"], 3);

    // A fourth update is rejected, not re-completed
    let resp = progress(&app, &user, "weekly_explorer", 1).await;
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn counters_clamp_at_target() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("clamper").await;

    let json: Value = progress(&app, &user, "weekly_explorer", 50)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(json["progress"][0]["current"], 3);
    assert_eq!(json["progress"][0]["target"], 3);
    assert_eq!(json["status"], "completed");
}

#[tokio::test]
async fn claim_pays_multiplied_points_and_reward_badge() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("claimer").await;

    progress(&app, &user, "weekly_explorer", 3).await;

    let json: Value = app
        .auth_post(
            "/api/gamification/missions/weekly_explorer/complete",
            &user.access_token,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // 100 base points at the 1.5x mission multiplier
    assert_eq!(json["points_awarded"], 150);
    let badges = json["badges"].as_array().unwrap();
    assert!(badges.iter().any(|b| b["badge_id"] == "explorer"));

    // Second claim loses the conditional update
    let resp = app
        .auth_post(
            "/api/gamification/missions/weekly_explorer/complete",
            &user.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn claiming_an_active_mission_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("early").await;

    progress(&app, &user, "weekly_explorer", 1).await;

    let resp = app
        .auth_post(
            "/api/gamification/missions/weekly_explorer/complete",
            &user.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn concurrent_claims_pay_exactly_once() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("racer").await;

    progress(&app, &user, "weekly_explorer", 3).await;

    let a = app
        .auth_post(
            "/api/gamification/missions/weekly_explorer/complete",
            &user.access_token,
        )
        .send();
    let b = app
        .auth_post(
            "/api/gamification/missions/weekly_explorer/complete",
            &user.access_token,
        )
        .send();
    let (a, b) = tokio::join!(a, b);

    let statuses = [a.unwrap().status().as_u16(), b.unwrap().status().as_u16()];
    assert_eq!(
        statuses.iter().filter(|&&s| s == 200).count(),
        1,
        "exactly one claim must win: {statuses:?}"
    );
    assert_eq!(statuses.iter().filter(|&&s| s == 409).count(), 1);
}

#[tokio::test]
async fn invalid_requirement_index_is_bad_request() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("oob").await;

    let resp = app
        .auth_post(
            "/api/gamification/missions/weekly_explorer/progress",
            &user.access_token,
        )
        .json(&serde_json::json!({ "requirement_index": 5, "increment_by": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

/// A stored row can lag the catalog: updating a requirement slot the row
/// does not have is rejected, not a panic.
#[tokio::test]
async fn stale_row_with_fewer_requirements_is_rejected() {
    use barkpark_services::dao::mission::MissionDao;

    let app = TestApp::spawn().await;
    let user = app.seed_user("stale").await;

    // Row created under a one-requirement version of weekly_socializer
    MissionDao::new(&app.db)
        .create(user.id, "weekly_socializer", &[2])
        .await
        .unwrap();

    // The current catalog has two requirements; index 1 is valid against
    // the definition but out of range for the stored row
    let resp = app
        .auth_post(
            "/api/gamification/missions/weekly_socializer/progress",
            &user.access_token,
        )
        .json(&serde_json::json!({ "requirement_index": 1, "increment_by": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    // The slot the row does have still works
    let json: Value = progress(&app, &user, "weekly_socializer", 1)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(json["progress"][0]["current"], 1);
}

#[tokio::test]
async fn unknown_mission_is_not_found() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("lost").await;

    let resp = progress(&app, &user, "no_such_mission", 1).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn multi_requirement_mission_needs_every_requirement() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("social").await;

    // weekly_socializer: 2 friends + 1 rating
    let json: Value = app
        .auth_post(
            "/api/gamification/missions/weekly_socializer/progress",
            &user.access_token,
        )
        .json(&serde_json::json!({ "requirement_index": 0, "increment_by": 2 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["status"], "active");
    assert_eq!(json["newly_completed"], false);

    let json: Value = app
        .auth_post(
            "/api/gamification/missions/weekly_socializer/progress",
            &user.access_token,
        )
        .json(&serde_json::json!({ "requirement_index": 1, "increment_by": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["newly_completed"], true);
}

#[tokio::test]
async fn available_missions_show_progress_and_hide_claimed_one_shots() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("browser").await;

    let json: Value = app
        .auth_get("/api/gamification/missions", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missions = json["missions"].as_array().unwrap();
    assert!(missions.iter().any(|m| m["mission_id"] == "daily_visit"));
    assert!(missions.iter().any(|m| m["mission_id"] == "launch_special"));
    assert!(missions.iter().all(|m| m["user_progress"].is_null()));

    // Complete and claim the one-shot launch mission
    progress(&app, &user, "launch_special", 5).await;
    app.auth_post(
        "/api/gamification/missions/launch_special/complete",
        &user.access_token,
    )
    .send()
    .await
    .unwrap();

    let json: Value = app
        .auth_get("/api/gamification/missions", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missions = json["missions"].as_array().unwrap();
    assert!(
        !missions.iter().any(|m| m["mission_id"] == "launch_special"),
        "claimed one-shot missions disappear from the list"
    );
}

/// Recurring missions are also exhausted for their window once claimed;
/// they must not linger in the list with every progress call rejected.
#[tokio::test]
async fn claimed_recurring_mission_leaves_the_list() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("weekly").await;

    progress(&app, &user, "weekly_explorer", 3).await;
    let resp = app
        .auth_post(
            "/api/gamification/missions/weekly_explorer/complete",
            &user.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = app
        .auth_get("/api/gamification/missions", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missions = json["missions"].as_array().unwrap();
    assert!(!missions.iter().any(|m| m["mission_id"] == "weekly_explorer"));

    // Other missions are untouched
    assert!(missions.iter().any(|m| m["mission_id"] == "daily_visit"));
}
