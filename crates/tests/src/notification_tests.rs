use bson::doc;
use serde_json::Value;

use barkpark_db::models::NotificationType;
use barkpark_services::dao::notification::NotificationDao;

use crate::fixtures::seed::SeededUser;
use crate::fixtures::test_app::TestApp;

/// Insert feed rows directly through the DAO so the tests control exactly
/// what is in the feed.
async fn seed_notifications(app: &TestApp, user: &SeededUser, count: usize) -> Vec<String> {
    let dao = NotificationDao::new(&app.db);
    let mut ids = Vec::new();
    for i in 0..count {
        let n = dao
            .create(
                user.id,
                NotificationType::System,
                format!("Title {i}"),
                format!("Body {i}"),
                doc! { "i": i as i64 },
            )
            .await
            .unwrap();
        ids.push(n.id.unwrap().to_hex());
    }
    ids
}

#[tokio::test]
async fn feed_is_paginated_newest_first() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("reader").await;
    seed_notifications(&app, &user, 25).await;

    let json: Value = app
        .auth_get("/api/notification?page=1&per_page=10", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["total"], 25);
    assert_eq!(json["total_pages"], 3);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["title"], "Title 24");
    // System notifications navigate to the landing route
    assert_eq!(items[0]["navigation"]["route"], "/home");

    let json: Value = app
        .auth_get("/api/notification?page=3&per_page=10", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn unread_count_and_read_transitions() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("marker").await;
    let ids = seed_notifications(&app, &user, 4).await;

    let count: Value = app
        .auth_get("/api/notification/unread-count", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["unread"], 4);

    // Single
    let resp: Value = app
        .auth_put(
            &format!("/api/notification/{}/read", ids[0]),
            &user.access_token,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["updated"], true);

    // Bulk
    let resp: Value = app
        .auth_put("/api/notification/read", &user.access_token)
        .json(&serde_json::json!({ "ids": [ids[1], ids[2]] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["updated"], 2);

    let count: Value = app
        .auth_get("/api/notification/unread-count", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["unread"], 1);

    // All
    app.auth_put("/api/notification/read-all", &user.access_token)
        .send()
        .await
        .unwrap();
    let count: Value = app
        .auth_get("/api/notification/unread-count", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["unread"], 0);
}

#[tokio::test]
async fn unread_filter_excludes_read_entries() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("filter").await;
    let ids = seed_notifications(&app, &user, 3).await;

    app.auth_put(
        &format!("/api/notification/{}/read", ids[2]),
        &user.access_token,
    )
    .send()
    .await
    .unwrap();

    let json: Value = app
        .auth_get("/api/notification?unread_only=true", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn delete_one_and_clear_all() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("cleaner").await;
    let ids = seed_notifications(&app, &user, 3).await;

    let resp: Value = app
        .auth_delete(&format!("/api/notification/{}", ids[0]), &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["deleted"], true);

    let resp: Value = app
        .auth_delete("/api/notification", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["deleted"], 2);

    let json: Value = app
        .auth_get("/api/notification", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["total"], 0);
}

/// Read/delete are scoped to the recipient.
#[tokio::test]
async fn users_cannot_touch_each_others_feed() {
    let app = TestApp::spawn().await;
    let owner = app.seed_user("owner").await;
    let intruder = app.seed_user("intruder").await;
    let ids = seed_notifications(&app, &owner, 1).await;

    let resp: Value = app
        .auth_put(
            &format!("/api/notification/{}/read", ids[0]),
            &intruder.access_token,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["updated"], false);

    let resp: Value = app
        .auth_delete(
            &format!("/api/notification/{}", ids[0]),
            &intruder.access_token,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["deleted"], false);

    let count: Value = app
        .auth_get("/api/notification/unread-count", &owner.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["unread"], 1);
}
