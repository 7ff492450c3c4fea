use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index_unique(bson::doc! { "username": 1 }),
        ],
    )
    .await?;

    // Gamification profiles: one per user
    create_indexes(
        db,
        "gamification_profiles",
        vec![index_unique(bson::doc! { "user_id": 1 })],
    )
    .await?;

    // Points transactions (append-only ledger)
    create_indexes(
        db,
        "points_transactions",
        vec![
            index(bson::doc! { "user_id": 1, "created_at": -1 }),
            index(bson::doc! { "user_id": 1, "action": 1 }),
        ],
    )
    .await?;

    // User missions: one row per (user, mission)
    create_indexes(
        db,
        "user_missions",
        vec![
            index_unique(bson::doc! { "user_id": 1, "mission_id": 1 }),
            index(bson::doc! { "user_id": 1, "status": 1 }),
        ],
    )
    .await?;

    // Notifications (feed)
    create_indexes(
        db,
        "notifications",
        vec![
            index(bson::doc! { "user_id": 1, "created_at": -1 }),
            index(bson::doc! { "user_id": 1, "is_read": 1, "created_at": -1 }),
        ],
    )
    .await?;

    // Push registrations: one row per (user, endpoint)
    create_indexes(
        db,
        "push_registrations",
        vec![
            index_unique(bson::doc! { "user_id": 1, "endpoint": 1 }),
            index(bson::doc! { "user_id": 1, "is_active": 1 }),
        ],
    )
    .await?;

    // Processed events: idempotency keys for engine triggers.
    // The unique index is what makes a replayed trigger a no-op.
    create_indexes(
        db,
        "processed_events",
        vec![index_unique(bson::doc! { "user_id": 1, "event_key": 1 })],
    )
    .await?;

    info!("MongoDB indexes ensured");
    Ok(())
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}
