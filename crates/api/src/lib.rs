pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // External triggering events
    let event_routes = Router::new()
        .route("/checkin", post(routes::event::checkin))
        .route("/checkout", post(routes::event::checkout))
        .route("/rating", post(routes::event::rating))
        .route("/friend-accepted", post(routes::event::friend_accepted));

    // Gamification state reads and mission operations
    let gamification_routes = Router::new()
        .route("/stats", get(routes::gamification::stats))
        .route("/level", get(routes::gamification::level))
        .route("/streak", get(routes::gamification::streak))
        .route("/badges", get(routes::gamification::badges))
        .route("/missions", get(routes::gamification::missions))
        .route(
            "/missions/{mission_id}/progress",
            post(routes::gamification::progress),
        )
        .route(
            "/missions/{mission_id}/complete",
            post(routes::gamification::complete),
        );

    // Notification feed
    let notification_routes = Router::new()
        .route("/", get(routes::notification::feed))
        .route("/", delete(routes::notification::delete_all))
        .route("/unread-count", get(routes::notification::unread_count))
        .route("/read", put(routes::notification::mark_many_read))
        .route("/read-all", put(routes::notification::mark_all_read))
        .route("/{id}/read", put(routes::notification::mark_read))
        .route("/{id}", delete(routes::notification::delete));

    // Push registrations
    let push_routes = Router::new()
        .route("/register", post(routes::push::register))
        .route("/register", delete(routes::push::unregister));

    let api = Router::new()
        .nest("/event", event_routes)
        .nest("/gamification", gamification_routes)
        .nest("/notification", notification_routes)
        .nest("/push", push_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
