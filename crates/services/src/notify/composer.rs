use std::sync::Arc;

use bson::oid::ObjectId;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use barkpark_db::models::{Notification, NotificationType};

use crate::dao::base::DaoResult;
use crate::dao::notification::NotificationDao;
use crate::navigation::{self, Destination};

use super::events::GamificationEvent;
use super::router::DeliveryRouter;

/// Wire shape of a notification as clients see it over the realtime
/// channel, in push payloads and in feed responses.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationWire {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: &'static str,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
    pub navigation: Destination,
    pub is_read: bool,
    pub created_at: String,
}

impl NotificationWire {
    pub fn from_model(n: &Notification) -> Self {
        let notification_type = n.notification_type.as_str();
        let data = bson::Bson::Document(n.data.clone()).into_relaxed_extjson();
        Self {
            id: n.id.map(|id| id.to_hex()).unwrap_or_default(),
            notification_type,
            title: n.title.clone(),
            body: n.body.clone(),
            navigation: navigation::destination_for(notification_type, &data),
            data,
            is_read: n.is_read,
            created_at: n
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
        }
    }
}

/// The single chokepoint every notification funnels through: persist the
/// feed entry (authoritative, synchronous), then hand it to the delivery
/// router. Gamification outcomes and external domain events alike.
pub struct Notifier {
    notifications: Arc<NotificationDao>,
    router: Arc<DeliveryRouter>,
}

impl Notifier {
    pub fn new(notifications: Arc<NotificationDao>, router: Arc<DeliveryRouter>) -> Self {
        Self {
            notifications,
            router,
        }
    }

    /// Persist and route. Only the feed write can fail; once it succeeds
    /// no delivery-channel outcome is allowed to surface.
    pub async fn create(
        &self,
        user_id: ObjectId,
        notification_type: NotificationType,
        title: impl Into<String>,
        body: impl Into<String>,
        data: bson::Document,
    ) -> DaoResult<Notification> {
        let notification = self
            .notifications
            .create(user_id, notification_type, title.into(), body.into(), data)
            .await?;

        let frame = json!({
            "type": "notification",
            "notification": NotificationWire::from_model(&notification),
        });
        self.router.deliver(user_id, &frame).await;

        Ok(notification)
    }

    /// Realtime-only gamification event; nothing is persisted and nothing
    /// can fail from the caller's perspective.
    pub async fn send_event(&self, user_id: ObjectId, event: GamificationEvent) {
        let frame = event.to_frame();
        if !self.router.send_event(user_id, &frame).await {
            debug!(%user_id, event = event.event_type(), "No live session for event");
        }
    }
}
