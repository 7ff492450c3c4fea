use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Durable feed entry. Created once by the composer; afterwards only the
/// read flag changes, until the recipient deletes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    /// Type-specific payload: target/chat/garden/event/requester ids and
    /// free-form params, consumed by the client navigation resolver.
    #[serde(default)]
    pub data: bson::Document,
    #[serde(default)]
    pub is_read: bool,
    pub read_at: Option<DateTime>,
    pub created_at: DateTime,
}

impl Notification {
    pub const COLLECTION: &'static str = "notifications";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    DogCheckin,
    DogCheckout,
    FriendRequest,
    FriendAccepted,
    NewMessage,
    EventReminder,
    EventRegistration,
    EventStatusUpdate,
    EventCancelled,
    GardenUpdate,
    PermissionRequest,
    NewsletterSubscription,
    NewsletterContent,
    AchievementEarned,
    LevelUp,
    System,
    VisitReminder,
}

impl NotificationType {
    pub const ALL: [NotificationType; 17] = [
        NotificationType::DogCheckin,
        NotificationType::DogCheckout,
        NotificationType::FriendRequest,
        NotificationType::FriendAccepted,
        NotificationType::NewMessage,
        NotificationType::EventReminder,
        NotificationType::EventRegistration,
        NotificationType::EventStatusUpdate,
        NotificationType::EventCancelled,
        NotificationType::GardenUpdate,
        NotificationType::PermissionRequest,
        NotificationType::NewsletterSubscription,
        NotificationType::NewsletterContent,
        NotificationType::AchievementEarned,
        NotificationType::LevelUp,
        NotificationType::System,
        NotificationType::VisitReminder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::DogCheckin => "dog_checkin",
            NotificationType::DogCheckout => "dog_checkout",
            NotificationType::FriendRequest => "friend_request",
            NotificationType::FriendAccepted => "friend_accepted",
            NotificationType::NewMessage => "new_message",
            NotificationType::EventReminder => "event_reminder",
            NotificationType::EventRegistration => "event_registration",
            NotificationType::EventStatusUpdate => "event_status_update",
            NotificationType::EventCancelled => "event_cancelled",
            NotificationType::GardenUpdate => "garden_update",
            NotificationType::PermissionRequest => "permission_request",
            NotificationType::NewsletterSubscription => "newsletter_subscription",
            NotificationType::NewsletterContent => "newsletter_content",
            NotificationType::AchievementEarned => "achievement_earned",
            NotificationType::LevelUp => "level_up",
            NotificationType::System => "system",
            NotificationType::VisitReminder => "visit_reminder",
        }
    }
}
