use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use serde_json::Value;

use barkpark_db::models::NotificationType;

/// A concrete in-app destination resolved from a notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Destination {
    pub route: &'static str,
    pub params: HashMap<&'static str, String>,
}

/// Which payload field feeds the route parameter for a notification type.
#[derive(Debug, Clone, Copy)]
enum ParamRule {
    None,
    /// Copy `payload[field]` into `params[param]`; missing field falls back
    /// to the bare route.
    Field {
        field: &'static str,
        param: &'static str,
    },
}

struct RouteEntry {
    route: &'static str,
    rule: ParamRule,
}

/// Maps a delivered notification to the screen the client should open.
///
/// The table is total over `NotificationType` (the exhaustive match below
/// is checked at compile time), so every type the server can emit has a
/// destination; payloads missing their id field and unknown future types
/// both land on the default route.
pub struct NavigationResolver {
    routes: HashMap<NotificationType, RouteEntry>,
}

pub const DEFAULT_ROUTE: &str = "/home";

impl NavigationResolver {
    pub fn new() -> Self {
        let mut routes = HashMap::new();
        for notification_type in NotificationType::ALL {
            routes.insert(notification_type, entry_for(notification_type));
        }
        Self { routes }
    }

    pub fn resolve(&self, notification_type: &str, payload: &Value) -> Destination {
        let Some((_, entry)) = self
            .routes
            .iter()
            .find(|(t, _)| t.as_str() == notification_type)
        else {
            return Destination {
                route: DEFAULT_ROUTE,
                params: HashMap::new(),
            };
        };

        let mut params = HashMap::new();
        if let ParamRule::Field { field, param } = entry.rule {
            match payload.get(field).and_then(|v| v.as_str()) {
                Some(value) => {
                    params.insert(param, value.to_string());
                }
                None => {
                    return Destination {
                        route: DEFAULT_ROUTE,
                        params,
                    };
                }
            }
        }

        Destination {
            route: entry.route,
            params,
        }
    }
}

impl Default for NavigationResolver {
    fn default() -> Self {
        Self::new()
    }
}

static RESOLVER: LazyLock<NavigationResolver> = LazyLock::new(NavigationResolver::new);

/// Resolve against the process-wide registry.
pub fn destination_for(notification_type: &str, payload: &Value) -> Destination {
    RESOLVER.resolve(notification_type, payload)
}

fn entry_for(notification_type: NotificationType) -> RouteEntry {
    use NotificationType::*;
    match notification_type {
        DogCheckin | DogCheckout | GardenUpdate => RouteEntry {
            route: "/garden",
            rule: ParamRule::Field {
                field: "gardenId",
                param: "garden_id",
            },
        },
        FriendRequest | PermissionRequest => RouteEntry {
            route: "/requests",
            rule: ParamRule::Field {
                field: "requesterId",
                param: "requester_id",
            },
        },
        FriendAccepted => RouteEntry {
            route: "/profile",
            rule: ParamRule::Field {
                field: "targetId",
                param: "user_id",
            },
        },
        NewMessage => RouteEntry {
            route: "/chat",
            rule: ParamRule::Field {
                field: "chatId",
                param: "chat_id",
            },
        },
        EventReminder | EventRegistration | EventStatusUpdate | EventCancelled => RouteEntry {
            route: "/event",
            rule: ParamRule::Field {
                field: "eventId",
                param: "event_id",
            },
        },
        NewsletterSubscription | NewsletterContent => RouteEntry {
            route: "/newsletter",
            rule: ParamRule::None,
        },
        AchievementEarned | LevelUp => RouteEntry {
            route: "/achievements",
            rule: ParamRule::None,
        },
        VisitReminder => RouteEntry {
            route: "/gardens",
            rule: ParamRule::None,
        },
        System => RouteEntry {
            route: DEFAULT_ROUTE,
            rule: ParamRule::None,
        },
    }
}
