pub mod channel;
pub mod composer;
pub mod events;
pub mod push;
pub mod router;

pub use channel::{PushChannel, PushSendError, RealtimeChannel};
pub use composer::{NotificationWire, Notifier};
pub use events::GamificationEvent;
pub use push::{DisabledPushChannel, WebPushChannel};
pub use router::{DeliveryReport, DeliveryRouter};
