pub mod gamification;
pub mod mission;
pub mod notification;
pub mod processed_event;
pub mod push_registration;
pub mod user;

pub use gamification::*;
pub use mission::*;
pub use notification::*;
pub use processed_event::*;
pub use push_registration::*;
pub use user::*;
