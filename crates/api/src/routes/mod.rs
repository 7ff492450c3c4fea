pub mod event;
pub mod gamification;
pub mod notification;
pub mod push;
