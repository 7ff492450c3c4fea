pub mod auth;
pub mod catalog;
pub mod dao;
pub mod gamification;
pub mod navigation;
pub mod notify;

pub use auth::AuthService;
pub use catalog::Catalog;
pub use dao::*;
pub use gamification::GamificationEngine;
pub use notify::Notifier;
