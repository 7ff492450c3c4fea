pub mod base;
pub mod event_key;
pub mod mission;
pub mod notification;
pub mod points;
pub mod profile;
pub mod push_registration;
pub mod user;

pub use base::BaseDao;
