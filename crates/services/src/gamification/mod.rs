pub mod badges;
pub mod engine;
pub mod error;
pub mod level;
pub mod locks;
pub mod missions;
pub mod points;
pub mod streak;

pub use engine::GamificationEngine;
pub use error::{EngineError, EngineResult};
pub use level::LevelInfo;
pub use locks::UserLockRegistry;
