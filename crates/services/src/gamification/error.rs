use thiserror::Error;

use crate::dao::base::DaoError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),
    #[error("Mission not found: {0}")]
    MissionNotFound(String),
    #[error("Invalid requirement index {index} for mission {mission}")]
    InvalidRequirementIndex { mission: String, index: usize },
    #[error("Mission already completed")]
    MissionAlreadyCompleted,
    #[error("Mission window has closed")]
    MissionExpired,
    #[error("Mission not ready to claim")]
    MissionNotReady,
    #[error("Rewards already claimed")]
    RewardsAlreadyClaimed,
    #[error("Mission is full")]
    MissionFull,
    #[error(transparent)]
    Dao(#[from] DaoError),
}

pub type EngineResult<T> = Result<T, EngineError>;
