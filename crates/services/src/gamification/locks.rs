use std::sync::Arc;

use bson::oid::ObjectId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-user mutual exclusion for the engine's read-modify-write sequences.
///
/// Two simultaneous check-ins for the same user must not both read
/// streak=N and both write N+1, so every per-user mutation acquires that
/// user's lock first. Locks for different users are independent; catalog
/// scans take no lock at all.
#[derive(Default)]
pub struct UserLockRegistry {
    locks: DashMap<ObjectId, Arc<Mutex<()>>>,
}

impl UserLockRegistry {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    pub async fn acquire(&self, user_id: ObjectId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
