use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, Weak},
};

use log::trace;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::db_types::{GroupId, PairKey};

type LockKey = (PairKey, GroupId);

/// A registry of per-pair locks. Holding the [`PairGuard`] for an unordered pair in a group serialises every
/// decision about that pair, regardless of which direction the request came from.
///
/// Locks are created on demand and released once nobody holds or waits on them.
#[derive(Debug, Clone, Default)]
pub struct PairLocks {
    locks: Arc<Mutex<HashMap<LockKey, Weak<AsyncMutex<()>>>>>,
}

/// Keeps the pair locked until dropped.
#[derive(Debug)]
pub struct PairGuard {
    _guard: OwnedMutexGuard<()>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, pair: &PairKey, group: &GroupId) -> PairGuard {
        let lock = self.lock_for((pair.clone(), group.clone()));
        trace!("🔒️ Waiting for lock on {pair} in {group}");
        let guard = lock.lock_owned().await;
        PairGuard { _guard: guard }
    }

    /// The number of pairs that currently have a live lock.
    pub fn len(&self) -> usize {
        let map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        map.values().filter(|w| w.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_for(&self, key: LockKey) -> Arc<AsyncMutex<()>> {
        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        map.retain(|_, w| w.strong_count() > 0);
        if let Some(lock) = map.get(&key).and_then(Weak::upgrade) {
            return lock;
        }
        let lock = Arc::new(AsyncMutex::new(()));
        map.insert(key, Arc::downgrade(&lock));
        lock
    }
}
