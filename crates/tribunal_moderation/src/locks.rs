//! Per-(guild, receiver) serialization.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;
use tribunal_core::{GuildId, UserId};

/// Key every mutating lifecycle operation is serialized under.
pub type MemberKey = (GuildId, UserId);

/// Registry of async mutexes, one per member key.
///
/// Holding the guard for a key makes a check-then-act sequence on that
/// member's infractions atomic with respect to other lifecycle calls.
/// Clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<MemberKey, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a member's infractions.
    pub async fn lock(&self, guild_id: GuildId, receiver_id: UserId) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(
            self.locks
                .entry((guild_id, receiver_id))
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        trace!(%guild_id, %receiver_id, "Acquiring member lock");
        mutex.lock_owned().await
    }

    /// Drop mutexes nobody is holding or waiting on.
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        before.saturating_sub(self.locks.len())
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
