//! Session Storage
//!
//! Narrow persistence seams: a JSON blob store with per-entry TTL and a
//! per-player lock service with lease expiry. The in-memory versions
//! back tests and the demo binary; production deployments wire these
//! traits to a shared cache.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::game::session::PlayerId;

/// Failure from a storage or collaborator backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Backend failure: {0}")]
pub struct BackendError(pub String);

impl BackendError {
    /// Wraps a message as a backend failure.
    pub fn new(message: impl Into<String>) -> Self {
        BackendError(message.into())
    }
}

/// Opaque proof of lock ownership.
///
/// Release requires the token handed out by acquire, so a slow request
/// cannot free a lease that has already expired and moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(Uuid);

/// Keyed session blobs with per-entry TTL.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetches the stored session blob, if present and unexpired.
    async fn get(&self, player: PlayerId) -> Result<Option<String>, BackendError>;

    /// Stores a session blob, resetting its TTL.
    async fn put(
        &self,
        player: PlayerId,
        value: String,
        ttl: Duration,
    ) -> Result<(), BackendError>;

    /// Removes the stored blob, if any.
    async fn delete(&self, player: PlayerId) -> Result<(), BackendError>;
}

/// Per-player mutual exclusion with lease expiry.
///
/// A crashed holder leaks nothing: its lease runs out and the next
/// acquire succeeds.
#[async_trait]
pub trait SessionLocks: Send + Sync {
    /// Tries to take the player's lock for `lease`. `None` means another
    /// request holds an unexpired lease.
    async fn acquire(
        &self,
        player: PlayerId,
        lease: Duration,
    ) -> Result<Option<LockToken>, BackendError>;

    /// Releases the lock if `token` still owns it. A stale token is a
    /// no-op, never an error.
    async fn release(&self, player: PlayerId, token: &LockToken) -> Result<(), BackendError>;
}

struct StoredEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory session store for tests and the demo binary.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<PlayerId, StoredEntry>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, player: PlayerId) -> Result<Option<String>, BackendError> {
        let mut entries = self.entries.write().await;
        match entries.get(&player) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(&player);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        player: PlayerId,
        value: String,
        ttl: Duration,
    ) -> Result<(), BackendError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            player,
            StoredEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, player: PlayerId) -> Result<(), BackendError> {
        let mut entries = self.entries.write().await;
        entries.remove(&player);
        Ok(())
    }
}

struct LeaseEntry {
    token: Uuid,
    expires_at: Instant,
}

/// In-memory lock service for tests and the demo binary.
#[derive(Default)]
pub struct MemorySessionLocks {
    leases: RwLock<BTreeMap<PlayerId, LeaseEntry>>,
}

impl MemorySessionLocks {
    /// Creates an empty lock service.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionLocks for MemorySessionLocks {
    async fn acquire(
        &self,
        player: PlayerId,
        lease: Duration,
    ) -> Result<Option<LockToken>, BackendError> {
        let mut leases = self.leases.write().await;
        let now = Instant::now();

        if let Some(entry) = leases.get(&player) {
            if entry.expires_at > now {
                return Ok(None);
            }
        }

        let token = Uuid::new_v4();
        leases.insert(
            player,
            LeaseEntry {
                token,
                expires_at: now + lease,
            },
        );
        Ok(Some(LockToken(token)))
    }

    async fn release(&self, player: PlayerId, token: &LockToken) -> Result<(), BackendError> {
        let mut leases = self.leases.write().await;
        if let Some(entry) = leases.get(&player) {
            if entry.token == token.0 {
                leases.remove(&player);
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_roundtrip() {
        let store = MemorySessionStore::new();
        let player = PlayerId::new();

        assert_eq!(store.get(player).await.unwrap(), None);

        store
            .put(player, "{\"ok\":true}".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.get(player).await.unwrap(),
            Some("{\"ok\":true}".to_string())
        );

        store.delete(player).await.unwrap();
        assert_eq!(store.get(player).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_ttl_expires() {
        let store = MemorySessionStore::new();
        let player = PlayerId::new();

        store
            .put(player, "gone soon".into(), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get(player).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_keys_are_per_player() {
        let store = MemorySessionStore::new();
        let a = PlayerId::new();
        let b = PlayerId::new();

        store
            .put(a, "a".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get(b).await.unwrap(), None);
        assert_eq!(store.get(a).await.unwrap(), Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_lock_excludes_second_acquire() {
        let locks = MemorySessionLocks::new();
        let player = PlayerId::new();

        let token = locks
            .acquire(player, Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();
        assert!(locks
            .acquire(player, Duration::from_secs(30))
            .await
            .unwrap()
            .is_none());

        locks.release(player, &token).await.unwrap();
        assert!(locks
            .acquire(player, Duration::from_secs(30))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_lock_lease_expires() {
        let locks = MemorySessionLocks::new();
        let player = PlayerId::new();

        locks
            .acquire(player, Duration::from_millis(10))
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // The stale lease no longer blocks anyone.
        assert!(locks
            .acquire(player, Duration::from_secs(30))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_stale_token_cannot_release() {
        let locks = MemorySessionLocks::new();
        let player = PlayerId::new();

        let stale = locks
            .acquire(player, Duration::from_millis(10))
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let fresh = locks
            .acquire(player, Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();

        // Releasing with the expired token must not free the new lease.
        locks.release(player, &stale).await.unwrap();
        assert!(locks
            .acquire(player, Duration::from_secs(30))
            .await
            .unwrap()
            .is_none());

        locks.release(player, &fresh).await.unwrap();
        assert!(locks
            .acquire(player, Duration::from_secs(30))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_locks_are_per_player() {
        let locks = MemorySessionLocks::new();
        let a = PlayerId::new();
        let b = PlayerId::new();

        locks
            .acquire(a, Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();
        assert!(locks
            .acquire(b, Duration::from_secs(30))
            .await
            .unwrap()
            .is_some());
    }
}
