use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pod_types::ResourceIdentifier;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Exclusive per-identifier locks.
#[async_trait]
pub trait ResourceLocker: Send + Sync {
    /// Wait until no other holder has the lock for `id`, then take it.
    ///
    /// The lock is released when the returned guard is dropped.
    async fn acquire(&self, id: &ResourceIdentifier) -> StoreResult<LockGuard>;
}

type LockTable = Arc<Mutex<HashMap<ResourceIdentifier, Arc<AsyncMutex<()>>>>>;

/// Proof of holding the lock for one identifier.
///
/// Dropping the guard releases the lock exactly once, on every exit path.
pub struct LockGuard {
    id: ResourceIdentifier,
    guard: Option<OwnedMutexGuard<()>>,
    table: LockTable,
}

impl LockGuard {
    /// The locked identifier.
    pub fn identifier(&self) -> &ResourceIdentifier {
        &self.id
    }

    /// Release the lock now instead of at end of scope.
    pub fn release(self) {}
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        prune(&self.table, &self.id);
        debug!(resource = %self.id, "released lock");
    }
}

/// A waiter's claim on a table entry. Dropping it without taking the lock
/// (timeout or cancellation) still prunes the entry.
struct PendingLock {
    id: ResourceIdentifier,
    entry: Option<Arc<AsyncMutex<()>>>,
    table: LockTable,
}

impl Drop for PendingLock {
    fn drop(&mut self) {
        drop(self.entry.take());
        prune(&self.table, &self.id);
    }
}

/// Remove the entry for `id` once nobody holds or awaits it.
fn prune(table: &LockTable, id: &ResourceIdentifier) {
    let mut table = table.lock().expect("lock poisoned");
    // Only the table's own handle left.
    if table
        .get(id)
        .is_some_and(|entry| Arc::strong_count(entry) == 1)
    {
        table.remove(id);
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").field("id", &self.id).finish()
    }
}

/// Locker keeping one fair async mutex per identifier.
///
/// The table itself is only locked for bookkeeping, never while waiting, so
/// unrelated identifiers never block each other. Waiters on the same
/// identifier are served in FIFO order.
#[derive(Clone, Default)]
pub struct KeyedResourceLocker {
    table: LockTable,
    timeout: Option<Duration>,
}

impl KeyedResourceLocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up waiting after `timeout` with an `Internal` error.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            table: LockTable::default(),
            timeout: Some(timeout),
        }
    }

    /// Number of identifiers currently held or awaited.
    pub fn active(&self) -> usize {
        self.table.lock().expect("lock poisoned").len()
    }
}

#[async_trait]
impl ResourceLocker for KeyedResourceLocker {
    async fn acquire(&self, id: &ResourceIdentifier) -> StoreResult<LockGuard> {
        let mut pending = PendingLock {
            id: id.clone(),
            entry: None,
            table: Arc::clone(&self.table),
        };
        let entry = {
            let mut table = self.table.lock().expect("lock poisoned");
            Arc::clone(table.entry(id.clone()).or_default())
        };
        // Declared after `pending`, so a cancelled wait is dropped first.
        let wait = Arc::clone(&entry).lock_owned();
        pending.entry = Some(entry);
        debug!(resource = %id, "waiting for lock");

        let guard = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| StoreError::Internal(format!("lock wait timed out for {id}")))?,
            None => wait.await,
        };
        drop(pending);
        debug!(resource = %id, "acquired lock");

        Ok(LockGuard {
            id: id.clone(),
            guard: Some(guard),
            table: Arc::clone(&self.table),
        })
    }
}

impl std::fmt::Debug for KeyedResourceLocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedResourceLocker")
            .field("active", &self.active())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(path: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(format!("http://test.com/{path}"))
    }

    #[tokio::test]
    async fn acquire_and_release() {
        let locker = KeyedResourceLocker::new();
        let guard = locker.acquire(&id("a")).await.unwrap();
        assert_eq!(guard.identifier(), &id("a"));
        assert_eq!(locker.active(), 1);
        guard.release();
        assert_eq!(locker.active(), 0);
    }

    #[tokio::test]
    async fn different_identifiers_do_not_block() {
        let locker = KeyedResourceLocker::with_timeout(Duration::from_millis(100));
        let _a = locker.acquire(&id("a")).await.unwrap();
        let _b = locker.acquire(&id("b")).await.unwrap();
        assert_eq!(locker.active(), 2);
    }

    #[tokio::test]
    async fn same_identifier_times_out_while_held() {
        let locker = KeyedResourceLocker::with_timeout(Duration::from_millis(20));
        let held = locker.acquire(&id("a")).await.unwrap();
        let err = locker.acquire(&id("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)));
        drop(held);
        locker.acquire(&id("a")).await.unwrap();
    }

    #[tokio::test]
    async fn waiter_proceeds_after_release() {
        let locker = KeyedResourceLocker::new();
        let held = locker.acquire(&id("a")).await.unwrap();

        let waiter = {
            let locker = locker.clone();
            tokio::spawn(async move {
                let _guard = locker.acquire(&id("a")).await.unwrap();
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter.await.unwrap();
        assert_eq!(locker.active(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_leaves_no_entry() {
        let locker = KeyedResourceLocker::new();
        let held = locker.acquire(&id("a")).await.unwrap();

        let waiter = {
            let locker = locker.clone();
            tokio::spawn(async move {
                let _guard = locker.acquire(&id("a")).await.unwrap();
                std::future::pending::<()>().await;
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(locker.active(), 1);

        // The waiter is handed the lock but cancelled before it runs again.
        drop(held);
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());
        assert_eq!(locker.active(), 0);
    }

    #[tokio::test]
    async fn timed_out_waiter_leaves_no_entry() {
        let locker = KeyedResourceLocker::with_timeout(Duration::from_millis(20));
        let held = locker.acquire(&id("a")).await.unwrap();
        locker.acquire(&id("a")).await.unwrap_err();
        assert_eq!(locker.active(), 1);
        drop(held);
        assert_eq!(locker.active(), 0);
    }

    #[tokio::test]
    async fn holders_never_overlap() {
        let locker = KeyedResourceLocker::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let locker = locker.clone();
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                tokio::spawn(async move {
                    let _guard = locker.acquire(&id("shared")).await.unwrap();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locker.active(), 0);
    }
}
