//! Keyed async locks.
//!
//! Gives each key (an order id, a user/symbol pair) its own
//! `tokio::sync::Mutex` so work on one key is serialized while different
//! keys proceed in parallel.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created per-key mutexes.
#[derive(Debug)]
pub struct LockRegistry<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for LockRegistry<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> LockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    ///
    /// The registry map is only held while the key's mutex is looked up, so
    /// waiting on one key never blocks another.
    pub async fn acquire(&self, key: &K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop mutexes nobody holds or waits on.
    pub async fn prune(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of keys with a live mutex.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// True if no key has a live mutex.
    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_serialized() {
        let registry = Arc::new(LockRegistry::<String>::new());
        let counter = Arc::new(Mutex::new(Vec::new()));

        let guard = registry.acquire(&"a".to_string()).await;

        let task = {
            let registry = Arc::clone(&registry);
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let _guard = registry.acquire(&"a".to_string()).await;
                counter.lock().await.push("second");
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        counter.lock().await.push("first");
        drop(guard);
        task.await.unwrap();

        assert_eq!(*counter.lock().await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let registry = LockRegistry::<u32>::new();
        let _a = registry.acquire(&1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), registry.acquire(&2)).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let registry = LockRegistry::<u32>::new();
        let held = registry.acquire(&1).await;
        drop(registry.acquire(&2).await);
        assert_eq!(registry.len().await, 2);

        registry.prune().await;
        assert_eq!(registry.len().await, 1);

        drop(held);
        registry.prune().await;
        assert!(registry.is_empty().await);
    }
}
