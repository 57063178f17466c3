use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use super::{KeyValueStore, StorageError};

/// In-process store.
///
/// Doubles as a fault-injecting test double: the next N operations of a kind
/// can be made to fail, and writes can be made to hang forever to simulate a
/// process dying mid-write.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    stalled: Notify,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, String>,
    fail_gets: usize,
    fail_sets: usize,
    fail_deletes: usize,
    stall_sets: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.entries.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Make the next `n` `get` calls fail.
    pub async fn fail_next_gets(&self, n: usize) {
        self.inner.lock().await.fail_gets = n;
    }

    /// Make the next `n` `set` calls fail.
    pub async fn fail_next_sets(&self, n: usize) {
        self.inner.lock().await.fail_sets = n;
    }

    /// Make the next `n` `delete` calls fail.
    pub async fn fail_next_deletes(&self, n: usize) {
        self.inner.lock().await.fail_deletes = n;
    }

    /// Make every following `set` hang without writing.
    pub async fn stall_sets(&self) {
        self.inner.lock().await.stall_sets = true;
    }

    /// Resolves once a `set` has hung because of [`stall_sets`](Self::stall_sets).
    pub async fn wait_until_stalled(&self) {
        self.stalled.notified().await;
    }

    /// Let writes through again after [`stall_sets`](Self::stall_sets).
    pub async fn resume_sets(&self) {
        self.inner.lock().await.stall_sets = false;
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_gets > 0 {
            inner.fail_gets -= 1;
            return Err(StorageError::Backend(format!("injected get failure for {key}")));
        }
        Ok(inner.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.stall_sets {
            drop(inner);
            self.stalled.notify_one();
            return std::future::pending().await;
        }
        if inner.fail_sets > 0 {
            inner.fail_sets -= 1;
            return Err(StorageError::Backend(format!("injected set failure for {key}")));
        }
        inner.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_deletes > 0 {
            inner.fail_deletes -= 1;
            return Err(StorageError::Backend(format!(
                "injected delete failure for {key}"
            )));
        }
        inner.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(store.contains("k").await);

        store.delete("k").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete("nothing").await.is_ok());
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let store = MemoryStore::new();
        store.fail_next_sets(1).await;
        assert!(store.set("k", "v").await.is_err());
        assert!(store.set("k", "v").await.is_ok());

        store.fail_next_gets(2).await;
        assert!(store.get("k").await.is_err());
        assert!(store.get("k").await.is_err());
        assert!(store.get("k").await.is_ok());

        store.fail_next_deletes(1).await;
        assert!(store.delete("k").await.is_err());
        assert!(store.contains("k").await);
    }

    #[tokio::test]
    async fn stalled_set_never_writes() {
        let store = MemoryStore::new();
        store.stall_sets().await;

        tokio::select! {
            _ = store.set("k", "v") => panic!("stalled set completed"),
            _ = store.wait_until_stalled() => {}
        }

        assert!(!store.contains("k").await);
        store.resume_sets().await;
        store.set("k", "v").await.unwrap();
        assert!(store.contains("k").await);
    }

    #[test]
    fn debug_hides_entries() {
        let store = MemoryStore::new();
        assert_eq!(format!("{store:?}"), "MemoryStore { .. }");
    }
}
