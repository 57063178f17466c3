use async_trait::async_trait;
use keyring::Entry;

use super::{KeyValueStore, StorageError};

/// Secure store on the platform credential manager.
///
/// Each storage key becomes one credential under `service`. The `keyring`
/// API is blocking, so every call runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    async fn run<T, F>(&self, key: &str, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T, keyring::Error> + Send + 'static,
    {
        let entry = Entry::new(&self.service, key).map_err(backend)?;
        tokio::task::spawn_blocking(move || op(entry))
            .await
            .map_err(|e| StorageError::Backend(format!("keyring task failed: {e}")))?
            .map_err(backend)
    }
}

fn backend(e: keyring::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.run(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let value = zeroize::Zeroizing::new(value.to_owned());
        self.run(key, move |entry| entry.set_password(&value)).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.run(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }
}
