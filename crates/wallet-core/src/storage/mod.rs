//! Key-value persistence capability and its implementations.
//!
//! The wallet needs two stores of identical shape: a *standard* store for the
//! wallet blob and a *secure* store for the recovery phrase. Which concrete
//! backend plays each role is chosen by whoever builds the
//! [`WalletService`](crate::service::WalletService), typically per platform:
//!
//! | Backend            | Typical role                              |
//! |--------------------|-------------------------------------------|
//! | [`MemoryStore`]    | tests, ephemeral/web sessions             |
//! | [`FileStore`]      | standard store on desktop/host embeddings |
//! | [`EncryptedStore`] | secure store where no keychain exists     |
//! | `KeyringStore`     | secure store on the OS keychain (`os-keyring`) |

mod encrypted;
mod file;
#[cfg(feature = "os-keyring")]
mod keyring;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use encrypted::EncryptedStore;
pub use file::FileStore;
#[cfg(feature = "os-keyring")]
pub use keyring::KeyringStore;
pub use memory::MemoryStore;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] crypto_utils::CryptoError),

    #[error("wrong password for encrypted store")]
    WrongPassword,

    #[error("key is reserved by the store: {0}")]
    ReservedKey(String),
}

/// String-keyed, string-valued persistent map.
///
/// Deleting a key that does not exist succeeds.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key).await
    }
}
