use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use crypto_utils::encryption::{open, seal};
use crypto_utils::kdf::{self, KdfParams, SALT_LEN};
use crypto_utils::{EntropySource, OsEntropy};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::{KeyValueStore, StorageError};

const HEADER_KEY: &str = "@encrypted_store_header";
const CHECK_AAD: &[u8] = b"@encrypted_store_check";
const CHECK_PLAINTEXT: &[u8] = b"wallet-core encrypted store v1";

/// Stored in the inner store; carries everything needed to re-derive the key.
#[derive(Debug, Serialize, Deserialize)]
struct StoreHeader {
    version: u8,
    salt: String,
    kdf: KdfParams,
    /// Known plaintext sealed under the key, for wrong-password detection.
    check: String,
}

/// Encrypts every value of an inner store with AES-256-GCM.
///
/// The key is derived once with Argon2id from a password and a per-store
/// salt. Each value is sealed with its storage key as associated data, so a
/// ciphertext copied to another key fails to open. Values are hex-encoded in
/// the inner store.
pub struct EncryptedStore<S> {
    inner: S,
    key: Zeroizing<[u8; 32]>,
    entropy: Arc<dyn EntropySource>,
}

impl<S: KeyValueStore> EncryptedStore<S> {
    /// Open (or initialize) an encrypted view over `inner`.
    ///
    /// `params` only apply when the store is new; an existing store keeps the
    /// parameters it was created with.
    pub async fn open(inner: S, password: &[u8], params: KdfParams) -> Result<Self, StorageError> {
        Self::open_with_entropy(inner, password, params, Arc::new(OsEntropy)).await
    }

    pub async fn open_with_entropy(
        inner: S,
        password: &[u8],
        params: KdfParams,
        entropy: Arc<dyn EntropySource>,
    ) -> Result<Self, StorageError> {
        let key = match inner.get(HEADER_KEY).await? {
            Some(raw) => {
                let header: StoreHeader = serde_json::from_str(&raw)
                    .map_err(|e| StorageError::Serialization(format!("store header: {e}")))?;
                let salt = decode_salt(&header.salt)?;
                let key = kdf::derive_key(password, &salt, &header.kdf)?;
                let check = decode_hex(&header.check)?;
                open(&check, CHECK_AAD, &key).map_err(|_| StorageError::WrongPassword)?;
                key
            }
            None => {
                let salt = kdf::generate_salt(entropy.as_ref())?;
                let key = kdf::derive_key(password, &salt, &params)?;
                let check = seal(CHECK_PLAINTEXT, CHECK_AAD, &key, entropy.as_ref())?;
                let header = StoreHeader {
                    version: 1,
                    salt: hex::encode(salt),
                    kdf: params,
                    check: hex::encode(check),
                };
                let raw = serde_json::to_string(&header)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                inner.set(HEADER_KEY, &raw).await?;
                debug!("initialized encrypted store");
                key
            }
        };

        Ok(Self {
            inner,
            key,
            entropy,
        })
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> fmt::Debug for EncryptedStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedStore").finish_non_exhaustive()
    }
}

fn reject_reserved(key: &str) -> Result<(), StorageError> {
    if key == HEADER_KEY {
        return Err(StorageError::ReservedKey(key.to_owned()));
    }
    Ok(())
}

fn decode_hex(value: &str) -> Result<Vec<u8>, StorageError> {
    hex::decode(value).map_err(|e| StorageError::Serialization(format!("hex: {e}")))
}

fn decode_salt(value: &str) -> Result<[u8; SALT_LEN], StorageError> {
    decode_hex(value)?
        .try_into()
        .map_err(|_| StorageError::Serialization("store salt has wrong length".into()))
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for EncryptedStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        reject_reserved(key)?;
        let Some(raw) = self.inner.get(key).await? else {
            return Ok(None);
        };
        let sealed = decode_hex(&raw)?;
        let plaintext = open(&sealed, key.as_bytes(), &self.key)?;
        String::from_utf8(plaintext.to_vec())
            .map(Some)
            .map_err(|_| StorageError::Serialization("decrypted value is not UTF-8".into()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        reject_reserved(key)?;
        let sealed = seal(value.as_bytes(), key.as_bytes(), &self.key, self.entropy.as_ref())?;
        self.inner.set(key, &hex::encode(sealed)).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        reject_reserved(key)?;
        self.inner.delete(key).await
    }
}
