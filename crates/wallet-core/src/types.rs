use std::fmt;

use chain_sol::{keypair_from_secret_key, SolKeypair};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::error::WalletError;
use crate::hd_derivation::DerivationScheme;

/// The wallet blob as persisted in the standard store.
///
/// ```json
/// { "publicKey": "<base58>", "secretKey": [64 numbers], "derivation": "bip44-change" }
/// ```
///
/// Blobs written by the legacy app have no `derivation` field and may carry a
/// plaintext `mnemonic`; the former reads as [`DerivationScheme::legacy`], the
/// latter is accepted on input and never written back.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWallet {
    pub public_key: String,
    pub secret_key: Vec<u8>,
    #[serde(default = "DerivationScheme::legacy")]
    pub derivation: DerivationScheme,
    #[serde(rename = "mnemonic", default, skip_serializing)]
    legacy_mnemonic: Option<String>,
}

impl StoredWallet {
    pub fn new(keypair: &SolKeypair, derivation: DerivationScheme) -> Self {
        Self {
            public_key: keypair.address(),
            secret_key: keypair.secret_key_bytes().to_vec(),
            derivation,
            legacy_mnemonic: None,
        }
    }

    /// Parse a blob. Any structural problem is a corrupt record, not an absent one.
    pub fn from_json(raw: &str) -> Result<Self, WalletError> {
        serde_json::from_str(raw).map_err(|e| {
            WalletError::MalformedPersistedRecord(format!("wallet blob is not valid: {e}"))
        })
    }

    pub fn to_json(&self) -> Result<Zeroizing<String>, WalletError> {
        serde_json::to_string(self)
            .map(Zeroizing::new)
            .map_err(|e| WalletError::Internal(format!("serialize wallet blob: {e}")))
    }

    /// Rebuild the keypair and check it against the recorded address.
    pub fn keypair(&self) -> Result<SolKeypair, WalletError> {
        let keypair = keypair_from_secret_key(&self.secret_key)
            .map_err(|e| WalletError::MalformedPersistedRecord(e.to_string()))?;
        if keypair.address() != self.public_key {
            return Err(WalletError::MalformedPersistedRecord(
                "recorded public key does not match the secret key".into(),
            ));
        }
        Ok(keypair)
    }

    /// Plaintext phrase left in the blob by the legacy app, if any.
    pub fn legacy_mnemonic(&self) -> Option<&str> {
        self.legacy_mnemonic.as_deref()
    }

    /// Drop the plaintext phrase so the next [`to_json`](Self::to_json) omits it.
    pub fn strip_legacy_mnemonic(&mut self) {
        if let Some(mut phrase) = self.legacy_mnemonic.take() {
            phrase.zeroize();
        }
    }
}

impl Drop for StoredWallet {
    fn drop(&mut self) {
        self.secret_key.zeroize();
        self.legacy_mnemonic.zeroize();
    }
}

impl fmt::Debug for StoredWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredWallet")
            .field("public_key", &self.public_key)
            .field("derivation", &self.derivation)
            .finish_non_exhaustive()
    }
}

/// A freshly created or restored wallet.
///
/// This is the only time the recovery phrase is handed back without an
/// explicit [`reveal_seed_phrase`](crate::WalletService::reveal_seed_phrase).
#[derive(Debug)]
pub struct WalletRecord {
    pub keypair: SolKeypair,
    pub mnemonic: SecretString,
    pub derivation: DerivationScheme,
}

impl WalletRecord {
    /// Base58 address.
    pub fn public_key(&self) -> String {
        self.keypair.address()
    }
}

/// Public wallet metadata, readable without touching secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub public_key: String,
    pub derivation: DerivationScheme,
}
