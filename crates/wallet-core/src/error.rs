use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

/// Which of the two persistence collaborators an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// General app storage holding the wallet blob.
    Standard,
    /// Platform secret storage holding the recovery phrase.
    Secure,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Standard => f.write_str("standard store"),
            StoreKind::Secure => f.write_str("secure store"),
        }
    }
}

/// Why a recovery phrase was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MnemonicIssue {
    /// Not 12, 15, 18, 21 or 24 words.
    WordCount(usize),
    /// Word at this zero-based position is not in the wordlist.
    UnknownWord { position: usize },
    /// All words are known but the embedded checksum does not match.
    Checksum,
    Other(String),
}

impl fmt::Display for MnemonicIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MnemonicIssue::WordCount(n) => {
                write!(f, "expected 12, 15, 18, 21 or 24 words, got {n}")
            }
            MnemonicIssue::UnknownWord { position } => {
                write!(f, "word {} is not in the BIP-39 word list", position + 1)
            }
            MnemonicIssue::Checksum => f.write_str("checksum mismatch"),
            MnemonicIssue::Other(msg) => f.write_str(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Entropy source unavailable: {0}")]
    EntropySourceUnavailable(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(MnemonicIssue),

    #[error("Failed to read from {store}: {source}")]
    StorageRead {
        store: StoreKind,
        #[source]
        source: StorageError,
    },

    #[error("Failed to write to {store}: {source}")]
    StorageWrite {
        store: StoreKind,
        #[source]
        source: StorageError,
    },

    #[error("Failed to delete from {}: {message}", join_stores(.stores))]
    StorageDelete {
        stores: Vec<StoreKind>,
        message: String,
    },

    #[error("Stored wallet is corrupt: {0}")]
    MalformedPersistedRecord(String),

    #[error("Stored keypair was not derived from the stored recovery phrase")]
    InconsistentWallet,

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// `true` for errors the user can fix by re-entering the recovery phrase.
    pub fn is_invalid_mnemonic(&self) -> bool {
        matches!(self, WalletError::InvalidMnemonic(_))
    }

    /// `true` if persisted state exists but cannot be trusted; the UI should
    /// offer recovery from the phrase rather than wallet creation.
    pub fn is_corrupt_wallet(&self) -> bool {
        matches!(
            self,
            WalletError::MalformedPersistedRecord(_) | WalletError::InconsistentWallet
        )
    }
}

fn join_stores(stores: &[StoreKind]) -> String {
    stores
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}

impl From<crypto_utils::CryptoError> for WalletError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        match e {
            crypto_utils::CryptoError::EntropyUnavailable(msg) => {
                WalletError::EntropySourceUnavailable(msg)
            }
            other => WalletError::Internal(other.to_string()),
        }
    }
}

impl From<chain_sol::SolError> for WalletError {
    fn from(e: chain_sol::SolError) -> Self {
        if e.is_secret_key_error() {
            WalletError::InvalidPrivateKey(e.to_string())
        } else {
            WalletError::DerivationFailed(e.to_string())
        }
    }
}

impl From<config::ConfigError> for WalletError {
    fn from(e: config::ConfigError) -> Self {
        WalletError::Config(e.to_string())
    }
}
