//! # wallet-core
//!
//! Key management for a single-account Solana mobile wallet: BIP-39 recovery
//! phrases, SLIP-0010 Ed25519 derivation, and a persistence protocol that
//! keeps the keypair blob and the recovery phrase in two separate stores
//! without ever pairing one with the other's stale counterpart.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wallet_core::{FileStore, MemoryStore, WalletConfig, WalletService};
//!
//! # async fn demo() -> Result<(), wallet_core::WalletError> {
//! let service = WalletService::new(
//!     Arc::new(FileStore::new("wallet.json")),
//!     Arc::new(MemoryStore::new()),
//!     WalletConfig::from_env()?,
//! );
//! let record = service.create_wallet().await?;
//! let loaded = service.load_wallet().await?;
//! assert_eq!(loaded.map(|kp| kp.address()), Some(record.public_key()));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod hd_derivation;
pub mod mnemonic;
pub mod service;
pub mod storage;
pub mod types;

pub use chain_sol::SolKeypair;
pub use config::WalletConfig;
pub use error::{MnemonicIssue, StoreKind, WalletError};
pub use hd_derivation::{derive_keypair, DerivationScheme};
pub use mnemonic::{
    check_mnemonic, generate_mnemonic, mnemonic_to_seed, validate_mnemonic, RecoveryPhrase,
    Seed, WordCount,
};
pub use service::WalletService;
pub use storage::{EncryptedStore, FileStore, KeyValueStore, MemoryStore, StorageError};
#[cfg(feature = "os-keyring")]
pub use storage::KeyringStore;
pub use types::{StoredWallet, WalletInfo, WalletRecord};
