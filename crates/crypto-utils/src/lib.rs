//! # crypto-utils
//!
//! Entropy sourcing, password-based key derivation, authenticated sealing and
//! constant-time comparison for the wallet core.

pub mod compare;
pub mod encryption;
pub mod error;
pub mod kdf;
pub mod random;

pub use error::CryptoError;
pub use random::{EntropySource, OsEntropy};
