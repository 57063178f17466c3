//! Solana key material for the wallet core.
//!
//! A Solana account key is an Ed25519 keypair whose address is the Base58
//! encoding of the 32-byte public key. Secret keys travel in the 64-byte
//! `seed || public key` layout used by `solana-keygen` and `@solana/web3.js`.

pub mod address;
pub mod error;
pub mod keypair;

pub use address::{address_to_bytes, bytes_to_address, is_valid_address, validate_address};
pub use error::SolError;
pub use keypair::{
    keypair_from_secret_key, keypair_from_seed, verify_signature, SolKeypair, SECRET_KEY_LEN,
};
