//! Solana address encoding and structural validation.
//!
//! Solana addresses are Base58-encoded 32-byte Ed25519 public keys, with no
//! hashing or checksum. Validation is structural only: the string must decode
//! to exactly 32 bytes. Whether the bytes are a point on the curve is not
//! checked, since program-derived addresses are deliberately off-curve.

use crate::error::SolError;

/// Longest Base58 rendering of 32 bytes.
const MAX_ADDRESS_LEN: usize = 44;

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Solana address string to its 32-byte representation.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    if address.is_empty() || address.len() > MAX_ADDRESS_LEN {
        return Err(SolError::InvalidAddress(format!(
            "expected 1..={} characters, got {}",
            MAX_ADDRESS_LEN,
            address.len()
        )));
    }

    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Validate a Solana address string, reporting why it is malformed.
pub fn validate_address(address: &str) -> Result<(), SolError> {
    address_to_bytes(address).map(|_| ())
}

/// `true` if `address` is a structurally valid Solana address.
pub fn is_valid_address(address: &str) -> bool {
    validate_address(address).is_ok()
}
