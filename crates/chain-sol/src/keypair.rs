//! Ed25519 keypairs in Solana's layout.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

use crate::address::bytes_to_address;
use crate::error::SolError;

/// Length of a Solana secret key: 32-byte seed followed by the 32-byte public key.
pub const SECRET_KEY_LEN: usize = 64;

/// A Solana signing keypair.
///
/// The private half is zeroized on drop by `ed25519-dalek`. `Debug` shows the
/// address only.
#[derive(Clone)]
pub struct SolKeypair {
    signing_key: SigningKey,
}

impl SolKeypair {
    /// Raw 32-byte Ed25519 public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Base58 address of the public key.
    pub fn address(&self) -> String {
        bytes_to_address(&self.public_key_bytes())
    }

    /// 64-byte secret key (`seed || public key`).
    pub fn secret_key_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LEN]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Sign `message`, returning the 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verify `signature` over `message` against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        verify_signature(&self.public_key_bytes(), message, signature).unwrap_or(false)
    }
}

impl fmt::Debug for SolKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Build a keypair from a 32-byte Ed25519 seed (the private scalar source).
pub fn keypair_from_seed(seed: &[u8; 32]) -> SolKeypair {
    SolKeypair {
        signing_key: SigningKey::from_bytes(seed),
    }
}

/// Rebuild a keypair from a persisted 64-byte secret key.
///
/// Fails if the length is wrong or if the trailing public key is not the
/// image of the leading seed.
pub fn keypair_from_secret_key(secret_key: &[u8]) -> Result<SolKeypair, SolError> {
    let bytes: &[u8; SECRET_KEY_LEN] = secret_key
        .try_into()
        .map_err(|_| SolError::SecretKeyLength(secret_key.len()))?;

    let signing_key = SigningKey::from_keypair_bytes(bytes)
        .map_err(|_| SolError::KeypairMismatch)?;

    Ok(SolKeypair { signing_key })
}

/// Verify an Ed25519 signature against a raw public key.
pub fn verify_signature(
    public_key: &[u8; 32],
    message: &[u8],
    signature: &[u8; 64],
) -> Result<bool, SolError> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| SolError::InvalidPublicKey(e.to_string()))?;
    let signature = Signature::from_bytes(signature);
    Ok(verifying_key.verify(message, &signature).is_ok())
}
