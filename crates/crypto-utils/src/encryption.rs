use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::random::EntropySource;

/// AES-256-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-256-GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Seals `plaintext` under `key`, binding `aad` as associated data.
///
/// The nonce is drawn from `entropy` and prepended to the output:
/// `[nonce (12 bytes) | ciphertext + tag]`. A value sealed with one `aad`
/// will only open with the same `aad`, so ciphertexts cannot be moved between
/// storage slots.
pub fn seal(
    plaintext: &[u8],
    aad: &[u8],
    key: &[u8; 32],
    entropy: &dyn EntropySource,
) -> Result<Vec<u8>, CryptoError> {
    let mut nonce = [0u8; NONCE_SIZE];
    entropy.fill(&mut nonce)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::Seal)?;

    let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Opens data produced by [`seal`] with the same `key` and `aad`.
pub fn open(
    sealed: &[u8],
    aad: &[u8],
    key: &[u8; 32],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Truncated { len: sealed.len() });
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), Payload { msg: ciphertext, aad })
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Authentication)
}
