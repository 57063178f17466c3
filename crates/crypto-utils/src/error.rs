use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The OS (or injected) randomness source failed. Never retried with a
    /// weaker source.
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("AES-GCM seal failed")]
    Seal,

    /// Wrong key, wrong associated data, or tampered ciphertext.
    #[error("ciphertext failed authentication")]
    Authentication,

    #[error("sealed value is {len} bytes, shorter than nonce plus tag")]
    Truncated { len: usize },

    #[error("argon2: {0}")]
    Kdf(String),
}
