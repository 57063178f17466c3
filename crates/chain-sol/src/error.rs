use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolError {
    #[error("secret key is {0} bytes, expected 64")]
    SecretKeyLength(usize),

    /// The trailing 32 bytes of a secret key are not the public key of the
    /// leading 32.
    #[error("secret key halves do not belong to the same keypair")]
    KeypairMismatch,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl SolError {
    /// `true` if a persisted secret key could not be turned back into a keypair.
    pub fn is_secret_key_error(&self) -> bool {
        matches!(self, SolError::SecretKeyLength(_) | SolError::KeypairMismatch)
    }
}
