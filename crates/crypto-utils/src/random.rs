use rand_core::{OsRng, RngCore};

use crate::error::CryptoError;

/// A source of cryptographically secure randomness.
///
/// Filling may fail (no `getrandom` support, sandbox denial, ...). Callers
/// must surface the failure; there is no weaker fallback.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))
    }
}
