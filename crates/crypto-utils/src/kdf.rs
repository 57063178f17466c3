use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::random::EntropySource;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub m_cost_kib: u32,
    /// Iterations
    pub t_cost: u32,
    /// Lanes
    pub p_cost: u32,
}

impl Default for KdfParams {
    /// 64 MiB, 3 iterations, 4 lanes.
    fn default() -> Self {
        Self {
            m_cost_kib: 65536,
            t_cost: 3,
            p_cost: 4,
        }
    }
}

/// Derives a 32-byte key from `password` and `salt` using Argon2id.
pub fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let argon_params = Params::new(params.m_cost_kib, params.t_cost, params.p_cost, Some(32))
        .map_err(|e| CryptoError::Kdf(format!("invalid params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password, salt, &mut output[..])
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;

    Ok(output)
}

/// Draws a fresh salt from `entropy`.
pub fn generate_salt(entropy: &dyn EntropySource) -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    entropy.fill(&mut salt)?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::OsEntropy;

    fn cheap() -> KdfParams {
        KdfParams {
            m_cost_kib: 256,
            t_cost: 1,
            p_cost: 1,
        }
    }

    #[test]
    fn derive_key_deterministic() {
        let salt = [0xABu8; SALT_LEN];
        let key1 = derive_key(b"my-strong-password", &salt, &cheap()).unwrap();
        let key2 = derive_key(b"my-strong-password", &salt, &cheap()).unwrap();
        assert_eq!(*key1, *key2, "same password + salt must produce same key");
    }

    #[test]
    fn different_passwords_differ() {
        let salt = [0x01u8; SALT_LEN];
        let key1 = derive_key(b"password-a", &salt, &cheap()).unwrap();
        let key2 = derive_key(b"password-b", &salt, &cheap()).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn different_salts_differ() {
        let key1 = derive_key(b"same", &[0x01u8; SALT_LEN], &cheap()).unwrap();
        let key2 = derive_key(b"same", &[0x02u8; SALT_LEN], &cheap()).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn params_change_output() {
        let salt = [0x07u8; SALT_LEN];
        let mut heavier = cheap();
        heavier.t_cost = 2;
        let key1 = derive_key(b"pw", &salt, &cheap()).unwrap();
        let key2 = derive_key(b"pw", &salt, &heavier).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn rejects_degenerate_params() {
        let params = KdfParams {
            m_cost_kib: 1,
            t_cost: 0,
            p_cost: 1,
        };
        let err = derive_key(b"pw", &[0u8; SALT_LEN], &params).unwrap_err();
        assert!(matches!(err, CryptoError::Kdf(_)));
    }

    #[test]
    fn default_params_are_interactive_strength() {
        let params = KdfParams::default();
        assert_eq!(params.m_cost_kib, 65536);
        assert_eq!(params.t_cost, 3);
        assert_eq!(params.p_cost, 4);
    }

    #[test]
    fn salts_are_random() {
        let salt1 = generate_salt(&OsEntropy).unwrap();
        let salt2 = generate_salt(&OsEntropy).unwrap();
        assert_ne!(salt1, salt2);
    }
}
