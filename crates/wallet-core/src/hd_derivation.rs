use chain_sol::SolKeypair;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::mnemonic::Seed;

type HmacSha512 = Hmac<Sha512>;

const HARDENED: u32 = 0x8000_0000;

/// How a BIP-39 seed becomes the Solana signing key.
///
/// - `Bip44Change`: SLIP-0010 Ed25519 along `m/44'/501'/0'/0'`, the path used
///   by Phantom, Solflare and Ledger.
/// - `SeedPrefix`: the first 32 seed bytes used directly as the Ed25519 seed,
///   as `solana-keygen recover` does without a derivation path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DerivationScheme {
    #[default]
    Bip44Change,
    SeedPrefix,
}

impl DerivationScheme {
    /// Scheme assumed for records written before the scheme was recorded.
    pub fn legacy() -> Self {
        DerivationScheme::SeedPrefix
    }

    /// The SLIP-0010 path, if this scheme walks one.
    pub fn path(self) -> Option<&'static str> {
        match self {
            DerivationScheme::Bip44Change => Some("m/44'/501'/0'/0'"),
            DerivationScheme::SeedPrefix => None,
        }
    }
}

/// Derive the Solana keypair for `seed` under `scheme`. Pure.
pub fn derive_keypair(seed: &Seed, scheme: DerivationScheme) -> Result<SolKeypair, WalletError> {
    match scheme.path() {
        Some(path) => {
            let key = derive_ed25519_private_key(seed.as_bytes(), path)?;
            Ok(chain_sol::keypair_from_seed(&key))
        }
        None => {
            let mut prefix = Zeroizing::new([0u8; 32]);
            prefix.copy_from_slice(&seed.as_bytes()[..32]);
            Ok(chain_sol::keypair_from_seed(&prefix))
        }
    }
}

/// SLIP-0010 Ed25519 private key at `path`. Every component must be hardened.
pub fn derive_ed25519_private_key(
    seed: &[u8],
    path: &str,
) -> Result<Zeroizing<[u8; 32]>, WalletError> {
    if seed.len() < 16 || seed.len() > 64 {
        return Err(WalletError::InvalidSeed(format!(
            "expected 16..=64 bytes, got {}",
            seed.len()
        )));
    }

    let components = parse_derivation_path(path)?;

    // Master key: HMAC-SHA512(key="ed25519 seed", data=seed)
    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
    mac.update(seed);
    let mut result = Zeroizing::new([0u8; 64]);
    result.copy_from_slice(&mac.finalize().into_bytes());

    let mut key = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);

    for index in components {
        // Hardened child: 0x00 || key || index
        let mut mac = HmacSha512::new_from_slice(chain_code.as_slice())
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
        mac.update(&[0x00]);
        mac.update(key.as_slice());
        mac.update(&index.to_be_bytes());
        result.copy_from_slice(&mac.finalize().into_bytes());

        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);
    }

    Ok(key)
}

/// Parse "m/44'/501'/0'/0'" into hardened child indices.
fn parse_derivation_path(path: &str) -> Result<Vec<u32>, WalletError> {
    let rest = match path {
        "m" => return Ok(Vec::new()),
        _ => path.strip_prefix("m/").ok_or_else(|| {
            WalletError::DerivationFailed("Path must start with m/".into())
        })?,
    };

    rest.split('/')
        .map(|component| {
            let num_str = component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
                .ok_or_else(|| {
                    WalletError::DerivationFailed(format!(
                        "Ed25519 only supports hardened derivation, got {component}"
                    ))
                })?;
            let index = num_str.parse::<u32>().map_err(|e| {
                WalletError::DerivationFailed(format!("Invalid path component: {e}"))
            })?;
            if index >= HARDENED {
                return Err(WalletError::DerivationFailed(format!(
                    "Path component out of range: {index}"
                )));
            }
            Ok(index | HARDENED)
        })
        .collect()
}
