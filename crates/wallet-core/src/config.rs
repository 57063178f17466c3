use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::WalletError;
use crate::hd_derivation::DerivationScheme;
use crate::mnemonic::WordCount;

const ENV_PREFIX: &str = "WALLET";

/// Wallet lifecycle settings.
///
/// Every field has a default, so an empty source yields [`WalletConfig::default`].
/// Environment variables use the `WALLET_` prefix, e.g. `WALLET_WORD_COUNT=24`
/// or `WALLET_DERIVATION=seed-prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Length of newly generated recovery phrases.
    pub word_count: WordCount,
    /// Scheme used for new and restored wallets.
    pub derivation: DerivationScheme,
    /// Standard-store key of the wallet blob.
    pub wallet_key: String,
    /// Secure-store key of the recovery phrase.
    pub seed_phrase_key: String,
    /// Re-derive from the stored phrase on load and reject mismatches.
    pub verify_on_load: bool,
}

fn default_wallet_key() -> String {
    "@wallet_data".to_string()
}

fn default_seed_phrase_key() -> String {
    "@secure_seed_phrase".to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            word_count: WordCount::default(),
            derivation: DerivationScheme::default(),
            wallet_key: default_wallet_key(),
            seed_phrase_key: default_seed_phrase_key(),
            verify_on_load: true,
        }
    }
}

impl WalletConfig {
    /// Load from an optional config file, overridden by `WALLET_*` variables.
    pub fn load(file: Option<&Path>) -> Result<Self, WalletError> {
        Self::build(file, None)
    }

    /// Defaults overridden by `WALLET_*` environment variables.
    pub fn from_env() -> Result<Self, WalletError> {
        Self::build(None, None)
    }

    fn build(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, WalletError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build()?.try_deserialize::<WalletConfig>()?;
        config.validate()?;
        Ok(config)
    }

    /// Secure-store key a new phrase is staged under until its blob is stored.
    pub fn pending_seed_phrase_key(&self) -> String {
        format!("{}.pending", self.seed_phrase_key)
    }

    /// Reject settings the lifecycle cannot work with.
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.wallet_key.trim().is_empty() {
            return Err(WalletError::Config("wallet_key must not be empty".into()));
        }
        if self.seed_phrase_key.trim().is_empty() {
            return Err(WalletError::Config(
                "seed_phrase_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}
