//! Wallet lifecycle: create, restore, load and clear the single device wallet.
//!
//! Two collaborators hold the state:
//!
//! - the *standard* store keeps the wallet blob ([`StoredWallet`]) under
//!   [`WalletConfig::wallet_key`];
//! - the *secure* store keeps the recovery phrase under
//!   [`WalletConfig::seed_phrase_key`].
//!
//! A new wallet is written in a fixed order: the phrase is staged under
//! [`WalletConfig::pending_seed_phrase_key`], the blob replaces the old one,
//! the staged phrase is promoted, and the staging entry is dropped. The old
//! phrase is only overwritten once the new blob is stored. If the caller
//! stops at any await point, the next load settles a leftover staged phrase
//! against whichever blob is present, so the result is the old wallet or the
//! new one. A failed write is rolled back to the previous pair before the
//! error is returned.

use std::fmt;
use std::sync::Arc;

use chain_sol::SolKeypair;
use crypto_utils::compare::ct_eq;
use crypto_utils::{EntropySource, OsEntropy};
use secrecy::SecretString;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::WalletConfig;
use crate::error::{StoreKind, WalletError};
use crate::hd_derivation::{derive_keypair, DerivationScheme};
use crate::mnemonic::{check_mnemonic, generate_mnemonic, RecoveryPhrase};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::{StoredWallet, WalletInfo, WalletRecord};

/// Store contents captured before a write, restored on failure.
struct Snapshot {
    blob: Option<Zeroizing<String>>,
    phrase: Option<Zeroizing<String>>,
}

pub struct WalletService {
    standard: Arc<dyn KeyValueStore>,
    secure: Arc<dyn KeyValueStore>,
    config: WalletConfig,
    entropy: Arc<dyn EntropySource>,
}

impl WalletService {
    pub fn new(
        standard: Arc<dyn KeyValueStore>,
        secure: Arc<dyn KeyValueStore>,
        config: WalletConfig,
    ) -> Self {
        Self {
            standard,
            secure,
            config,
            entropy: Arc::new(OsEntropy),
        }
    }

    /// Replace the OS entropy source used for new recovery phrases.
    pub fn with_entropy_source(mut self, entropy: Arc<dyn EntropySource>) -> Self {
        self.entropy = entropy;
        self
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Generate a new recovery phrase and persist the wallet derived from it.
    ///
    /// Replaces any wallet already stored. The returned record is the only
    /// place the phrase is handed out unasked.
    pub async fn create_wallet(&self) -> Result<WalletRecord, WalletError> {
        let phrase = generate_mnemonic(self.config.word_count, self.entropy.as_ref())?;
        let record = self.install(phrase).await?;
        info!(address = %record.public_key(), derivation = ?record.derivation, "wallet created");
        Ok(record)
    }

    /// Validate `phrase` and persist the wallet derived from it.
    ///
    /// An invalid phrase fails with [`WalletError::InvalidMnemonic`] before
    /// either store is touched.
    pub async fn restore_wallet(&self, phrase: &str) -> Result<WalletRecord, WalletError> {
        let phrase = check_mnemonic(phrase)?;
        let record = self.install(phrase).await?;
        info!(address = %record.public_key(), derivation = ?record.derivation, "wallet restored");
        Ok(record)
    }

    /// Rebuild the stored keypair.
    ///
    /// `Ok(None)` means no wallet has been stored. A blob that exists but
    /// cannot be trusted is an error, never `None`.
    pub async fn load_wallet(&self) -> Result<Option<SolKeypair>, WalletError> {
        let Some((stored, keypair)) = self.open_stored().await? else {
            debug!("no stored wallet");
            return Ok(None);
        };

        if self.config.verify_on_load {
            match self.read(StoreKind::Secure).await? {
                Some(phrase) => verify_against_phrase(&keypair, &phrase, stored.derivation)?,
                None => warn!(
                    address = %keypair.address(),
                    "stored wallet has no recovery phrase in the secure store"
                ),
            }
        }

        debug!(address = %keypair.address(), "wallet loaded");
        Ok(Some(keypair))
    }

    /// Erase the blob, then the recovery phrase and any staged phrase.
    ///
    /// Every deletion is attempted; the error names every store that failed.
    pub async fn clear_wallet(&self) -> Result<(), WalletError> {
        let pending_key = self.config.pending_seed_phrase_key();
        let entries = [
            (StoreKind::Standard, self.key(StoreKind::Standard)),
            (StoreKind::Secure, self.key(StoreKind::Secure)),
            (StoreKind::Secure, pending_key.as_str()),
        ];

        let mut failed = Vec::new();
        let mut messages = Vec::new();
        for (kind, key) in entries {
            if let Err(e) = self.store(kind).delete(key).await {
                warn!(store = %kind, key, error = %e, "failed to clear wallet entry");
                if !failed.contains(&kind) {
                    failed.push(kind);
                }
                messages.push(e.to_string());
            }
        }

        if failed.is_empty() {
            info!("wallet cleared");
            Ok(())
        } else {
            Err(WalletError::StorageDelete {
                stores: failed,
                message: messages.join("; "),
            })
        }
    }

    /// `true` if `candidate` decodes from Base58 to exactly 32 bytes.
    pub fn validate_address(&self, candidate: &str) -> bool {
        chain_sol::is_valid_address(candidate)
    }

    /// Address and derivation scheme of the stored wallet, read from the blob
    /// without rebuilding the keypair.
    pub async fn stored_wallet_info(&self) -> Result<Option<WalletInfo>, WalletError> {
        let Some(raw) = self.read(StoreKind::Standard).await? else {
            return Ok(None);
        };
        let stored = StoredWallet::from_json(&raw)?;
        Ok(Some(WalletInfo {
            public_key: stored.public_key.clone(),
            derivation: stored.derivation,
        }))
    }

    /// The stored recovery phrase, for backup display.
    ///
    /// `None` unless a wallet blob is stored alongside it, so a phrase
    /// orphaned by an interrupted write is never presented as the wallet's.
    /// The phrase is always checked against the blob first; one that derives
    /// a different key is [`WalletError::InconsistentWallet`].
    pub async fn reveal_seed_phrase(&self) -> Result<Option<SecretString>, WalletError> {
        let Some((stored, keypair)) = self.open_stored().await? else {
            return Ok(None);
        };
        let Some(phrase) = self.read(StoreKind::Secure).await? else {
            return Ok(None);
        };
        verify_against_phrase(&keypair, &phrase, stored.derivation)?;
        Ok(Some(SecretString::from(phrase.to_string())))
    }

    pub async fn has_wallet(&self) -> Result<bool, WalletError> {
        Ok(self.read(StoreKind::Standard).await?.is_some())
    }

    async fn install(&self, phrase: RecoveryPhrase) -> Result<WalletRecord, WalletError> {
        let derivation = self.config.derivation;
        let seed = phrase.to_seed("")?;
        let keypair = derive_keypair(&seed, derivation)?;
        let blob = StoredWallet::new(&keypair, derivation).to_json()?;

        self.persist(phrase.as_str(), &blob).await?;

        Ok(WalletRecord {
            keypair,
            mnemonic: phrase.to_secret(),
            derivation,
        })
    }

    async fn persist(&self, phrase: &str, blob: &str) -> Result<(), WalletError> {
        let previous = Snapshot {
            blob: self.read(StoreKind::Standard).await?,
            phrase: self.read(StoreKind::Secure).await?,
        };
        let pending_key = self.config.pending_seed_phrase_key();

        if let Err(e) = self.write_at(StoreKind::Secure, &pending_key, phrase).await {
            warn!(error = %e, "staging recovery phrase failed");
            self.drop_pending(&pending_key).await;
            return Err(e);
        }
        if let Err(e) = self.write(StoreKind::Standard, blob).await {
            warn!(error = %e, "wallet blob write failed, rolling back");
            self.rollback(&previous, &pending_key, false).await;
            return Err(e);
        }
        if let Err(e) = self.write(StoreKind::Secure, phrase).await {
            warn!(error = %e, "recovery phrase write failed, rolling back");
            self.rollback(&previous, &pending_key, true).await;
            return Err(e);
        }
        // The pair is complete; a leftover staged copy is settled on load.
        self.drop_pending(&pending_key).await;
        Ok(())
    }

    /// Put back the snapshot, blob first. If the blob cannot be restored the
    /// staged phrase is kept, since it matches the blob now stored.
    async fn rollback(&self, previous: &Snapshot, pending_key: &str, phrase_attempted: bool) {
        if let Err(e) = self
            .restore_entry(StoreKind::Standard, previous.blob.as_ref().map(|b| b.as_str()))
            .await
        {
            warn!(store = %StoreKind::Standard, error = %e, "rollback failed, keeping staged phrase");
            return;
        }
        if phrase_attempted {
            if let Err(e) = self
                .restore_entry(StoreKind::Secure, previous.phrase.as_ref().map(|p| p.as_str()))
                .await
            {
                warn!(store = %StoreKind::Secure, error = %e, "rollback failed");
            }
        }
        self.drop_pending(pending_key).await;
    }

    async fn drop_pending(&self, pending_key: &str) {
        if let Err(e) = self.secure.delete(pending_key).await {
            warn!(store = %StoreKind::Secure, error = %e, "failed to drop staged recovery phrase");
        }
    }

    async fn restore_entry(
        &self,
        kind: StoreKind,
        value: Option<&str>,
    ) -> Result<(), StorageError> {
        let store = self.store(kind);
        match value {
            Some(value) => store.set(self.key(kind), value).await,
            None => store.delete(self.key(kind)).await,
        }
    }

    /// Read and rebuild the stored wallet, settling a staged phrase and
    /// migrating a legacy blob on the way.
    async fn open_stored(&self) -> Result<Option<(StoredWallet, SolKeypair)>, WalletError> {
        let Some(raw) = self.read(StoreKind::Standard).await? else {
            return Ok(None);
        };
        let mut stored = StoredWallet::from_json(&raw)?;
        let keypair = stored.keypair()?;

        self.settle_pending(&keypair, stored.derivation).await?;
        if stored.legacy_mnemonic().is_some() {
            self.migrate_legacy_blob(&mut stored, &keypair).await?;
        }
        Ok(Some((stored, keypair)))
    }

    /// Finish or discard a phrase staged by a write that never completed.
    ///
    /// A staged phrase that derives the stored key belongs to the new blob and
    /// is promoted; anything else belongs to a blob that never landed.
    async fn settle_pending(
        &self,
        keypair: &SolKeypair,
        derivation: DerivationScheme,
    ) -> Result<(), WalletError> {
        let pending_key = self.config.pending_seed_phrase_key();
        let Some(staged) = self.read_at(StoreKind::Secure, &pending_key).await? else {
            return Ok(());
        };

        if phrase_matches(keypair, &staged, derivation).unwrap_or(false) {
            self.write(StoreKind::Secure, &staged).await?;
            info!(address = %keypair.address(), "completed interrupted wallet write");
        } else {
            info!(address = %keypair.address(), "discarded recovery phrase from an interrupted write");
        }

        self.secure
            .delete(&pending_key)
            .await
            .map_err(|e| WalletError::StorageDelete {
                stores: vec![StoreKind::Secure],
                message: e.to_string(),
            })
    }

    /// Move a phrase left in a legacy blob into the secure store and rewrite
    /// the blob without it.
    async fn migrate_legacy_blob(
        &self,
        stored: &mut StoredWallet,
        keypair: &SolKeypair,
    ) -> Result<(), WalletError> {
        let Some(legacy) = stored.legacy_mnemonic() else {
            return Ok(());
        };
        verify_against_phrase(keypair, legacy, stored.derivation)?;

        match self.read(StoreKind::Secure).await? {
            Some(phrase) if self.config.verify_on_load => {
                verify_against_phrase(keypair, &phrase, stored.derivation)?;
            }
            Some(_) => {}
            None => {
                let phrase = Zeroizing::new(legacy.to_owned());
                self.write(StoreKind::Secure, &phrase).await?;
            }
        }

        stored.strip_legacy_mnemonic();
        self.write(StoreKind::Standard, &stored.to_json()?).await?;
        info!(address = %keypair.address(), "migrated legacy wallet blob");
        Ok(())
    }

    fn store(&self, kind: StoreKind) -> &dyn KeyValueStore {
        match kind {
            StoreKind::Standard => self.standard.as_ref(),
            StoreKind::Secure => self.secure.as_ref(),
        }
    }

    fn key(&self, kind: StoreKind) -> &str {
        match kind {
            StoreKind::Standard => &self.config.wallet_key,
            StoreKind::Secure => &self.config.seed_phrase_key,
        }
    }

    async fn read(&self, kind: StoreKind) -> Result<Option<Zeroizing<String>>, WalletError> {
        self.read_at(kind, self.key(kind)).await
    }

    async fn read_at(
        &self,
        kind: StoreKind,
        key: &str,
    ) -> Result<Option<Zeroizing<String>>, WalletError> {
        self.store(kind)
            .get(key)
            .await
            .map(|value| value.map(Zeroizing::new))
            .map_err(|source| WalletError::StorageRead {
                store: kind,
                source,
            })
    }

    async fn write(&self, kind: StoreKind, value: &str) -> Result<(), WalletError> {
        self.write_at(kind, self.key(kind), value).await
    }

    async fn write_at(&self, kind: StoreKind, key: &str, value: &str) -> Result<(), WalletError> {
        self.store(kind)
            .set(key, value)
            .await
            .map_err(|source| WalletError::StorageWrite {
                store: kind,
                source,
            })
    }
}

impl fmt::Debug for WalletService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Re-derive from `phrase` and compare public keys in constant time.
fn verify_against_phrase(
    keypair: &SolKeypair,
    phrase: &str,
    derivation: DerivationScheme,
) -> Result<(), WalletError> {
    if !phrase_matches(keypair, phrase, derivation)? {
        warn!(address = %keypair.address(), "stored keypair does not match recovery phrase");
        return Err(WalletError::InconsistentWallet);
    }
    Ok(())
}

fn phrase_matches(
    keypair: &SolKeypair,
    phrase: &str,
    derivation: DerivationScheme,
) -> Result<bool, WalletError> {
    let phrase = check_mnemonic(phrase).map_err(|e| {
        WalletError::MalformedPersistedRecord(format!("stored recovery phrase: {e}"))
    })?;
    let derived = derive_keypair(&phrase.to_seed("")?, derivation)?;
    Ok(ct_eq(&derived.public_key_bytes(), &keypair.public_key_bytes()))
}
