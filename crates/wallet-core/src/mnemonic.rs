use std::fmt;

use bip39::{Language, Mnemonic};
use crypto_utils::EntropySource;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{MnemonicIssue, WalletError};

/// BIP-39 seed length in bytes.
pub const SEED_LEN: usize = 64;

/// Supported recovery phrase lengths.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum WordCount {
    /// 128 bits of entropy
    #[default]
    Twelve,
    /// 160 bits
    Fifteen,
    /// 192 bits
    Eighteen,
    /// 224 bits
    TwentyOne,
    /// 256 bits
    TwentyFour,
}

impl WordCount {
    pub const ALL: [WordCount; 5] = [
        WordCount::Twelve,
        WordCount::Fifteen,
        WordCount::Eighteen,
        WordCount::TwentyOne,
        WordCount::TwentyFour,
    ];

    pub fn words(self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::Fifteen => 15,
            WordCount::Eighteen => 18,
            WordCount::TwentyOne => 21,
            WordCount::TwentyFour => 24,
        }
    }

    /// Entropy size in bytes: 32 bits per 3 words.
    pub fn entropy_bytes(self) -> usize {
        self.words() * 4 / 3
    }

    /// Checksum bits carried by the final word: ENT / 32.
    pub fn checksum_bits(self) -> usize {
        self.entropy_bytes() * 8 / 32
    }
}

impl TryFrom<usize> for WordCount {
    type Error = MnemonicIssue;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        match n {
            12 => Ok(WordCount::Twelve),
            15 => Ok(WordCount::Fifteen),
            18 => Ok(WordCount::Eighteen),
            21 => Ok(WordCount::TwentyOne),
            24 => Ok(WordCount::TwentyFour),
            other => Err(MnemonicIssue::WordCount(other)),
        }
    }
}

impl From<WordCount> for usize {
    fn from(wc: WordCount) -> usize {
        wc.words()
    }
}

/// A checksum-verified BIP-39 English recovery phrase.
///
/// Only obtainable through [`generate_mnemonic`], [`check_mnemonic`] or
/// [`RecoveryPhrase::from_entropy`], so holding one means the phrase is valid.
/// The phrase is stored normalized (lower-case, single spaces) and wiped on
/// drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryPhrase {
    phrase: String,
    #[zeroize(skip)]
    word_count: WordCount,
}

impl RecoveryPhrase {
    /// Encode raw entropy (16, 20, 24, 28 or 32 bytes) as a phrase.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
            .map_err(|e| WalletError::InvalidSeed(format!("bad entropy: {e}")))?;
        let word_count = WordCount::try_from(mnemonic.word_count())
            .map_err(WalletError::InvalidMnemonic)?;
        Ok(Self {
            phrase: mnemonic.to_string(),
            word_count,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn words(&self) -> Vec<&str> {
        self.phrase.split(' ').collect()
    }

    pub fn word_count(&self) -> WordCount {
        self.word_count
    }

    /// BIP-39 seed: PBKDF2-HMAC-SHA512, 2048 rounds, salt `"mnemonic" || passphrase`.
    pub fn to_seed(&self, passphrase: &str) -> Result<Seed, WalletError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &self.phrase)
            .map_err(|e| WalletError::Internal(format!("validated phrase failed to parse: {e}")))?;
        Ok(Seed(mnemonic.to_seed(passphrase)))
    }

    /// Hand the phrase to a caller for one-time display.
    pub fn to_secret(&self) -> SecretString {
        SecretString::from(self.phrase.clone())
    }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoveryPhrase(<{} words redacted>)", self.word_count.words())
    }
}

/// 64-byte BIP-39 seed. Never persisted; wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        crypto_utils::compare::ct_eq(&self.0, &other.0)
    }
}

impl Eq for Seed {}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

/// Generate a new recovery phrase from `entropy`.
///
/// Fails with [`WalletError::EntropySourceUnavailable`] if the source errors
/// or hands back all-zero bytes. There is no fallback to a weaker source.
pub fn generate_mnemonic(
    word_count: WordCount,
    entropy: &dyn EntropySource,
) -> Result<RecoveryPhrase, WalletError> {
    let mut buf = Zeroizing::new(vec![0u8; word_count.entropy_bytes()]);
    entropy.fill(&mut buf)?;

    if buf.iter().all(|&b| b == 0) {
        return Err(WalletError::EntropySourceUnavailable(
            "entropy source returned all-zero output".into(),
        ));
    }

    RecoveryPhrase::from_entropy(&buf)
}

/// Trim, collapse whitespace runs and lower-case user input.
pub fn normalize_phrase(input: &str) -> Zeroizing<String> {
    Zeroizing::new(
        input
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Validate a phrase: word count, wordlist membership and checksum.
pub fn check_mnemonic(input: &str) -> Result<RecoveryPhrase, WalletError> {
    let normalized = normalize_phrase(input);
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| WalletError::InvalidMnemonic(issue_from_bip39(e)))?;
    let word_count =
        WordCount::try_from(mnemonic.word_count()).map_err(WalletError::InvalidMnemonic)?;

    Ok(RecoveryPhrase {
        phrase: normalized.to_string(),
        word_count,
    })
}

/// `true` only if [`check_mnemonic`] accepts the phrase.
pub fn validate_mnemonic(input: &str) -> bool {
    check_mnemonic(input).is_ok()
}

/// Derive seed bytes from mnemonic + optional passphrase.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Seed, WalletError> {
    check_mnemonic(phrase)?.to_seed(passphrase)
}

/// The full 2048-word English list, for autocomplete.
pub fn word_list() -> &'static [&'static str] {
    Language::English.word_list()
}

/// Validate a single word against the BIP-39 word list.
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}

/// Up to `limit` wordlist entries starting with `prefix`.
pub fn suggest_words(prefix: &str, limit: usize) -> Vec<&'static str> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Vec::new();
    }
    word_list()
        .iter()
        .copied()
        .filter(|w| w.starts_with(&prefix))
        .take(limit)
        .collect()
}

fn issue_from_bip39(err: bip39::Error) -> MnemonicIssue {
    match err {
        bip39::Error::BadWordCount(n) => MnemonicIssue::WordCount(n),
        bip39::Error::UnknownWord(position) => MnemonicIssue::UnknownWord { position },
        bip39::Error::InvalidChecksum => MnemonicIssue::Checksum,
        other => MnemonicIssue::Other(other.to_string()),
    }
}
