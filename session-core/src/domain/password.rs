//! Salted password digests.
//!
//! Passwords are never persisted. A record keeps the random salt, the
//! PBKDF2-HMAC-SHA256 iteration count and the derived key, all hex encoded.
//! Stored digests are validated when they are read back, so a damaged record
//! fails to load instead of silently never matching.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Derived key length in bytes.
pub const HASH_LEN: usize = 32;
/// PBKDF2 iterations applied to new digests.
pub const DEFAULT_ROUNDS: u32 = 10_000;
/// Largest iteration count accepted from storage.
pub const MAX_ROUNDS: u32 = 1_000_000;

/// Reasons a stored digest is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordDigestError {
    #[error("salt must be 16 hex-encoded bytes")]
    InvalidSalt,
    #[error("hash must be 32 hex-encoded bytes")]
    InvalidHash,
    #[error("rounds must be between 1 and {max}, got {rounds}")]
    RoundsOutOfRange { rounds: u32, max: u32 },
}

/// Stored password credential.
///
/// ## Invariants
/// - `salt` is [`SALT_LEN`] bytes and `hash` is [`HASH_LEN`] bytes.
/// - `rounds` lies in `1..=MAX_ROUNDS`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredDigest", into = "StoredDigest")]
pub struct PasswordDigest {
    salt: [u8; SALT_LEN],
    rounds: u32,
    hash: [u8; HASH_LEN],
}

/// On-disk form of [`PasswordDigest`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StoredDigest {
    salt: String,
    rounds: u32,
    hash: String,
}

impl PasswordDigest {
    /// Digest `password` with a fresh random salt.
    pub fn derive(password: &str) -> Self {
        let salt: [u8; SALT_LEN] = rand::random();
        Self::derive_with_salt(password, &salt, DEFAULT_ROUNDS)
    }

    /// Digest `password` with an explicit salt and iteration count. The count
    /// is clamped into `1..=MAX_ROUNDS`.
    pub fn derive_with_salt(password: &str, salt: &[u8; SALT_LEN], rounds: u32) -> Self {
        let rounds = rounds.clamp(1, MAX_ROUNDS);
        let key = derive_key(password, salt, rounds);
        Self {
            salt: *salt,
            rounds,
            hash: *key,
        }
    }

    /// Iteration count used for this digest.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Check a candidate password. Comparison time does not depend on where
    /// the keys first differ.
    ///
    /// This is CPU bound; async callers run it on the blocking pool.
    pub fn verify(&self, candidate: &str) -> bool {
        let actual = derive_key(candidate, &self.salt, self.rounds);
        actual.as_slice().ct_eq(self.hash.as_slice()).into()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordDigest")
            .field("rounds", &self.rounds)
            .finish_non_exhaustive()
    }
}

impl TryFrom<StoredDigest> for PasswordDigest {
    type Error = PasswordDigestError;

    fn try_from(value: StoredDigest) -> Result<Self, Self::Error> {
        let mut salt = [0_u8; SALT_LEN];
        hex::decode_to_slice(&value.salt, &mut salt)
            .map_err(|_| PasswordDigestError::InvalidSalt)?;
        let mut hash = [0_u8; HASH_LEN];
        hex::decode_to_slice(&value.hash, &mut hash)
            .map_err(|_| PasswordDigestError::InvalidHash)?;
        if !(1..=MAX_ROUNDS).contains(&value.rounds) {
            return Err(PasswordDigestError::RoundsOutOfRange {
                rounds: value.rounds,
                max: MAX_ROUNDS,
            });
        }
        Ok(Self {
            salt,
            rounds: value.rounds,
            hash,
        })
    }
}

impl From<PasswordDigest> for StoredDigest {
    fn from(value: PasswordDigest) -> Self {
        Self {
            salt: hex::encode(value.salt),
            rounds: value.rounds,
            hash: hex::encode(value.hash),
        }
    }
}

fn derive_key(password: &str, salt: &[u8], rounds: u32) -> Zeroizing<[u8; HASH_LEN]> {
    let mut key = Zeroizing::new([0_u8; HASH_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, key.as_mut_slice());
    key
}
