//! Content fingerprint over a user's mutable attributes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of (email, city, segment).
///
/// Used for change detection only. Two users with the same attributes share a
/// fingerprint; the user id is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a user's attribute tuple.
///
/// Each field is length-prefixed before hashing, so no choice of field contents
/// can make two different tuples concatenate to the same byte stream.
pub fn fingerprint(email: &str, city: &str, segment: &str) -> Fingerprint {
    fn hash_var(hasher: &mut Sha256, data: &str) {
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(data.as_bytes());
    }

    let mut hasher = Sha256::new();
    hash_var(&mut hasher, email);
    hash_var(&mut hasher, city);
    hash_var(&mut hasher, segment);

    Fingerprint(hex::encode(hasher.finalize()))
}
