//! Deterministic prompt fingerprints.
//!
//! A fingerprint is the cache key for an illustration prompt and the
//! source of the reproducible generation seed: identical prompts hash to
//! identical keys and identical seeds, so non-forced generations of the
//! same prompt reproduce the same artifact and benefit from downstream
//! caching.

use sha2::{Digest, Sha256};

use super::providers::ImagePrompt;

/// Fingerprint of one illustration prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Filename-safe hex cache key.
    pub key: String,
    /// Seed derived from the same digest, for reproducible generation.
    pub seed: u64,
}

impl Fingerprint {
    /// Compute the fingerprint of a prompt.
    pub fn of(prompt: &ImagePrompt) -> Self {
        let mut hasher = Sha256::new();

        // Hash normalized components in a fixed order, separated so that
        // component boundaries cannot collide.
        hasher.update(normalize(&prompt.headword).as_bytes());
        hasher.update(b"|");
        hasher.update(normalize(&prompt.context).as_bytes());
        hasher.update(b"|");
        hasher.update(normalize(&prompt.style).as_bytes());

        let digest = hasher.finalize();

        // First 16 bytes (32 hex chars) are plenty for a cache key; the
        // first 8 bytes double as the deterministic seed.
        let key = hex::encode(&digest[..16]);
        let seed = u64::from_le_bytes(
            digest[..8].try_into().expect("digest is at least 8 bytes"),
        );

        Self { key, seed }
    }
}

/// Lowercase, trim, and collapse internal whitespace runs to one space.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
