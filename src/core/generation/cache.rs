//! Illustration artifact cache.
//!
//! Keyed by prompt fingerprint. Each entry carries the tier it was
//! produced under as a structured field; the hit policy compares that
//! tier against the current configuration so a learner who unlocks an
//! authenticated tier is never silently served older anonymous results.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::providers::ArtifactTier;

/// A cached illustration artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Prompt fingerprint key.
    pub key: String,
    /// Artifact reference (URL or inline payload).
    pub artifact: String,
    /// Tier the artifact was produced under.
    pub tier: ArtifactTier,
    /// When this entry was created.
    pub created_at: DateTime<Utc>,
    /// When this entry was last served.
    pub last_accessed: DateTime<Utc>,
    /// Number of times this entry has been served.
    pub access_count: u32,
}

/// Cache counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: usize,
}

/// In-memory artifact cache, shared by all sessions in the process.
///
/// Content-keyed, so concurrent sessions share hits safely.
#[derive(Default)]
pub struct ImageCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an artifact under the tier policy.
    ///
    /// Without a configured credential any cached entry serves. With one,
    /// only authenticated-tier entries serve; anonymous entries are stale
    /// and the caller regenerates.
    pub fn lookup(&self, key: &str, credential_configured: bool) -> Option<String> {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let hit = match entries.get_mut(key) {
            Some(entry) if !credential_configured || entry.tier == ArtifactTier::Authenticated => {
                entry.last_accessed = Utc::now();
                entry.access_count = entry.access_count.saturating_add(1);
                Some(entry.artifact.clone())
            }
            _ => None,
        };

        let mut stats = self.stats.write().expect("cache lock poisoned");
        if hit.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }

        hit
    }

    /// Insert or replace an entry. Always performed after a completed
    /// generation, even when the requesting session has already moved on.
    pub fn insert(&self, key: &str, artifact: &str, tier: ArtifactTier) {
        let now = Utc::now();
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                artifact: artifact.to_string(),
                tier,
                created_at: now,
                last_accessed: now,
                access_count: 0,
            },
        );
        self.stats.write().expect("cache lock poisoned").entry_count = entries.len();
    }

    /// Tier of the entry under `key`, if present.
    pub fn tier_of(&self, key: &str) -> Option<ArtifactTier> {
        self.entries
            .read()
            .expect("cache lock poisoned")
            .get(key)
            .map(|e| e.tier)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().expect("cache lock poisoned").clone()
    }
}
