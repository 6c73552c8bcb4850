//! Persistence collaborator for the vocabulary trainer.
//!
//! The core treats storage as synchronous, always-available, last-write-wins
//! key-value operations. Loads never fail: a missing or unreadable file is
//! an empty collection or a default shape (missing fields are defaulted by
//! serde, no migration or further validation is performed). Save failures
//! surface as `CoreError::Io`.

use std::path::PathBuf;

use crate::config::AppConfig;

use super::error::Result;
use super::stats::LearnerStats;
use super::vocabulary::VocabularyItem;

/// The persistence contract the core depends on.
pub trait VocabularyStore: Send + Sync {
    fn load(&self) -> Vec<VocabularyItem>;
    fn save(&self, items: &[VocabularyItem]) -> Result<()>;
    fn load_settings(&self) -> AppConfig;
    fn save_settings(&self, config: &AppConfig) -> Result<()>;
    fn load_stats(&self) -> LearnerStats;
    fn save_stats(&self, stats: &LearnerStats) -> Result<()>;
}

/// JSON-file storage under a data directory.
///
/// `items.json` and `stats.json` live in the data dir; settings go through
/// `AppConfig`'s own TOML location so external tools and the settings form
/// share one file.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Store rooted at the configured data directory.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.data_dir())
    }

    fn items_path(&self) -> PathBuf {
        self.data_dir.join("items.json")
    }

    fn stats_path(&self) -> PathBuf {
        self.data_dir.join("stats.json")
    }

    fn read_json<T: serde::de::DeserializeOwned + Default>(&self, path: &PathBuf) -> T {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e} — using default", path.display());
                    T::default()
                }
            },
            Err(_) => T::default(),
        }
    }

    fn write_json<T: serde::Serialize>(&self, path: &PathBuf, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl VocabularyStore for JsonFileStore {
    fn load(&self) -> Vec<VocabularyItem> {
        self.read_json(&self.items_path())
    }

    fn save(&self, items: &[VocabularyItem]) -> Result<()> {
        self.write_json(&self.items_path(), &items)
    }

    fn load_settings(&self) -> AppConfig {
        AppConfig::load()
    }

    fn save_settings(&self, config: &AppConfig) -> Result<()> {
        config.save()?;
        Ok(())
    }

    fn load_stats(&self) -> LearnerStats {
        self.read_json(&self.stats_path())
    }

    fn save_stats(&self, stats: &LearnerStats) -> Result<()> {
        self.write_json(&self.stats_path(), stats)
    }
}
