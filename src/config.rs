use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
///
/// Owned by the settings layer; the core reads it but never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub providers: ProviderSettings,
    pub review: ReviewSettings,
    pub generation: GenerationSettings,
    pub data: DataConfig,
}

/// Which backend handles text tasks and which handles images, plus
/// credentials. Selecting a variant here is the single place backend
/// identity is decided; everything downstream dispatches through traits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub text: TextBackendConfig,
    pub image: ImageBackendConfig,
}

/// Configuration for the text generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum TextBackendConfig {
    OpenAi { api_key: String, model: String },
    Google { api_key: String, model: String },
}

/// Configuration for the image generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ImageBackendConfig {
    OpenAi {
        api_key: String,
        model: String,
    },
    Pollinations {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
}

/// Review session preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Maximum number of items selected into one session.
    pub session_limit: usize,
    /// Source language code used for single-term translation.
    pub source_language: String,
    /// Target language being learned.
    pub target_language: String,
}

/// Content generation preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Minimum spacing between image requests, in seconds.
    pub image_spacing_secs: u64,
    /// Style fragment appended to every illustration prompt.
    pub image_style: String,
}

/// Data directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: ProviderSettings::default(),
            review: ReviewSettings::default(),
            generation: GenerationSettings::default(),
            data: DataConfig::default(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            text: TextBackendConfig::default(),
            image: ImageBackendConfig::default(),
        }
    }
}

impl Default for TextBackendConfig {
    fn default() -> Self {
        TextBackendConfig::OpenAi {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Default for ImageBackendConfig {
    fn default() -> Self {
        // Keyless tier works out of the box.
        ImageBackendConfig::Pollinations { token: None }
    }
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            session_limit: 10,
            source_language: "en".to_string(),
            target_language: "es".to_string(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            image_spacing_secs: 5,
            image_style: "simple watercolor illustration, no text".to_string(),
        }
    }
}

impl TextBackendConfig {
    /// The credential carried by this variant.
    pub fn api_key(&self) -> &str {
        match self {
            TextBackendConfig::OpenAi { api_key, .. }
            | TextBackendConfig::Google { api_key, .. } => api_key,
        }
    }
}

impl ImageBackendConfig {
    /// Whether an authenticated credential is configured for images.
    ///
    /// Drives the cache tier policy: once this is true, anonymous-tier
    /// cache entries are treated as stale.
    pub fn has_credential(&self) -> bool {
        match self {
            ImageBackendConfig::OpenAi { api_key, .. } => !api_key.trim().is_empty(),
            ImageBackendConfig::Pollinations { token } => {
                token.as_deref().is_some_and(|t| !t.trim().is_empty())
            }
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/lexitrain/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} — using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {} — using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Persist configuration to the config path (last write wins).
    pub fn save(&self) -> std::io::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&config_path, contents)
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("lexitrain"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("lexitrain").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
