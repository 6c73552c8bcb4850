//! Content provider adapters.
//!
//! This module contains the capability traits (`TextProvider`,
//! `ImageProvider`), the shared provider error/result types, the canonical
//! provider metadata table, and the configuration-driven factory functions.
//!
//! Adding a new backend requires:
//! 1. A new variant in the config enum (`TextBackendConfig` / `ImageBackendConfig`)
//! 2. A new entry in `PROVIDERS`
//! 3. The adapter implementation file

mod google;
mod openai;
mod openai_image;
mod pollinations;

pub use google::GoogleTextProvider;
pub use openai::OpenAiTextProvider;
pub use openai_image::OpenAiImageProvider;
pub use pollinations::PollinationsProvider;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ImageBackendConfig, TextBackendConfig};
use crate::core::vocabulary::ProficiencyLevel;

// ============================================================================
// Errors
// ============================================================================

/// Error raised by a provider adapter.
///
/// The classified variants exist so callers can report precisely, but the
/// image fallback chain treats every variant identically: any failure falls
/// through to the next candidate, and a failing adapter is never retried
/// within the same request.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Rate limit or quota exceeded (HTTP 429).
    #[error("Rate limited by provider")]
    RateLimited,

    /// Credential rejected (HTTP 401/403).
    #[error("Unauthorized: provider rejected the credential")]
    Unauthorized,

    /// Missing or obviously invalid configuration, detected before any
    /// network call.
    #[error("Provider not configured: {0}")]
    Misconfigured(String),

    /// Any other non-success status from the backend.
    #[error("Provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered, but not with the structured shape we require.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            429 => ProviderError::RateLimited,
            401 | 403 => ProviderError::Unauthorized,
            _ => ProviderError::Api { status, message },
        }
    }
}

/// Result type alias for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// ============================================================================
// Structured results
// ============================================================================

/// One entry from batch vocabulary generation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GeneratedEntry {
    pub headword: String,
    pub gloss: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Result of translating a single term.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Translation {
    pub translation: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Result of answer verification.
///
/// `Unavailable` is an explicit sentinel: the backend could not judge the
/// answer. It must never be collapsed into "answer wrong" here; the
/// session layer owns that policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Judged { correct: bool, feedback: Option<String> },
    Unavailable,
}

/// The tier an image artifact was produced under. Recorded on cache
/// entries as a structured field, never encoded into the artifact
/// reference itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactTier {
    /// Produced without any credential (keyless tier).
    Anonymous,
    /// Produced under a configured credential.
    Authenticated,
}

/// An illustration request: the headword plus disambiguating context and
/// the configured style fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePrompt {
    pub headword: String,
    pub context: String,
    pub style: String,
}

impl ImagePrompt {
    /// The full prompt text sent to image backends.
    pub fn text(&self) -> String {
        format!("{} ({}), {}", self.headword, self.context, self.style)
    }
}

// ============================================================================
// Capability traits
// ============================================================================

/// A backend capable of the four text tasks.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider ID for logging and error reporting.
    fn id(&self) -> &str;

    /// Generate `count` vocabulary entries for a topic and level, avoiding
    /// the headwords in `exclude`.
    async fn generate_batch(
        &self,
        topic: &str,
        level: ProficiencyLevel,
        count: usize,
        exclude: &[String],
    ) -> ProviderResult<Vec<GeneratedEntry>>;

    /// Translate a single term out of the given source language.
    async fn translate(&self, term: &str, source_language: &str) -> ProviderResult<Translation>;

    /// Generate one example sentence for a headword.
    async fn generate_example(
        &self,
        headword: &str,
        context: Option<&str>,
    ) -> ProviderResult<String>;

    /// Judge whether the learner's input expresses the expected gloss.
    async fn verify_answer(
        &self,
        expected_gloss: &str,
        learner_input: &str,
    ) -> ProviderResult<Verification>;
}

/// A backend capable of generating one image for a prompt.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider ID for logging.
    fn id(&self) -> &str;

    /// The tier results from this adapter are produced under.
    fn tier(&self) -> ArtifactTier;

    /// Generate an image, returning an artifact reference (URL or inline
    /// payload). Fails with a classifiable `ProviderError`.
    async fn generate(&self, prompt: &ImagePrompt, seed: u64) -> ProviderResult<String>;
}

// ============================================================================
// Provider metadata
// ============================================================================

/// What a provider can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Text,
    Image,
}

/// Static metadata for a known provider (display name, capability,
/// credential requirements). Consumed by the settings layer.
#[derive(Clone, Debug)]
pub struct ProviderMeta {
    pub id: &'static str,
    pub display_name: &'static str,
    pub capability: Capability,
    pub needs_api_key: bool,
    pub default_model: &'static str,
}

/// Canonical table of all known providers. Single source of truth.
pub const PROVIDERS: &[ProviderMeta] = &[
    ProviderMeta {
        id: "openai",
        display_name: "OpenAI",
        capability: Capability::Text,
        needs_api_key: true,
        default_model: "gpt-4o-mini",
    },
    ProviderMeta {
        id: "google",
        display_name: "Google AI",
        capability: Capability::Text,
        needs_api_key: true,
        default_model: "gemini-2.0-flash",
    },
    ProviderMeta {
        id: "openai-image",
        display_name: "OpenAI Images",
        capability: Capability::Image,
        needs_api_key: true,
        default_model: "dall-e-3",
    },
    ProviderMeta {
        id: "pollinations",
        display_name: "Pollinations",
        capability: Capability::Image,
        needs_api_key: false,
        default_model: "",
    },
];

/// Look up a provider's metadata by ID.
pub fn find_provider_meta(id: &str) -> Option<&'static ProviderMeta> {
    PROVIDERS.iter().find(|p| p.id == id)
}

// ============================================================================
// Factory
// ============================================================================

/// Build the configured text provider for the given target language.
pub fn create_text_provider(
    config: &TextBackendConfig,
    target_language: &str,
) -> Arc<dyn TextProvider> {
    match config {
        TextBackendConfig::OpenAi { api_key, model } => Arc::new(OpenAiTextProvider::new(
            api_key.clone(),
            model.clone(),
            target_language.to_string(),
        )),
        TextBackendConfig::Google { api_key, model } => Arc::new(GoogleTextProvider::new(
            api_key.clone(),
            model.clone(),
            target_language.to_string(),
        )),
    }
}

/// Build the ordered image candidate list for the configured backend.
///
/// The returned list never contains the terminal keyless provider; the
/// orchestrator holds that separately so the chain ends in a call that
/// cannot fail. A keyless Pollinations configuration yields an empty
/// candidate list (the terminal provider already covers it).
pub fn image_candidates(config: &ImageBackendConfig) -> Vec<Arc<dyn ImageProvider>> {
    match config {
        ImageBackendConfig::OpenAi { api_key, model } => {
            vec![Arc::new(OpenAiImageProvider::new(
                api_key.clone(),
                model.clone(),
            ))]
        }
        ImageBackendConfig::Pollinations { token: Some(token) } if !token.trim().is_empty() => {
            vec![Arc::new(PollinationsProvider::authenticated(token.clone()))]
        }
        ImageBackendConfig::Pollinations { .. } => Vec::new(),
    }
}

// ============================================================================
// Shared response parsing
// ============================================================================

/// Strip a markdown code fence if the model wrapped its JSON in one, then
/// deserialize into the expected payload shape.
pub(crate) fn parse_json_payload<T: serde::de::DeserializeOwned>(
    raw: &str,
) -> ProviderResult<T> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("malformed JSON payload: {e}")))
}

/// Payload shape for batch generation.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchPayload {
    pub entries: Vec<GeneratedEntry>,
}

/// Payload shape for single-term translation.
#[derive(Debug, Deserialize)]
pub(crate) struct TranslationPayload {
    pub translation: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Payload shape for example sentence generation.
#[derive(Debug, Deserialize)]
pub(crate) struct ExamplePayload {
    pub sentence: String,
}

/// Payload shape for answer verification.
#[derive(Debug, Deserialize)]
pub(crate) struct VerifyPayload {
    pub correct: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

// ============================================================================
// Shared task prompts
// ============================================================================

/// Instruction text for the four text tasks. The wire format around these
/// is adapter-specific; the task wording is not.
pub(crate) mod prompts {
    use crate::core::vocabulary::ProficiencyLevel;

    pub fn batch(
        topic: &str,
        level: ProficiencyLevel,
        count: usize,
        exclude: &[String],
        target_language: &str,
    ) -> String {
        let mut prompt = format!(
            "You are a vocabulary tutor. Generate {count} vocabulary entries in {target_language} \
             for a learner at CEFR level {level}, on the topic \"{topic}\". \
             For each entry give the {target_language} headword, a short English gloss, and one \
             simple example sentence in {target_language}. \
             Respond with JSON only, in the shape \
             {{\"entries\": [{{\"headword\": \"...\", \"gloss\": \"...\", \"example\": \"...\"}}]}}."
        );
        if !exclude.is_empty() {
            prompt.push_str(&format!(
                " Do not use any of these headwords: {}.",
                exclude.join(", ")
            ));
        }
        prompt
    }

    pub fn translate(term: &str, source_language: &str, target_language: &str) -> String {
        format!(
            "Translate the term \"{term}\" from {source_language} into {target_language}. \
             Respond with JSON only: \
             {{\"translation\": \"...\", \"example\": \"one simple {target_language} sentence using the translation\"}}."
        )
    }

    pub fn example(headword: &str, context: Option<&str>, target_language: &str) -> String {
        let context_clause = context
            .map(|c| format!(" The word means \"{c}\"."))
            .unwrap_or_default();
        format!(
            "Write one short, simple example sentence in {target_language} using the word \
             \"{headword}\".{context_clause} \
             Respond with JSON only: {{\"sentence\": \"...\"}}."
        )
    }

    pub fn verify(expected_gloss: &str, learner_input: &str) -> String {
        format!(
            "A language learner was asked for the word meaning \"{expected_gloss}\" and answered \
             \"{learner_input}\". Judge whether the answer is an acceptable match, tolerating \
             minor spelling slips and missing accents. \
             Respond with JSON only: {{\"correct\": true or false, \"feedback\": \"one short sentence\"}}."
        )
    }
}

/// Validate a batch payload: every entry must carry a non-blank headword
/// and gloss.
pub(crate) fn validate_batch(payload: BatchPayload) -> ProviderResult<Vec<GeneratedEntry>> {
    if payload.entries.is_empty() {
        return Err(ProviderError::InvalidResponse(
            "batch response contained no entries".to_string(),
        ));
    }
    for entry in &payload.entries {
        if entry.headword.trim().is_empty() || entry.gloss.trim().is_empty() {
            return Err(ProviderError::InvalidResponse(
                "batch entry with blank headword or gloss".to_string(),
            ));
        }
    }
    Ok(payload.entries)
}
