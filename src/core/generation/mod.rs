//! Content generation orchestration.
//!
//! Resolves the configured provider adapters, and layers the policies the
//! adapters themselves stay free of: request spacing and serialization for
//! images, tiered caching with deterministic fingerprints, the fallback
//! chain ending in the infallible terminal provider, and the mapping of
//! verification failures to the explicit `Unavailable` sentinel.
//!
//! Text tasks carry none of that machinery: no queue, no cache, no
//! cross-provider fallback. They are short, infrequent, user-triggered
//! calls whose failures surface to the caller as hard errors.

pub mod cache;
pub mod fingerprint;
pub mod providers;
pub mod queue;

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::config::AppConfig;

use self::cache::ImageCache;
use self::fingerprint::Fingerprint;
use self::providers::{
    create_text_provider, image_candidates, ImagePrompt, ImageProvider, PollinationsProvider,
    ProviderError, TextProvider, Translation, Verification,
};
use self::queue::RequestQueue;
use super::error::{CoreError, Result};
use super::vocabulary::{ProficiencyLevel, VocabularyItem};

/// Orchestrates all content generation against the configured backends.
pub struct GenerationOrchestrator {
    text: Arc<dyn TextProvider>,
    image_candidates: Vec<Arc<dyn ImageProvider>>,
    /// Terminal fallback. Held concretely so the chain can end in a call
    /// that cannot fail.
    terminal: Arc<PollinationsProvider>,
    cache: Arc<ImageCache>,
    queue: Arc<RequestQueue>,
    credential_configured: bool,
    image_style: String,
    source_language: String,
}

impl GenerationOrchestrator {
    /// Build from configuration. Must be called within a tokio runtime
    /// (the queue spawns its worker).
    pub fn from_config(config: &AppConfig, queue: Arc<RequestQueue>) -> Self {
        Self::new(
            create_text_provider(&config.providers.text, &config.review.target_language),
            image_candidates(&config.providers.image),
            queue,
            config.providers.image.has_credential(),
            config.generation.image_style.clone(),
            config.review.source_language.clone(),
        )
    }

    /// Assemble from parts. Used by `from_config` and by tests that
    /// inject scripted providers.
    pub fn new(
        text: Arc<dyn TextProvider>,
        image_candidates: Vec<Arc<dyn ImageProvider>>,
        queue: Arc<RequestQueue>,
        credential_configured: bool,
        image_style: String,
        source_language: String,
    ) -> Self {
        Self {
            text,
            image_candidates,
            terminal: Arc::new(PollinationsProvider::keyless()),
            cache: Arc::new(ImageCache::new()),
            queue,
            credential_configured,
            image_style,
            source_language,
        }
    }

    /// Share an existing cache, e.g. across a provider reconfiguration so
    /// earlier artifacts stay available under the tier policy.
    pub fn with_cache(mut self, cache: Arc<ImageCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Handle to the cache for sharing with a rebuilt orchestrator.
    pub fn cache_handle(&self) -> Arc<ImageCache> {
        self.cache.clone()
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Produce an illustration for a headword. Guaranteed to return an
    /// artifact reference; provider failures degrade through the chain
    /// and are never surfaced.
    ///
    /// Non-forced requests serve from the cache under the tier policy and
    /// use the fingerprint-derived seed so identical prompts reproduce
    /// identical artifacts. Forced regeneration skips the cache read and
    /// rolls a fresh random seed.
    pub async fn illustration(&self, headword: &str, context: &str, force: bool) -> String {
        let prompt = ImagePrompt {
            headword: headword.to_string(),
            context: context.to_string(),
            style: self.image_style.clone(),
        };
        let fp = Fingerprint::of(&prompt);

        if !force {
            if let Some(artifact) = self.cache.lookup(&fp.key, self.credential_configured) {
                tracing::debug!(key = %fp.key, "illustration cache hit");
                return artifact;
            }
        }

        let seed = if force {
            rand::thread_rng().gen()
        } else {
            fp.seed
        };

        let candidates = self.image_candidates.clone();
        let terminal = self.terminal.clone();
        let cache = self.cache.clone();
        let key = fp.key.clone();
        let task_prompt = prompt.clone();

        let generated = self
            .queue
            .submit(async move {
                for provider in &candidates {
                    match provider.generate(&task_prompt, seed).await {
                        Ok(artifact) => {
                            cache.insert(&key, &artifact, provider.tier());
                            return artifact;
                        }
                        Err(e) => {
                            // Rate-limit, auth, transport: all identical here.
                            // Never retried on the same adapter in this request.
                            tracing::warn!(
                                provider = provider.id(),
                                error = %e,
                                "image provider failed, falling through"
                            );
                        }
                    }
                }
                let artifact = terminal.compose_url(&task_prompt, seed);
                cache.insert(&key, &artifact, terminal.tier());
                artifact
            })
            .await;

        match generated {
            Some(artifact) => artifact,
            // Queue worker gone (runtime shutdown): degrade to the
            // terminal provider directly.
            None => self.terminal.compose_url(&prompt, seed),
        }
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Generate a batch of new vocabulary items. Entries whose headword is
    /// already in `existing_headwords` are dropped from the result.
    pub async fn generate_batch(
        &self,
        topic: &str,
        level: ProficiencyLevel,
        count: usize,
        existing_headwords: &[String],
    ) -> Result<Vec<VocabularyItem>> {
        let entries = self
            .text
            .generate_batch(topic, level, count, existing_headwords)
            .await
            .map_err(map_text_error)?;

        let known: std::collections::HashSet<String> = existing_headwords
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let now = Utc::now();
        let items: Vec<VocabularyItem> = entries
            .into_iter()
            .filter(|e| !known.contains(&e.headword.trim().to_lowercase()))
            .map(|e| {
                VocabularyItem::new_generated(e.gloss, e.headword, topic, level, e.example, now)
            })
            .collect();

        tracing::info!(topic, count = items.len(), "generated vocabulary batch");
        Ok(items)
    }

    /// Translate a single term from the configured source language.
    pub async fn translate(&self, term: &str) -> Result<Translation> {
        self.text
            .translate(term, &self.source_language)
            .await
            .map_err(map_text_error)
    }

    /// Generate one example sentence for a headword.
    pub async fn example_sentence(
        &self,
        headword: &str,
        context: Option<&str>,
    ) -> Result<String> {
        self.text
            .generate_example(headword, context)
            .await
            .map_err(map_text_error)
    }

    /// Judge a learner's answer. Adapter failure becomes the explicit
    /// `Unavailable` sentinel, never "answer wrong"; the caller applies
    /// its own policy.
    pub async fn verify_answer(&self, expected_gloss: &str, learner_input: &str) -> Verification {
        match self.text.verify_answer(expected_gloss, learner_input).await {
            Ok(verification) => verification,
            Err(e) => {
                tracing::warn!(error = %e, "answer verification unavailable");
                Verification::Unavailable
            }
        }
    }
}

/// Text-task failures are hard errors; misconfiguration keeps its own
/// variant so the message can point the learner at settings.
fn map_text_error(error: ProviderError) -> CoreError {
    match error {
        ProviderError::Misconfigured(msg) => CoreError::Misconfigured(msg),
        other => CoreError::GenerationFailed(other.to_string()),
    }
}
