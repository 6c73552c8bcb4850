//! Mock implementations for testing.
//!
//! `MockTextBackend` is a mockall double of the real `TextProvider` trait.
//! The image doubles are scripted by hand: fallback-chain tests care about
//! call counts and orderings more than expectation matching.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::generation::providers::{
    ArtifactTier, GeneratedEntry, ImagePrompt, ImageProvider, ProviderError, ProviderResult,
    TextProvider, Translation, Verification,
};
use crate::core::playback::SpeechPlayback;
use crate::core::vocabulary::ProficiencyLevel;

// ============================================================================
// Text provider mock
// ============================================================================

mockall::mock! {
    pub TextBackend {}

    #[async_trait]
    impl TextProvider for TextBackend {
        fn id(&self) -> &str;

        async fn generate_batch(
            &self,
            topic: &str,
            level: ProficiencyLevel,
            count: usize,
            exclude: &[String],
        ) -> ProviderResult<Vec<GeneratedEntry>>;

        async fn translate(
            &self,
            term: &str,
            source_language: &str,
        ) -> ProviderResult<Translation>;

        #[mockall::concretize]
        async fn generate_example(
            &self,
            headword: &str,
            context: Option<&str>,
        ) -> ProviderResult<String>;

        async fn verify_answer(
            &self,
            expected_gloss: &str,
            learner_input: &str,
        ) -> ProviderResult<Verification>;
    }
}

/// A text backend that panics if any operation is called. For sessions
/// and orchestrator paths that must stay off the network.
pub fn untouchable_text() -> Arc<MockTextBackend> {
    let mut mock = MockTextBackend::new();
    mock.expect_id().return_const("untouchable".to_string());
    Arc::new(mock)
}

// ============================================================================
// Image provider doubles
// ============================================================================

/// Always succeeds with `img://{id}/{seed}`, counting calls.
pub struct StaticImageProvider {
    pub provider_id: &'static str,
    pub tier: ArtifactTier,
    pub calls: AtomicU32,
}

impl StaticImageProvider {
    pub fn new(provider_id: &'static str, tier: ArtifactTier) -> Self {
        Self {
            provider_id,
            tier,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for StaticImageProvider {
    fn id(&self) -> &str {
        self.provider_id
    }

    fn tier(&self) -> ArtifactTier {
        self.tier
    }

    async fn generate(&self, _prompt: &ImagePrompt, seed: u64) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("img://{}/{}", self.provider_id, seed))
    }
}

/// Always fails with the scripted error, counting calls.
pub struct FailingImageProvider {
    pub provider_id: &'static str,
    pub calls: AtomicU32,
    make_error: fn() -> ProviderError,
}

impl FailingImageProvider {
    pub fn rate_limited(provider_id: &'static str) -> Self {
        Self {
            provider_id,
            calls: AtomicU32::new(0),
            make_error: || ProviderError::RateLimited,
        }
    }

    pub fn unauthorized(provider_id: &'static str) -> Self {
        Self {
            provider_id,
            calls: AtomicU32::new(0),
            make_error: || ProviderError::Unauthorized,
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for FailingImageProvider {
    fn id(&self) -> &str {
        self.provider_id
    }

    fn tier(&self) -> ArtifactTier {
        ArtifactTier::Authenticated
    }

    async fn generate(&self, _prompt: &ImagePrompt, _seed: u64) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }
}

// ============================================================================
// Playback double
// ============================================================================

/// Records everything spoken.
#[derive(Default)]
pub struct RecordingPlayback {
    pub spoken: Mutex<Vec<String>>,
}

impl RecordingPlayback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SpeechPlayback for RecordingPlayback {
    fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}
