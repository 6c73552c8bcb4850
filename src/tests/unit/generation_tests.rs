//! Orchestrator behavior: cache policy, fallback chain, text task error
//! mapping, and the verification sentinel.

use std::sync::Arc;
use std::time::Duration;

use crate::core::error::CoreError;
use crate::core::generation::providers::{
    ArtifactTier, GeneratedEntry, ImageProvider, ProviderError, TextProvider, Translation,
    Verification,
};
use crate::core::generation::queue::RequestQueue;
use crate::core::generation::GenerationOrchestrator;
use crate::core::vocabulary::{ItemOrigin, LearningStatus, ProficiencyLevel};
use crate::tests::mocks::{
    untouchable_text, FailingImageProvider, MockTextBackend, StaticImageProvider,
};

fn orchestrator(
    text: Arc<dyn TextProvider>,
    candidates: Vec<Arc<dyn ImageProvider>>,
    credential_configured: bool,
) -> GenerationOrchestrator {
    let queue = Arc::new(RequestQueue::new(Duration::from_millis(10)));
    GenerationOrchestrator::new(
        text,
        candidates,
        queue,
        credential_configured,
        "watercolor".to_string(),
        "en".to_string(),
    )
}

// ============================================================================
// Image pipeline
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_identical_prompts_reuse_the_cached_artifact() {
    let orch = orchestrator(untouchable_text(), Vec::new(), false);

    let first = orch.illustration("perro", "dog", false).await;
    let second = orch.illustration("perro", "dog", false).await;

    assert_eq!(first, second);
    let stats = orch.cache().stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entry_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_normalized_prompt_variants_share_one_entry() {
    let orch = orchestrator(untouchable_text(), Vec::new(), false);

    let first = orch.illustration("Perro", "  dog ", false).await;
    let second = orch.illustration("perro", "dog", false).await;

    assert_eq!(first, second);
    assert_eq!(orch.cache().stats().entry_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_runs_each_candidate_once_then_terminal() {
    let first = Arc::new(FailingImageProvider::rate_limited("primary"));
    let second = Arc::new(FailingImageProvider::unauthorized("secondary"));
    let orch = orchestrator(
        untouchable_text(),
        vec![first.clone(), second.clone()],
        true,
    );

    let artifact = orch.illustration("perro", "dog", false).await;

    // Both candidates tried exactly once. Rate-limit and auth failures
    // are treated like any other failure, never retried.
    assert_eq!(first.call_count(), 1);
    assert_eq!(second.call_count(), 1);
    // The terminal provider produced the artifact and never fails.
    assert!(artifact.contains("image.pollinations.ai"));
}

#[tokio::test(start_paused = true)]
async fn test_tier_upgrade_forces_exactly_one_regeneration() {
    // Anonymous-tier artifact cached first (keyless configuration).
    let keyless = orchestrator(untouchable_text(), Vec::new(), false);
    let anon_artifact = keyless.illustration("perro", "dog", false).await;

    // Learner configures a credential; same cache, authenticated chain.
    let auth_provider = Arc::new(StaticImageProvider::new(
        "paid-backend",
        ArtifactTier::Authenticated,
    ));
    let queue = Arc::new(RequestQueue::new(Duration::from_millis(10)));
    let upgraded = GenerationOrchestrator::new(
        untouchable_text(),
        vec![auth_provider.clone()],
        queue,
        true,
        "watercolor".to_string(),
        "en".to_string(),
    )
    .with_cache(keyless.cache_handle());

    let first = upgraded.illustration("perro", "dog", false).await;
    assert_ne!(first, anon_artifact);
    assert_eq!(auth_provider.call_count(), 1);

    // Second request now hits the authenticated entry, no regeneration.
    let second = upgraded.illustration("perro", "dog", false).await;
    assert_eq!(first, second);
    assert_eq!(auth_provider.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_forced_regeneration_bypasses_cache_read() {
    let provider = Arc::new(StaticImageProvider::new("gen", ArtifactTier::Authenticated));
    let orch = orchestrator(untouchable_text(), vec![provider.clone()], true);

    let _ = orch.illustration("perro", "dog", false).await;
    assert_eq!(provider.call_count(), 1);

    // A cached entry exists, but force skips the read and regenerates.
    let _ = orch.illustration("perro", "dog", true).await;
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_non_forced_generation_uses_deterministic_seed() {
    // Two fresh orchestrators with separate caches: the artifact embeds
    // the seed, so equal outputs mean equal fingerprint-derived seeds.
    let provider_a = Arc::new(StaticImageProvider::new("gen", ArtifactTier::Authenticated));
    let orch_a = orchestrator(untouchable_text(), vec![provider_a.clone()], true);
    let provider_b = Arc::new(StaticImageProvider::new("gen", ArtifactTier::Authenticated));
    let orch_b = orchestrator(untouchable_text(), vec![provider_b.clone()], true);

    let a = orch_a.illustration("perro", "dog", false).await;
    let b = orch_b.illustration("perro", "dog", false).await;
    assert_eq!(a, b);
}

// ============================================================================
// Text tasks
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_generate_batch_builds_new_items_and_drops_duplicates() {
    let mut text = MockTextBackend::new();
    text.expect_generate_batch().returning(|_, _, _, _| {
        Ok(vec![
            GeneratedEntry {
                headword: "casa".to_string(),
                gloss: "house".to_string(),
                example: Some("La casa es azul.".to_string()),
            },
            GeneratedEntry {
                headword: "Perro".to_string(),
                gloss: "dog".to_string(),
                example: None,
            },
        ])
    });

    let orch = orchestrator(Arc::new(text), Vec::new(), false);
    let existing = vec!["PERRO".to_string()];
    let items = orch
        .generate_batch("home", ProficiencyLevel::A2, 2, &existing)
        .await
        .unwrap();

    // "Perro" collides with the existing collection and is dropped.
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.headword, "casa");
    assert_eq!(item.category, "home");
    assert_eq!(item.origin, ItemOrigin::Generated);
    assert_eq!(item.status, LearningStatus::New);
    assert_eq!(item.attempt_count, 0);
    assert_eq!(item.correct_streak, 0);
}

#[tokio::test(start_paused = true)]
async fn test_text_failures_are_hard_errors() {
    let mut text = MockTextBackend::new();
    text.expect_translate().returning(|_, _| {
        Err(ProviderError::Api {
            status: 500,
            message: "upstream".to_string(),
        })
    });

    let orch = orchestrator(Arc::new(text), Vec::new(), false);
    let result = orch.translate("bread").await;
    assert!(matches!(result, Err(CoreError::GenerationFailed(_))));
}

#[tokio::test(start_paused = true)]
async fn test_misconfiguration_keeps_its_own_error() {
    let mut text = MockTextBackend::new();
    text.expect_generate_example().returning(|_, _| {
        Err(ProviderError::Misconfigured(
            "OpenAI API key is empty — add one under provider settings".to_string(),
        ))
    });

    let orch = orchestrator(Arc::new(text), Vec::new(), false);
    let result = orch.example_sentence("pan", Some("bread")).await;
    match result {
        Err(CoreError::Misconfigured(msg)) => assert!(msg.contains("provider settings")),
        other => panic!("expected Misconfigured, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_translate_passes_source_language_through() {
    let mut text = MockTextBackend::new();
    text.expect_translate()
        .withf(|term, source| term == "bread" && source == "en")
        .returning(|_, _| {
            Ok(Translation {
                translation: "pan".to_string(),
                example: Some("Compro pan.".to_string()),
            })
        });

    let orch = orchestrator(Arc::new(text), Vec::new(), false);
    let translation = orch.translate("bread").await.unwrap();
    assert_eq!(translation.translation, "pan");
}

#[tokio::test(start_paused = true)]
async fn test_verification_failure_maps_to_unavailable() {
    let mut text = MockTextBackend::new();
    text.expect_verify_answer()
        .returning(|_, _| Err(ProviderError::RateLimited));

    let orch = orchestrator(Arc::new(text), Vec::new(), false);
    let verdict = orch.verify_answer("dog", "pero").await;
    // Sentinel, not "wrong answer": the policy belongs to the caller.
    assert_eq!(verdict, Verification::Unavailable);
}

#[tokio::test(start_paused = true)]
async fn test_verification_judgement_passes_through() {
    let mut text = MockTextBackend::new();
    text.expect_verify_answer().returning(|_, _| {
        Ok(Verification::Judged {
            correct: false,
            feedback: Some("Close, but that is a different word.".to_string()),
        })
    });

    let orch = orchestrator(Arc::new(text), Vec::new(), false);
    match orch.verify_answer("dog", "gato").await {
        Verification::Judged { correct, feedback } => {
            assert!(!correct);
            assert!(feedback.is_some());
        }
        Verification::Unavailable => panic!("expected a judgement"),
    }
}
