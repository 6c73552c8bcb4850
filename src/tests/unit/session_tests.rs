//! Session controller behavior across the four study modes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::core::error::CoreError;
use crate::core::generation::providers::{ProviderError, TextProvider, Verification};
use crate::core::generation::queue::RequestQueue;
use crate::core::generation::GenerationOrchestrator;
use crate::core::playback::SilentPlayback;
use crate::core::scheduler;
use crate::core::session::pairing::SelectOutcome;
use crate::core::session::{SessionState, StudyMode, StudySession};
use crate::core::vocabulary::{LearningStatus, ProficiencyLevel, VocabularyItem};
use crate::tests::mocks::{untouchable_text, MockTextBackend, RecordingPlayback};

fn items(n: usize) -> Vec<VocabularyItem> {
    let now = Utc::now();
    (0..n)
        .map(|i| {
            VocabularyItem::new_manual(
                format!("gloss-{i}"),
                format!("word-{i}"),
                "test",
                ProficiencyLevel::A1,
                now,
            )
        })
        .collect()
}

fn orchestrator_with(text: Arc<dyn TextProvider>) -> Arc<GenerationOrchestrator> {
    let queue = Arc::new(RequestQueue::new(Duration::from_millis(10)));
    Arc::new(GenerationOrchestrator::new(
        text,
        Vec::new(),
        queue,
        false,
        "watercolor".to_string(),
        "en".to_string(),
    ))
}

// ============================================================================
// Construction
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_empty_session_does_not_start() {
    let result = StudySession::new(
        StudyMode::Flashcard,
        Vec::new(),
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    );
    assert!(matches!(result, Err(CoreError::NoEligibleItems)));
}

// ============================================================================
// Flashcard mode
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_flashcard_outcomes_in_visiting_order() {
    let items = items(3);
    let ids: Vec<_> = items.iter().map(|i| i.id).collect();
    let mut session = StudySession::new(
        StudyMode::Flashcard,
        items,
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    assert!(session.mark_known(true));
    assert!(session.mark_known(false));
    assert!(session.mark_known(true));

    assert_eq!(session.state(), SessionState::Completed);
    let outcomes = session.into_outcomes();
    assert_eq!(outcomes.len(), 3);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.item_id, ids[i]);
    }
    assert!(outcomes[0].correct);
    assert!(!outcomes[1].correct);
    assert!(outcomes[2].correct);
}

#[tokio::test(start_paused = true)]
async fn test_flashcard_input_ignored_after_completion() {
    let mut session = StudySession::new(
        StudyMode::Flashcard,
        items(1),
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    assert!(session.mark_known(true));
    assert!(!session.mark_known(true));
    assert_eq!(session.outcomes().len(), 1);
}

// ============================================================================
// Typed-answer mode
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_typed_exact_match_skips_verification() {
    // The mock has no verify expectation: any call would panic.
    let mut session = StudySession::new(
        StudyMode::Typed,
        items(1),
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    // Case and surrounding whitespace do not matter.
    let feedback = session.submit_answer("  WORD-0 ").await.unwrap();
    assert!(feedback.correct);
    assert!(session.is_completed());
}

#[tokio::test(start_paused = true)]
async fn test_typed_mismatch_delegates_to_verification() {
    let mut text = MockTextBackend::new();
    text.expect_verify_answer()
        .withf(|gloss, input| gloss == "gloss-0" && input == "wodr-0")
        .returning(|_, _| {
            Ok(Verification::Judged {
                correct: true,
                feedback: Some("Accepted with a typo.".to_string()),
            })
        });

    let mut session = StudySession::new(
        StudyMode::Typed,
        items(1),
        orchestrator_with(Arc::new(text)),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    let feedback = session.submit_answer("wodr-0").await.unwrap();
    assert!(feedback.correct);
    assert_eq!(feedback.feedback.as_deref(), Some("Accepted with a typo."));
}

#[tokio::test(start_paused = true)]
async fn test_typed_fails_closed_when_verification_unavailable() {
    let mut text = MockTextBackend::new();
    text.expect_verify_answer()
        .returning(|_, _| Err(ProviderError::RateLimited));

    let mut session = StudySession::new(
        StudyMode::Typed,
        items(1),
        orchestrator_with(Arc::new(text)),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    let feedback = session.submit_answer("wrong").await.unwrap();
    assert!(!feedback.correct);
    assert!(feedback
        .feedback
        .as_deref()
        .unwrap()
        .contains("did not exactly match"));

    let outcomes = session.into_outcomes();
    assert!(!outcomes[0].correct);
}

// ============================================================================
// Listening mode
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_listening_speaks_each_headword_on_entry() {
    let playback = RecordingPlayback::new();
    let mut session = StudySession::new(
        StudyMode::Listening,
        items(2),
        orchestrator_with(untouchable_text()),
        playback.clone(),
    )
    .unwrap();

    assert_eq!(playback.spoken(), vec!["word-0".to_string()]);
    let _ = session.submit_answer("word-0").await.unwrap();
    assert_eq!(
        playback.spoken(),
        vec!["word-0".to_string(), "word-1".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_listening_mismatch_never_calls_verification() {
    // Untouchable text backend: a verification call would panic the test.
    let mut session = StudySession::new(
        StudyMode::Listening,
        items(1),
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    let feedback = session.submit_answer("nope").await.unwrap();
    assert!(!feedback.correct);
    assert!(feedback.feedback.as_deref().unwrap().contains("word-0"));
}

// ============================================================================
// Pairing mode
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_pairing_session_scenario() {
    let items = items(3);
    let ids: Vec<_> = items.iter().map(|i| i.id).collect();
    let mut session = StudySession::new(
        StudyMode::Pairing,
        items,
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    // Pairing mode has no current item and fetches no images.
    assert!(session.current_item().is_none());

    let card_of = |session: &StudySession, item: usize, which: usize| {
        session
            .board()
            .unwrap()
            .cards()
            .iter()
            .filter(|c| c.item_id == ids[item])
            .map(|c| c.card_id)
            .nth(which)
            .unwrap()
    };

    // Mismatch item 0 against item 1 once.
    let a = card_of(&session, 0, 0);
    let b = card_of(&session, 1, 0);
    assert_eq!(session.select_card(a), SelectOutcome::Selected);
    assert!(matches!(
        session.select_card(b),
        SelectOutcome::Mismatch { .. }
    ));

    // Board is locked until the flash resolves.
    assert_eq!(session.select_card(a), SelectOutcome::Ignored);
    session.resolve_mismatch().await;

    // Match everything correctly afterwards.
    for item in 0..3 {
        let first = card_of(&session, item, 0);
        let second = card_of(&session, item, 1);
        session.select_card(first);
        session.select_card(second);
    }

    assert!(session.is_completed());
    let outcomes = session.into_outcomes();
    assert_eq!(outcomes.len(), 3);
    let lookup = |id| outcomes.iter().find(|o| o.item_id == id).unwrap().correct;
    // The mismatched pair stays wrong despite the later correct match.
    assert!(!lookup(ids[0]));
    assert!(!lookup(ids[1]));
    assert!(lookup(ids[2]));
}

// ============================================================================
// Artifact delivery
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_artwork_applies_to_current_item() {
    let mut session = StudySession::new(
        StudyMode::Flashcard,
        items(1),
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    // Let the spawned illustration task run to completion.
    tokio::time::sleep(Duration::from_secs(1)).await;

    let artwork = session.poll_artwork().map(str::to_string);
    assert!(artwork.is_some());
    assert!(artwork.unwrap().contains("word-0"));
    // The reference is cached on the item for persistence.
    assert!(session.items()[0].illustration.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_stale_artwork_is_dropped_after_advancing() {
    let mut session = StudySession::new(
        StudyMode::Flashcard,
        items(2),
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    )
    .unwrap();

    // Advance before the first item's artwork is polled.
    session.mark_known(true);
    tokio::time::sleep(Duration::from_secs(1)).await;

    let artwork = session.poll_artwork().map(str::to_string).unwrap();
    // Only the current item's artwork is applied; item 0's result was
    // dropped (its cache write still happened in the orchestrator).
    assert!(artwork.contains("word-1"));
    assert!(session.items()[0].illustration.is_none());
}

// ============================================================================
// Outcome reduction
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_completed_session_reduces_into_collection() {
    let mut collection = items(2);
    let now = Utc::now();

    let mut session = StudySession::new(
        StudyMode::Flashcard,
        collection.clone(),
        orchestrator_with(untouchable_text()),
        Arc::new(SilentPlayback),
    )
    .unwrap();
    session.mark_known(true);
    session.mark_known(false);

    let outcomes = session.into_outcomes();
    scheduler::apply_outcomes(&mut collection, &outcomes, now);

    assert_eq!(collection[0].status, LearningStatus::Learning);
    assert_eq!(collection[0].correct_streak, 1);
    assert_eq!(collection[0].next_review_at, now + chrono::Duration::days(1));
    assert_eq!(collection[1].correct_streak, 0);
    assert_eq!(
        collection[1].next_review_at,
        now + chrono::Duration::minutes(10)
    );
}
