//! Study session state machine.
//!
//! One `StudySession` instance drives one session; it is never persisted.
//! The caller owns idle/start; a session exists only in `Active` or
//! `Completed` state. Four interaction modes run over the same per-item
//! artifact-fetch step: on entering a new position an illustration is
//! requested from the orchestrator, except in pairing mode which shows no
//! images.
//!
//! Illustration results arrive asynchronously. A result for an item the
//! session has already moved past is ignored here; its cache write has
//! already happened inside the orchestrator, so future sessions still
//! benefit from it.

pub mod pairing;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::CoreError;
use super::generation::providers::Verification;
use super::generation::GenerationOrchestrator;
use super::playback::SpeechPlayback;
use super::vocabulary::{SessionOutcome, VocabularyItem};
use pairing::{PairingBoard, SelectOutcome};

/// How long a wrong pair stays flashed before reverting.
pub const MISMATCH_FLASH: Duration = Duration::from_millis(900);

/// The four interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyMode {
    /// Binary know / don't-know, recorded directly.
    Flashcard,
    /// Free-text answer; exact match fast path, AI verification fallback.
    Typed,
    /// Pronunciation playback, then typed input; exact match only.
    Listening,
    /// Grid matching of gloss/headword pairs.
    Pairing,
}

/// Session lifecycle. There is no idle state; construction is activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Completed,
}

/// What the learner is told after a typed or listening answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub feedback: Option<String>,
}

/// One study session over a fixed set of items.
pub struct StudySession {
    mode: StudyMode,
    items: Vec<VocabularyItem>,
    position: usize,
    outcomes: Vec<SessionOutcome>,
    state: SessionState,
    board: Option<PairingBoard>,
    current_artwork: Option<String>,
    orchestrator: Arc<GenerationOrchestrator>,
    playback: Arc<dyn SpeechPlayback>,
    artwork_tx: mpsc::UnboundedSender<(Uuid, String)>,
    artwork_rx: mpsc::UnboundedReceiver<(Uuid, String)>,
}

impl StudySession {
    /// Start a session. Fails with `NoEligibleItems` on an empty item
    /// list. Must be called within a tokio runtime (illustration requests
    /// are spawned).
    pub fn new(
        mode: StudyMode,
        items: Vec<VocabularyItem>,
        orchestrator: Arc<GenerationOrchestrator>,
        playback: Arc<dyn SpeechPlayback>,
    ) -> Result<Self, CoreError> {
        if items.is_empty() {
            return Err(CoreError::NoEligibleItems);
        }

        let board = (mode == StudyMode::Pairing).then(|| PairingBoard::new(&items));
        let (artwork_tx, artwork_rx) = mpsc::unbounded_channel();

        let mut session = Self {
            mode,
            items,
            position: 0,
            outcomes: Vec::new(),
            state: SessionState::Active,
            board,
            current_artwork: None,
            orchestrator,
            playback,
            artwork_tx,
            artwork_rx,
        };
        session.enter_position();
        Ok(session)
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Current item, for the position-based modes. Pairing mode has no
    /// position and no current item.
    pub fn current_item(&self) -> Option<&VocabularyItem> {
        if self.mode == StudyMode::Pairing || self.state == SessionState::Completed {
            return None;
        }
        self.items.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The pairing board, in pairing mode.
    pub fn board(&self) -> Option<&PairingBoard> {
        self.board.as_ref()
    }

    /// Outcomes recorded so far (complete once `is_completed`).
    pub fn outcomes(&self) -> &[SessionOutcome] {
        &self.outcomes
    }

    /// Consume the session, yielding one outcome per item.
    pub fn into_outcomes(self) -> Vec<SessionOutcome> {
        self.outcomes
    }

    // ========================================================================
    // Artifact delivery
    // ========================================================================

    /// Drain pending illustration results and return the current item's
    /// artwork, if it has arrived. Results for items the session has
    /// moved past are dropped.
    pub fn poll_artwork(&mut self) -> Option<&str> {
        while let Ok((item_id, artifact)) = self.artwork_rx.try_recv() {
            let applies = self.state == SessionState::Active
                && self
                    .items
                    .get(self.position)
                    .is_some_and(|item| item.id == item_id);
            if applies {
                // Cache the reference on the item as well; the caller
                // persists the collection after the session.
                self.items[self.position].set_illustration(artifact.clone());
                self.current_artwork = Some(artifact);
            } else {
                tracing::debug!("dropping stale illustration result");
            }
        }
        self.current_artwork.as_deref()
    }

    /// The session's (possibly mutated) items, e.g. for persisting cached
    /// illustration references.
    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    // ========================================================================
    // Flashcard mode
    // ========================================================================

    /// Record a know / don't-know gesture and advance. Returns false if
    /// the session is not an active flashcard session.
    pub fn mark_known(&mut self, known: bool) -> bool {
        if self.mode != StudyMode::Flashcard || self.state != SessionState::Active {
            return false;
        }
        self.record_and_advance(known);
        true
    }

    // ========================================================================
    // Typed-answer and listening modes
    // ========================================================================

    /// Submit a typed answer. Returns `None` if the session is not in an
    /// active typed or listening state.
    ///
    /// The fast path is exact case/whitespace-insensitive equality with
    /// the headword and makes no network call. On mismatch, typed mode
    /// delegates to answer verification and fails closed when the
    /// verifier is unavailable; listening mode is exact-match only.
    pub async fn submit_answer(&mut self, input: &str) -> Option<AnswerFeedback> {
        if self.state != SessionState::Active {
            return None;
        }
        let (gloss, headword) = match self.mode {
            StudyMode::Typed | StudyMode::Listening => {
                let item = self.items.get(self.position)?;
                (item.gloss.clone(), item.headword.clone())
            }
            _ => return None,
        };

        if normalize_answer(input) == normalize_answer(&headword) {
            self.record_and_advance(true);
            return Some(AnswerFeedback {
                correct: true,
                feedback: None,
            });
        }

        let feedback = match self.mode {
            StudyMode::Typed => match self.orchestrator.verify_answer(&gloss, input).await {
                Verification::Judged { correct, feedback } => AnswerFeedback { correct, feedback },
                Verification::Unavailable => AnswerFeedback {
                    correct: false,
                    feedback: Some(
                        "Your answer did not exactly match the expected word.".to_string(),
                    ),
                },
            },
            // Listening mode never falls back to AI verification.
            _ => AnswerFeedback {
                correct: false,
                feedback: Some(format!("The word was \"{headword}\".")),
            },
        };

        self.record_and_advance(feedback.correct);
        Some(feedback)
    }

    // ========================================================================
    // Pairing mode
    // ========================================================================

    /// Select a pairing card. On a mismatch the board locks; call
    /// `resolve_mismatch` to run the flash delay and unlock. Clearing the
    /// board completes the session.
    pub fn select_card(&mut self, card_id: u32) -> SelectOutcome {
        if self.mode != StudyMode::Pairing || self.state != SessionState::Active {
            return SelectOutcome::Ignored;
        }
        let Some(board) = self.board.as_mut() else {
            return SelectOutcome::Ignored;
        };

        let outcome = board.select(card_id);
        if let SelectOutcome::Matched {
            board_cleared: true,
            ..
        } = outcome
        {
            self.outcomes = board.outcomes(&self.items);
            self.state = SessionState::Completed;
        }
        outcome
    }

    /// Hold the wrong-pair flash for its fixed duration, then revert the
    /// cards and unlock the board.
    pub async fn resolve_mismatch(&mut self) {
        let pending = self.board.as_ref().is_some_and(|b| b.is_locked());
        if !pending {
            return;
        }
        tokio::time::sleep(MISMATCH_FLASH).await;
        if let Some(board) = self.board.as_mut() {
            board.resolve_mismatch();
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn record_and_advance(&mut self, correct: bool) {
        let item_id = self.items[self.position].id;
        self.outcomes.push(SessionOutcome::new(item_id, correct));

        self.position += 1;
        if self.position >= self.items.len() {
            self.state = SessionState::Completed;
        } else {
            self.enter_position();
        }
    }

    /// Shared per-item entry step: illustration request (non-pairing) and
    /// pronunciation playback (listening).
    fn enter_position(&mut self) {
        let Some(item) = self.items.get(self.position) else {
            return;
        };
        self.current_artwork = None;

        if self.mode == StudyMode::Listening {
            self.playback.speak(&item.headword);
        }

        if self.mode != StudyMode::Pairing {
            let orchestrator = self.orchestrator.clone();
            let tx = self.artwork_tx.clone();
            let item_id = item.id;
            let headword = item.headword.clone();
            let gloss = item.gloss.clone();
            tokio::spawn(async move {
                let artifact = orchestrator.illustration(&headword, &gloss, false).await;
                let _ = tx.send((item_id, artifact));
            });
        }
    }
}

/// Case- and whitespace-insensitive comparison form.
fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
