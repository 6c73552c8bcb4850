//! Learner statistics, persisted through the storage collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::StudyMode;
use super::vocabulary::SessionOutcome;

/// Aggregate review statistics. Updated only at session completion.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LearnerStats {
    pub sessions_completed: u64,
    pub answers_total: u64,
    pub answers_correct: u64,
    pub flashcard_sessions: u64,
    pub typed_sessions: u64,
    pub listening_sessions: u64,
    pub pairing_sessions: u64,
    pub last_session_at: Option<DateTime<Utc>>,
}

impl LearnerStats {
    /// Fold a completed session into the totals.
    pub fn record_session(
        &mut self,
        mode: StudyMode,
        outcomes: &[SessionOutcome],
        now: DateTime<Utc>,
    ) {
        self.sessions_completed += 1;
        self.answers_total += outcomes.len() as u64;
        self.answers_correct += outcomes.iter().filter(|o| o.correct).count() as u64;
        match mode {
            StudyMode::Flashcard => self.flashcard_sessions += 1,
            StudyMode::Typed => self.typed_sessions += 1,
            StudyMode::Listening => self.listening_sessions += 1,
            StudyMode::Pairing => self.pairing_sessions += 1,
        }
        self.last_session_at = Some(now);
    }

    /// Overall answer accuracy in the range 0.0 - 1.0.
    pub fn accuracy(&self) -> f64 {
        if self.answers_total == 0 {
            0.0
        } else {
            self.answers_correct as f64 / self.answers_total as f64
        }
    }
}
