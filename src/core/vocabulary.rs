//! Data model for the vocabulary trainer.
//!
//! `VocabularyItem` is the unit of learning. Its scheduling fields are
//! mutated only by the review scheduler; the one other permitted write is
//! caching an illustration reference onto the item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle status of an item.
///
/// Moves forward (`New → Learning → Learned`) on correct answers and
/// regresses to `Learning` on a wrong answer. An item never returns to
/// `New` once it has been reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LearningStatus {
    /// Never reviewed.
    #[default]
    New,
    /// In the review ladder.
    Learning,
    /// Answered correctly often enough to be considered known.
    Learned,
}

/// CEFR proficiency tier, ordered A1 (lowest) through C2 (highest).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    #[default]
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl ProficiencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::A1 => "A1",
            ProficiencyLevel::A2 => "A2",
            ProficiencyLevel::B1 => "B1",
            ProficiencyLevel::B2 => "B2",
            ProficiencyLevel::C1 => "C1",
            ProficiencyLevel::C2 => "C2",
        }
    }
}

impl std::fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the item entered the collection. Used only to filter the review
/// pool, never in scheduling math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemOrigin {
    /// Entered by the learner.
    #[default]
    Manual,
    /// Produced by batch generation.
    Generated,
}

// ============================================================================
// VocabularyItem
// ============================================================================

/// A single vocabulary entry with its review scheduling state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Opaque unique id.
    pub id: Uuid,
    /// Native-language gloss.
    pub gloss: String,
    /// Target-language headword.
    pub headword: String,
    /// Free-text category tag.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: ProficiencyLevel,
    /// Optional example sentence in the target language.
    #[serde(default)]
    pub example: Option<String>,
    /// Cached illustration reference (URL or inline payload).
    #[serde(default)]
    pub illustration: Option<String>,
    #[serde(default)]
    pub status: LearningStatus,
    /// When the item next becomes due. Never set to a moment earlier than
    /// the mutation that set it.
    #[serde(default = "Utc::now")]
    pub next_review_at: DateTime<Utc>,
    #[serde(default)]
    pub last_review_at: Option<DateTime<Utc>>,
    /// Total review attempts, monotonic non-decreasing.
    #[serde(default)]
    pub attempt_count: u32,
    /// Consecutive correct answers; resets to 0 on any wrong answer.
    #[serde(default)]
    pub correct_streak: u32,
    #[serde(default)]
    pub origin: ItemOrigin,
}

impl VocabularyItem {
    /// Create an item from manual entry. Status `New`, due immediately.
    pub fn new_manual(
        gloss: impl Into<String>,
        headword: impl Into<String>,
        category: impl Into<String>,
        level: ProficiencyLevel,
        now: DateTime<Utc>,
    ) -> Self {
        Self::create(gloss, headword, category, level, None, ItemOrigin::Manual, now)
    }

    /// Create an item from a batch generation result.
    pub fn new_generated(
        gloss: impl Into<String>,
        headword: impl Into<String>,
        category: impl Into<String>,
        level: ProficiencyLevel,
        example: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::create(gloss, headword, category, level, example, ItemOrigin::Generated, now)
    }

    fn create(
        gloss: impl Into<String>,
        headword: impl Into<String>,
        category: impl Into<String>,
        level: ProficiencyLevel,
        example: Option<String>,
        origin: ItemOrigin,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            gloss: gloss.into(),
            headword: headword.into(),
            category: category.into(),
            level,
            example,
            illustration: None,
            status: LearningStatus::New,
            next_review_at: now,
            last_review_at: None,
            attempt_count: 0,
            correct_streak: 0,
            origin,
        }
    }

    /// A due item: review time has passed, or never reviewed at all.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == LearningStatus::New || self.next_review_at <= now
    }

    /// Cache an illustration reference onto the item. The only permitted
    /// mutation outside the rescheduling function.
    pub fn set_illustration(&mut self, reference: impl Into<String>) {
        self.illustration = Some(reference.into());
    }
}

// ============================================================================
// SessionOutcome
// ============================================================================

/// Outcome of one item in one study session. Ephemeral: consumed exactly
/// once by the rescheduling pass, never persisted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub item_id: Uuid,
    pub correct: bool,
}

impl SessionOutcome {
    pub fn new(item_id: Uuid, correct: bool) -> Self {
        Self { item_id, correct }
    }
}
