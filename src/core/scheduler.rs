//! Review scheduling: due-item selection and post-review rescheduling.
//!
//! The rescheduling policy is a fixed four-rung ladder (1 day, 3 days,
//! 7 days, then 7 days again for every further correct answer) with a
//! 10-minute short retry after a wrong answer. It is not an adaptive or
//! exponential spaced-repetition model, and the interval never grows past
//! 7 days however long the correct streak runs.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;

use super::error::CoreError;
use super::vocabulary::{ItemOrigin, LearningStatus, SessionOutcome, VocabularyItem};

/// Default number of items selected into one session.
pub const DEFAULT_SESSION_LIMIT: usize = 10;

/// Retry delay after a wrong answer, in minutes.
const WRONG_ANSWER_RETRY_MINUTES: i64 = 10;

/// Review-pool filter by item origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    ManualOnly,
    GeneratedOnly,
}

impl SourceFilter {
    fn matches(&self, origin: ItemOrigin) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::ManualOnly => origin == ItemOrigin::Manual,
            SourceFilter::GeneratedOnly => origin == ItemOrigin::Generated,
        }
    }
}

/// Result of due-item selection.
///
/// `FreePractice` is the escape hatch taken when nothing is due: a random
/// sample from the source-filtered collection. It is a distinct variant so
/// callers cannot start such a session without passing an explicit
/// confirmation gate first.
#[derive(Debug, Clone)]
pub enum DueSelection {
    /// Items that are actually due, oldest review time first.
    Due(Vec<VocabularyItem>),
    /// Nothing is due; these items are offered for free practice and
    /// require learner confirmation before a session starts.
    FreePractice(Vec<VocabularyItem>),
}

impl DueSelection {
    pub fn items(&self) -> &[VocabularyItem] {
        match self {
            DueSelection::Due(items) | DueSelection::FreePractice(items) => items,
        }
    }
}

/// Select up to `limit` items for a review session.
///
/// Due items (status `New`, or review time passed) are returned oldest
/// first; `New` items carry their creation time so they interleave
/// naturally by age. When nothing is due, up to `limit` items are sampled
/// uniformly without replacement from the source-filtered collection as a
/// `FreePractice` offer. An empty filtered collection is
/// `CoreError::NoEligibleItems`.
pub fn select_due(
    items: &[VocabularyItem],
    filter: SourceFilter,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<DueSelection, CoreError> {
    let pool: Vec<&VocabularyItem> =
        items.iter().filter(|i| filter.matches(i.origin)).collect();

    let mut due: Vec<VocabularyItem> = pool
        .iter()
        .filter(|i| i.is_due(now))
        .map(|i| (*i).clone())
        .collect();
    due.sort_by_key(|i| i.next_review_at);
    due.truncate(limit);

    if !due.is_empty() {
        return Ok(DueSelection::Due(due));
    }

    if pool.is_empty() {
        return Err(CoreError::NoEligibleItems);
    }

    // Free practice: sample from the source-filtered set, ignoring due-ness.
    let mut rng = rand::thread_rng();
    let sample: Vec<VocabularyItem> = pool
        .choose_multiple(&mut rng, limit.min(pool.len()))
        .map(|i| (*i).clone())
        .collect();

    tracing::debug!(
        pool = pool.len(),
        sampled = sample.len(),
        "nothing due, offering free practice pool"
    );

    Ok(DueSelection::FreePractice(sample))
}

/// Reschedule one item from a session outcome.
///
/// Correct: the next interval is keyed off the pre-update streak
/// (0 → 1 day, 1 → 3 days, otherwise 7 days), the streak increments, and
/// the item graduates to `Learned` once the incremented streak exceeds 3.
/// Wrong: 10-minute retry, streak reset, status back to `Learning`.
/// Both branches bump the attempt count and stamp `last_review_at`.
pub fn apply_outcome(item: &mut VocabularyItem, correct: bool, now: DateTime<Utc>) {
    if correct {
        let delay_days: i64 = match item.correct_streak {
            0 => 1,
            1 => 3,
            _ => 7,
        };
        item.next_review_at = now + Duration::days(delay_days);
        item.correct_streak += 1;
        item.status = if item.correct_streak > 3 {
            LearningStatus::Learned
        } else {
            LearningStatus::Learning
        };
    } else {
        item.next_review_at = now + Duration::minutes(WRONG_ANSWER_RETRY_MINUTES);
        item.correct_streak = 0;
        item.status = LearningStatus::Learning;
    }

    item.attempt_count += 1;
    item.last_review_at = Some(now);
}

/// Reduce a completed session's outcomes back into the collection.
/// Outcomes for items no longer in the collection are skipped.
pub fn apply_outcomes(
    items: &mut [VocabularyItem],
    outcomes: &[SessionOutcome],
    now: DateTime<Utc>,
) {
    for outcome in outcomes {
        if let Some(item) = items.iter_mut().find(|i| i.id == outcome.item_id) {
            apply_outcome(item, outcome.correct, now);
        }
    }
}
