//! Pairing-mode board: a shuffled grid of gloss/headword cards.
//!
//! Mistakes are tracked per vocabulary item, not per card: one mismatch
//! marks both involved items for the whole session, and a later correct
//! match does not clear it.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::core::vocabulary::{SessionOutcome, VocabularyItem};

/// Which side of the item a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    /// Native-language gloss.
    Gloss,
    /// Target-language headword.
    Headword,
}

/// Display state of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Idle,
    Selected,
    /// Removed from the active grid.
    Matched,
    /// Flashing after a mismatch, reverts to `Idle` on resolve.
    Wrong,
}

/// One card in the grid.
#[derive(Debug, Clone)]
pub struct PairCard {
    pub card_id: u32,
    pub item_id: Uuid,
    pub face: CardFace,
    pub label: String,
    pub state: CardState,
}

/// What one selection did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// First card of a comparison marked selected.
    Selected,
    /// Second card completed a pair; both cards left the grid.
    Matched { item_id: Uuid, board_cleared: bool },
    /// Second card did not pair; both flash and the board locks until
    /// `resolve_mismatch` is called.
    Mismatch { first: u32, second: u32 },
    /// Input ignored: board locked, card already matched, or same card
    /// clicked twice.
    Ignored,
}

/// The pairing grid for one session.
pub struct PairingBoard {
    cards: Vec<PairCard>,
    first_pick: Option<u32>,
    pending_wrong: Option<(u32, u32)>,
    locked: bool,
    mistakes: HashSet<Uuid>,
}

impl PairingBoard {
    /// Build a shuffled 2n-card grid from n items.
    pub fn new(items: &[VocabularyItem]) -> Self {
        let mut cards = Vec::with_capacity(items.len() * 2);
        let mut next_id = 0u32;
        for item in items {
            for (face, label) in [
                (CardFace::Gloss, item.gloss.clone()),
                (CardFace::Headword, item.headword.clone()),
            ] {
                cards.push(PairCard {
                    card_id: next_id,
                    item_id: item.id,
                    face,
                    label,
                    state: CardState::Idle,
                });
                next_id += 1;
            }
        }
        cards.shuffle(&mut rand::thread_rng());

        Self {
            cards,
            first_pick: None,
            pending_wrong: None,
            locked: false,
            mistakes: HashSet::new(),
        }
    }

    pub fn cards(&self) -> &[PairCard] {
        &self.cards
    }

    /// Item ids that were ever part of a mismatch.
    pub fn mistakes(&self) -> &HashSet<Uuid> {
        &self.mistakes
    }

    /// True while a wrong-pair flash is waiting to be resolved.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True once every card has been matched.
    pub fn is_complete(&self) -> bool {
        self.cards.iter().all(|c| c.state == CardState::Matched)
    }

    fn card_index(&self, card_id: u32) -> Option<usize> {
        self.cards.iter().position(|c| c.card_id == card_id)
    }

    /// Select a card. Only one pending comparison is allowed at a time:
    /// while a mismatch flash is unresolved every selection is ignored.
    pub fn select(&mut self, card_id: u32) -> SelectOutcome {
        if self.locked {
            return SelectOutcome::Ignored;
        }
        let Some(index) = self.card_index(card_id) else {
            return SelectOutcome::Ignored;
        };
        if self.cards[index].state != CardState::Idle {
            // Already matched, or the selected card clicked again.
            return SelectOutcome::Ignored;
        }

        let Some(first_id) = self.first_pick else {
            self.cards[index].state = CardState::Selected;
            self.first_pick = Some(card_id);
            return SelectOutcome::Selected;
        };

        let first_index = self
            .card_index(first_id)
            .expect("first pick must be on the board");
        self.first_pick = None;

        if self.cards[first_index].item_id == self.cards[index].item_id {
            self.cards[first_index].state = CardState::Matched;
            self.cards[index].state = CardState::Matched;
            SelectOutcome::Matched {
                item_id: self.cards[index].item_id,
                board_cleared: self.is_complete(),
            }
        } else {
            // Both items carry the mistake, permanently for this session.
            self.mistakes.insert(self.cards[first_index].item_id);
            self.mistakes.insert(self.cards[index].item_id);
            self.cards[first_index].state = CardState::Wrong;
            self.cards[index].state = CardState::Wrong;
            self.pending_wrong = Some((first_id, card_id));
            self.locked = true;
            SelectOutcome::Mismatch {
                first: first_id,
                second: card_id,
            }
        }
    }

    /// Revert a wrong-pair flash and unlock the board. The fixed flash
    /// delay itself lives in the session controller.
    pub fn resolve_mismatch(&mut self) {
        if let Some((a, b)) = self.pending_wrong.take() {
            for card_id in [a, b] {
                if let Some(index) = self.card_index(card_id) {
                    self.cards[index].state = CardState::Idle;
                }
            }
        }
        self.locked = false;
    }

    /// Final outcome per item: correct unless the item was ever part of a
    /// mismatch.
    pub fn outcomes(&self, items: &[VocabularyItem]) -> Vec<SessionOutcome> {
        items
            .iter()
            .map(|item| SessionOutcome::new(item.id, !self.mistakes.contains(&item.id)))
            .collect()
    }
}
