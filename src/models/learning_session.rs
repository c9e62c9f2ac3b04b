//! Learning session management for spaced repetition practice.
//! Handles multi-round flashcard review with SM-2 algorithm integration.

use super::{CardMemoryState, Flashcard, LearningCard, ReviewData, ReviewQuality};
use crate::database::db;
use crate::error::{AppError, Result};
use chrono::Utc;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Manages a learning session with multiple review rounds.
/// Cards that lapse (rated Again) are repeated in subsequent rounds.
pub struct LearningSession {
    pub deck_name: String,
    pub all_cards: Vec<(i64, LearningCard, ReviewData)>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_definition: bool,
    pub conn: Arc<Mutex<Connection>>,
    pub round_number: usize,
    pub reviews_recorded: usize,
}

impl LearningSession {
    /// Starts a session over every card of the deck that is currently due.
    pub fn start(deck_name: &str, conn: Arc<Mutex<Connection>>) -> Result<Self> {
        let cards = {
            let guard = conn.lock().map_err(|_| AppError::LockPoisoned)?;
            if !db::deck_exists(deck_name, &guard)? {
                return Err(AppError::DeckNotFound(deck_name.to_string()));
            }
            db::get_flashcards_due_for_review(deck_name, &guard)?
        };
        tracing::info!("Starting session on '{}' with {} due cards", deck_name, cards.len());
        Ok(Self::new_from_due_cards(deck_name.to_string(), cards, conn))
    }

    /// Creates a new learning session from cards that are due for review.
    pub fn new_from_due_cards(
        deck_name: String,
        cards: Vec<(i64, Flashcard, ReviewData)>,
        conn: Arc<Mutex<Connection>>,
    ) -> Self {
        // Wrap flashcards in LearningCard for progress tracking
        let learning_cards: Vec<_> = cards
            .into_iter()
            .map(|(id, fc, rd)| (id, LearningCard::new(fc), rd))
            .collect();

        let indices: Vec<usize> = (0..learning_cards.len()).collect();

        Self {
            deck_name,
            all_cards: learning_cards,
            current_round_cards: indices,
            current_index: 0,
            show_definition: false,
            conn,
            round_number: 1,
            reviews_recorded: 0,
        }
    }

    pub fn current_card(&self) -> Option<&LearningCard> {
        self.current_entry().map(|(_, card, _)| card)
    }

    /// Scheduling state of the card currently shown
    pub fn current_state(&self) -> Option<&CardMemoryState> {
        self.current_entry().map(|(_, _, rd)| &rd.state)
    }

    fn current_entry(&self) -> Option<&(i64, LearningCard, ReviewData)> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx))
    }

    pub fn toggle_definition(&mut self) {
        self.show_definition = !self.show_definition;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_definition = false;
        } else {
            // End of round - check if there are cards to review
            self.start_next_round();
        }
    }

    /// Starts a new round with cards that lapsed in this one.
    /// If no cards remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| {
                self.all_cards
                    .get(idx)
                    .map(|(_, card, _)| !card.is_learned)
                    .unwrap_or(false)
            })
            .collect();

        if !failed_indices.is_empty() {
            self.current_round_cards = failed_indices;
            self.current_index = 0;
            self.show_definition = false;
            self.round_number += 1;
            tracing::debug!(
                "Round {} of '{}': {} cards to retry",
                self.round_number,
                self.deck_name,
                self.current_round_cards.len()
            );
        }
        // If failed_indices is empty, session ends (is_completed() = true)
    }

    /// Grades the current card and reschedules it using the SM-2 algorithm.
    ///
    /// The new memory state and its history entry are persisted in one
    /// transaction before the in-memory state is replaced. Cards rated
    /// Hard or better are marked as learned for this session.
    /// Returns `None` when there is no current card.
    pub fn grade_current_card(&mut self, quality: ReviewQuality) -> Result<Option<CardMemoryState>> {
        let Some(&actual_idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(None);
        };
        let Some((flashcard_id, card, review_data)) = self.all_cards.get_mut(actual_idx) else {
            return Ok(None);
        };

        let (new_review, _) = {
            let conn = self.conn.lock().map_err(|_| AppError::LockPoisoned)?;
            db::grade_card(*flashcard_id, quality, &conn)?
                .ok_or(AppError::CardNotFound(*flashcard_id))?
        };
        let new_state = new_review.state.clone();

        if quality.is_lapse() {
            card.is_learned = false; // Will be repeated in next round
        } else {
            card.mark_as_learned(new_review.last_reviewed_at.unwrap_or_else(Utc::now));
        }
        *review_data = new_review;
        self.reviews_recorded += 1;

        Ok(Some(new_state))
    }

    pub fn learned_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| {
                self.all_cards
                    .get(idx)
                    .map(|(_, card, _)| card.is_learned)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    /// Returns true when all cards have been mastered or current round is empty.
    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty() || self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
