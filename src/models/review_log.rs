//! Immutable record of a single review, kept for analytics.
use super::{CardMemoryState, ReviewQuality};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub flashcard_id: i64,
    pub quality: ReviewQuality,
    pub ease_before: f64,
    pub ease_after: f64,
    pub interval_before: u32,
    pub interval_after: u32,
    /// Calendar day the review was scheduled against.
    pub reviewed_on: NaiveDate,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewLog {
    pub fn new(
        flashcard_id: i64,
        quality: ReviewQuality,
        before: &CardMemoryState,
        after: &CardMemoryState,
        reviewed_on: NaiveDate,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            flashcard_id,
            quality,
            ease_before: before.ease_factor,
            ease_after: after.ease_factor,
            interval_before: before.interval_days,
            interval_after: after.interval_days,
            reviewed_on,
            reviewed_at,
        }
    }

    pub fn was_lapse(&self) -> bool {
        self.quality.is_lapse()
    }
}
