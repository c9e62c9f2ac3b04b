use super::CardMemoryState;
use chrono::{DateTime, Utc};

/// Persisted scheduling record of one flashcard.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewData {
    pub flashcard_id: i64,
    pub state: CardMemoryState,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}
