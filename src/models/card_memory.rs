//! Memory strength of a single flashcard, as tracked by SM-2.
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Ease factor every newly authored card starts with.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Ease factor never drops below this value.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Scheduling state of one card.
///
/// Only ever replaced wholesale by the output of [`crate::models::sm2::schedule`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardMemoryState {
    pub ease_factor: f64,
    /// Days between the last review and `next_review_date`. 0 = due immediately.
    #[serde(deserialize_with = "deserialize_count")]
    pub interval_days: u32,
    /// Consecutive successful reviews since the last lapse.
    #[serde(deserialize_with = "deserialize_count")]
    pub repetitions: u32,
    pub next_review_date: NaiveDate,
}

impl CardMemoryState {
    /// State of a freshly authored card, due on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            next_review_date: today,
        }
    }

    /// Same state with the ease factor raised to the SM-2 floor, for states
    /// that did not come out of the scheduler (imports, hand-edited files).
    pub fn clamped(mut self) -> Self {
        self.ease_factor = clamp_ease_factor(self.ease_factor);
        self
    }
}

/// Negative counters read as 0, oversized ones saturate.
pub fn non_negative_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    i64::deserialize(deserializer).map(non_negative_count)
}

/// Clamps an ease factor to the SM-2 floor. NaN is treated as the floor as well.
pub fn clamp_ease_factor(ease_factor: f64) -> f64 {
    if ease_factor >= MIN_EASE_FACTOR {
        ease_factor
    } else {
        MIN_EASE_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_card_state() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let state = CardMemoryState::new(today);

        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.next_review_date, today);
    }

    #[test]
    fn test_clamp_ease_factor() {
        assert_eq!(clamp_ease_factor(2.5), 2.5);
        assert_eq!(clamp_ease_factor(1.3), 1.3);
        assert_eq!(clamp_ease_factor(0.4), MIN_EASE_FACTOR);
        assert_eq!(clamp_ease_factor(-3.0), MIN_EASE_FACTOR);
        assert_eq!(clamp_ease_factor(f64::NAN), MIN_EASE_FACTOR);
    }

    #[test]
    fn test_serializes_date_without_time() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let json = serde_json::to_string(&CardMemoryState::new(today)).unwrap();
        assert!(json.contains("\"next_review_date\":\"2024-03-01\""));
    }

    #[test]
    fn test_negative_counters_deserialize_as_zero() {
        let state: CardMemoryState = serde_json::from_str(
            r#"{"ease_factor":0.9,"interval_days":-3,"repetitions":-1,"next_review_date":"2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.clamped().ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_non_negative_count() {
        assert_eq!(non_negative_count(-5), 0);
        assert_eq!(non_negative_count(7), 7);
        assert_eq!(non_negative_count(i64::MAX), u32::MAX);
    }
}
