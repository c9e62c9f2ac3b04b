//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates optimal review intervals based on recall quality:
//! - Each card has an easiness factor (EF) that adjusts based on performance
//! - Quality below 3 (Again): reset interval and repetitions, the card is due again today
//! - Quality 3-5 (Hard/Good/Easy): increase interval progressively (1 day → 6 days → EF multiplier)
//! - EF is adjusted after every review, including lapses, and never falls below 1.3
//! - Higher quality responses lead to longer intervals between reviews

use super::card_memory::{CardMemoryState, clamp_ease_factor};
use super::due;
use super::ReviewQuality;
use chrono::{Days, NaiveDate};

/// Computes the next memory state for a card reviewed today.
pub fn schedule(current: &CardMemoryState, quality: ReviewQuality) -> CardMemoryState {
    schedule_on(current, quality, due::today())
}

/// Computes the next memory state for a card reviewed on `today`.
pub fn schedule_on(
    current: &CardMemoryState,
    quality: ReviewQuality,
    today: NaiveDate,
) -> CardMemoryState {
    let new_ef = next_ease_factor(current.ease_factor, quality);

    let (new_interval, new_repetitions) = if quality.is_lapse() {
        (0, 0)
    } else {
        let new_reps = current.repetitions.saturating_add(1);
        let new_int = match new_reps {
            1 => 1,
            2 => 6,
            // Uses the previous interval, not the one just computed.
            _ => (current.interval_days as f64 * new_ef).round() as u32,
        };
        (new_int, new_reps)
    };

    let next_review_date = today
        .checked_add_days(Days::new(u64::from(new_interval)))
        .unwrap_or(NaiveDate::MAX);

    CardMemoryState {
        ease_factor: new_ef,
        interval_days: new_interval,
        repetitions: new_repetitions,
        next_review_date,
    }
}

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3.
///
/// An input EF below the floor is raised to it before the update is applied.
pub fn next_ease_factor(ease_factor: f64, quality: ReviewQuality) -> f64 {
    let q = f64::from(quality.quality());
    let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    clamp_ease_factor(clamp_ease_factor(ease_factor) + ease_delta)
}

/// What each rating would schedule, in `ReviewQuality::ALL` order.
pub fn preview_intervals(
    current: &CardMemoryState,
    today: NaiveDate,
) -> [(ReviewQuality, CardMemoryState); 4] {
    ReviewQuality::ALL.map(|quality| (quality, schedule_on(current, quality, today)))
}

/// Format an interval in days to a compact, human-readable string
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
