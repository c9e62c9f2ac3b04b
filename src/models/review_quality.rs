//! How well a card was recalled during a review.
//!
//! The four labels map onto the 0-5 SM-2 quality scale:
//! - Again: 0 (complete failure, card lapses)
//! - Hard: 3 (recalled with serious difficulty)
//! - Good: 4 (recalled after hesitation)
//! - Easy: 5 (perfect, immediate recall)
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest quality that still counts as a successful review.
pub const PASSING_QUALITY: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewQuality {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewQuality {
    pub const ALL: [ReviewQuality; 4] = [
        ReviewQuality::Again,
        ReviewQuality::Hard,
        ReviewQuality::Good,
        ReviewQuality::Easy,
    ];

    /// Numeric SM-2 quality (0-5)
    pub fn quality(self) -> u8 {
        match self {
            ReviewQuality::Again => 0,
            ReviewQuality::Hard => 3,
            ReviewQuality::Good => 4,
            ReviewQuality::Easy => 5,
        }
    }

    pub fn is_lapse(self) -> bool {
        self.quality() < PASSING_QUALITY
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewQuality::Again => "again",
            ReviewQuality::Hard => "hard",
            ReviewQuality::Good => "good",
            ReviewQuality::Easy => "easy",
        }
    }

    /// Maps the 1-4 button numbering used by the study prompt.
    pub fn from_button(button: u8) -> Option<Self> {
        match button {
            1 => Some(ReviewQuality::Again),
            2 => Some(ReviewQuality::Hard),
            3 => Some(ReviewQuality::Good),
            4 => Some(ReviewQuality::Easy),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ReviewQuality {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        if let Ok(button) = label.parse::<u8>() {
            return Self::from_button(button)
                .ok_or_else(|| AppError::UnknownQuality(s.to_string()));
        }
        match label.as_str() {
            "again" => Ok(ReviewQuality::Again),
            "hard" => Ok(ReviewQuality::Hard),
            "good" => Ok(ReviewQuality::Good),
            "easy" => Ok(ReviewQuality::Easy),
            _ => Err(AppError::UnknownQuality(s.to_string())),
        }
    }
}
