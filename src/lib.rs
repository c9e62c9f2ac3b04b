pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::AppError;
pub use models::due::{days_until_due, is_due};
pub use models::sm2::schedule;
pub use models::{CardMemoryState, Deck, DeckSet, Flashcard, LearningCard, LearningSession, ReviewQuality};
