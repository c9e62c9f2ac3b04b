pub mod card_memory;
pub mod deck;
pub mod deck_set;
pub mod due;
pub mod flashcard;
pub mod learning_card;
pub mod learning_session;
pub mod review_data;
pub mod review_log;
pub mod review_quality;
pub mod sm2;

pub use card_memory::{CardMemoryState, DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};
pub use deck::Deck;
pub use deck_set::DeckSet;
pub use flashcard::Flashcard;
pub use learning_card::LearningCard;
pub use learning_session::LearningSession;
pub use review_data::ReviewData;
pub use review_log::ReviewLog;
pub use review_quality::ReviewQuality;
