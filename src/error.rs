use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config.toml: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unknown review quality '{0}' (expected again, hard, good, easy or 1-4)")]
    UnknownQuality(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Flashcard not found: {0}")]
    CardNotFound(i64),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, AppError>;
