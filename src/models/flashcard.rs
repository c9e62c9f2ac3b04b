//! Flashcard is a pair <term, definition>. Only text is used in terms and definitions.
//! Exported cards also carry their scheduling state.
use super::CardMemoryState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<CardMemoryState>,
}

impl Flashcard {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            memory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard::new("hello", "cześć");

        assert_eq!(card.term, "hello");
        assert_eq!(card.definition, "cześć");
        assert!(card.memory.is_none());
    }

    #[test]
    fn test_memory_is_omitted_when_unknown() {
        let json = serde_json::to_string(&Flashcard::new("hello", "cześć")).unwrap();
        assert_eq!(json, r#"{"term":"hello","definition":"cześć"}"#);
    }

    #[test]
    fn test_memory_defaults_when_missing() {
        let card: Flashcard =
            serde_json::from_str(r#"{"term":"dom","definition":"house"}"#).unwrap();
        assert!(card.memory.is_none());
    }
}
