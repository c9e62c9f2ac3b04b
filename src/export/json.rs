//! JSON import/export module for flashcard decks.
//! Provides functionality to save and load Deck structures, including each
//! card's scheduling state, to/from JSON files.

use crate::error::Result;
use crate::models::Deck;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Exports a deck to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_json_to_path(deck: &Deck, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(deck)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    tracing::info!(
        "Deck '{}' exported to '{}' ({} cards)",
        deck.name,
        path.display(),
        deck.flashcards.len()
    );
    Ok(())
}

/// Imports a deck from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: &Path) -> Result<Deck> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    // Deserialize JSON string into Deck structure
    let deck: Deck = serde_json::from_str(&contents)?;

    tracing::info!("Deck '{}' read from '{}'", deck.name, path.display());
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{CardMemoryState, Flashcard};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_deck() -> Deck {
        let mut reviewed = Flashcard::new("goodbye", "do widzenia");
        reviewed.memory = Some(CardMemoryState {
            ease_factor: 2.36,
            interval_days: 6,
            repetitions: 2,
            next_review_date: NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
        });

        Deck {
            name: "Test Deck".to_string(),
            flashcards: vec![Flashcard::new("hello", "cześć"), reviewed],
        }
    }

    #[test]
    fn test_export_json_to_path() {
        let dir = TempDir::new().unwrap();
        let test_file = dir.path().join("test_export.json");

        let result = export_json_to_path(&create_test_deck(), &test_file);
        assert!(result.is_ok());

        let written = fs::read_to_string(&test_file).unwrap();
        assert!(written.contains("\"next_review_date\": \"2024-07-08\""));
    }

    #[test]
    fn test_import_json() {
        let json_content = r#"{
  "name": "Import Test Deck",
  "flashcards": [
    {
      "term": "test term",
      "definition": "test definition"
    },
    {
      "term": "learned",
      "definition": "with memory",
      "memory": {
        "ease_factor": 2.6,
        "interval_days": 1,
        "repetitions": 1,
        "next_review_date": "2024-01-02"
      }
    }
  ]
}"#;

        let dir = TempDir::new().unwrap();
        let test_file = dir.path().join("test_import.json");
        fs::write(&test_file, json_content).unwrap();

        let deck = import_json(&test_file).unwrap();
        assert_eq!(deck.name, "Import Test Deck");
        assert_eq!(deck.flashcards.len(), 2);
        assert_eq!(deck.flashcards[0].term, "test term");
        assert!(deck.flashcards[0].memory.is_none());

        let memory = deck.flashcards[1].memory.as_ref().unwrap();
        assert_eq!(memory.interval_days, 1);
        assert_eq!(
            memory.next_review_date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_export_and_import_preserves_memory() {
        let original_deck = create_test_deck();
        let dir = TempDir::new().unwrap();
        let test_file = dir.path().join("test_roundtrip.json");

        export_json_to_path(&original_deck, &test_file).unwrap();
        let imported_deck = import_json(&test_file).unwrap();

        assert_eq!(original_deck.name, imported_deck.name);
        for (orig, imp) in original_deck
            .flashcards
            .iter()
            .zip(imported_deck.flashcards.iter())
        {
            assert_eq!(orig.term, imp.term);
            assert_eq!(orig.definition, imp.definition);
            assert_eq!(orig.memory, imp.memory);
        }
    }

    #[test]
    fn test_import_nonexistent_file() {
        let dir = TempDir::new().unwrap();
        let result = import_json(&dir.path().join("nonexistent_file_xyz123.json"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = TempDir::new().unwrap();
        let test_file = dir.path().join("test_invalid.json");
        fs::write(&test_file, "{ this is not valid json }").unwrap();

        let result = import_json(&test_file);
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }

    #[test]
    fn test_import_reads_negative_counters_as_zero() {
        let dir = TempDir::new().unwrap();
        let test_file = dir.path().join("negative.json");
        fs::write(
            &test_file,
            r#"{"name":"d","flashcards":[{"term":"a","definition":"b","memory":
               {"ease_factor":2.5,"interval_days":-1,"repetitions":-2,"next_review_date":"2024-01-02"}}]}"#,
        )
        .unwrap();

        let deck = import_json(&test_file).unwrap();
        let memory = deck.flashcards[0].memory.as_ref().unwrap();
        assert_eq!(memory.interval_days, 0);
        assert_eq!(memory.repetitions, 0);
    }

    #[test]
    fn test_import_rejects_unknown_date_format() {
        let dir = TempDir::new().unwrap();
        let test_file = dir.path().join("bad_date.json");
        fs::write(
            &test_file,
            r#"{"name":"d","flashcards":[{"term":"a","definition":"b","memory":
               {"ease_factor":2.5,"interval_days":0,"repetitions":0,"next_review_date":"tomorrow"}}]}"#,
        )
        .unwrap();

        assert!(import_json(&test_file).is_err());
    }
}
