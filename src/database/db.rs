//! Database operations for flashcard application
//!
//! Handles SQLite database initialization, CRUD operations for decks and flashcards,
//! SM-2 memory state persistence and the review history log.

use crate::models::card_memory::non_negative_count;
use crate::models::due::{self, is_due_on};
use crate::models::sm2::schedule_on;
use crate::models::{CardMemoryState, Deck, DeckSet, Flashcard, ReviewData, ReviewLog, ReviewQuality};
use chrono::{Days, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

impl ToSql for ReviewQuality {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ReviewQuality {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Per-deck counts shown by the deck overview
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckStats {
    pub total_cards: usize,
    pub due_cards: usize,
    pub new_cards: usize,
    pub reviews_today: usize,
}

/// Opens (or creates) the database file and makes sure all tables exist
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    tracing::debug!("Database ready at {}", path.display());
    Ok(conn)
}

/// Creates tables for decks, flashcards, SM-2 review data, review history and app state.
/// Sets the current date to today if not already initialized.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS decks (
            name TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS flashcards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_name TEXT NOT NULL,
            term TEXT NOT NULL,
            definition TEXT NOT NULL,
            FOREIGN KEY (deck_name) REFERENCES decks(name) ON DELETE CASCADE,
            UNIQUE(deck_name, term)
        );

        CREATE TABLE IF NOT EXISTS review_data (
            flashcard_id INTEGER PRIMARY KEY,
            easiness_factor REAL NOT NULL DEFAULT 2.5,
            interval_days INTEGER NOT NULL DEFAULT 0,
            repetitions INTEGER NOT NULL DEFAULT 0,
            next_review_date TEXT NOT NULL,
            last_reviewed_at TEXT,
            FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS review_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            flashcard_id INTEGER NOT NULL,
            quality TEXT NOT NULL,
            ease_before REAL NOT NULL,
            ease_after REAL NOT NULL,
            interval_before INTEGER NOT NULL,
            interval_after INTEGER NOT NULL,
            reviewed_on TEXT NOT NULL,
            reviewed_at TEXT NOT NULL,
            FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_review_history_card
            ON review_history(flashcard_id, id);

        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![due::today().format(DATE_FORMAT).to_string()],
    )?;

    Ok(())
}

/// Retrieves the (possibly simulated) current date from the database
pub fn get_current_date(conn: &Connection) -> Result<NaiveDate> {
    let value: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    Ok(parse_date_or_today(&value))
}

pub fn set_current_date(date: NaiveDate, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES ('current_date', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![date.format(DATE_FORMAT).to_string()],
    )?;
    Ok(())
}

/// Advances the current date by one calendar day (for practicing spaced repetition)
pub fn advance_day(conn: &Connection) -> Result<NaiveDate> {
    let current = get_current_date(conn)?;
    let next_day = current.checked_add_days(Days::new(1)).unwrap_or(current);
    set_current_date(next_day, conn)?;
    tracing::info!("Current date advanced to {}", next_day);
    Ok(next_day)
}

/// Resets the simulated date back to the real local date
pub fn reset_current_date(conn: &Connection) -> Result<NaiveDate> {
    let today = due::today();
    set_current_date(today, conn)?;
    tracing::info!("Current date reset to {}", today);
    Ok(today)
}

/// Creates a new deck in the database
pub fn new_deck(name: &str, conn: &Connection) -> Result<()> {
    conn.execute("INSERT INTO decks (name) VALUES (?1)", params![name])?;
    tracing::info!("Deck '{}' created", name);
    Ok(())
}

pub fn deck_exists(name: &str, conn: &Connection) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM decks WHERE name = ?1)",
        params![name],
        |row| row.get(0),
    )
}

/// Adds a flashcard to a deck and initializes its SM-2 memory state
///
/// Returns the flashcard ID. If flashcard already exists (same deck + term),
/// it's ignored due to UNIQUE constraint and its existing state is kept.
pub fn add_flashcard(
    deck_name: &str,
    term: &str,
    definition: &str,
    conn: &Connection,
) -> Result<i64> {
    let state = CardMemoryState::new(get_current_date(conn)?);
    insert_flashcard(deck_name, term, definition, &state, conn)
}

fn insert_flashcard(
    deck_name: &str,
    term: &str,
    definition: &str,
    state: &CardMemoryState,
    conn: &Connection,
) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO flashcards (deck_name, term, definition) VALUES (?1, ?2, ?3)",
        params![deck_name, term, definition],
    )?;

    let flashcard_id: i64 = conn.query_row(
        "SELECT id FROM flashcards WHERE deck_name = ?1 AND term = ?2",
        params![deck_name, term],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO review_data
             (flashcard_id, easiness_factor, interval_days, repetitions, next_review_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            flashcard_id,
            state.ease_factor,
            state.interval_days,
            state.repetitions,
            state.next_review_date.format(DATE_FORMAT).to_string()
        ],
    )?;

    Ok(flashcard_id)
}

/// Deletes a flashcard together with its memory state and review history.
/// Returns false if no such card existed.
pub fn delete_flashcard(flashcard_id: i64, conn: &Connection) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM flashcards WHERE id = ?1", params![flashcard_id])?;
    Ok(deleted > 0)
}

/// Retrieves all flashcards for a given deck
///
/// Returns vector of (flashcard_id, Flashcard) tuples
pub fn get_flashcards_for_deck(
    deck_name: &str,
    conn: &Connection,
) -> Result<Vec<(i64, Flashcard)>> {
    let mut stmt = conn
        .prepare("SELECT id, term, definition FROM flashcards WHERE deck_name = ?1 ORDER BY id")?;

    let flashcards = stmt
        .query_map(params![deck_name], |row| {
            Ok((row.get(0)?, Flashcard::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
        })?
        .collect::<Result<Vec<(i64, Flashcard)>>>()?;

    Ok(flashcards)
}

/// Reads a single card's scheduling record
pub fn get_review_data(flashcard_id: i64, conn: &Connection) -> Result<Option<ReviewData>> {
    let today = get_current_date(conn)?;
    conn.query_row(
        "SELECT flashcard_id, easiness_factor, interval_days, repetitions, next_review_date,
                last_reviewed_at
         FROM review_data WHERE flashcard_id = ?1",
        params![flashcard_id],
        |row| review_data_from_row(row, 0, today),
    )
    .optional()
}

/// Reads a single card with its scheduling record
pub fn get_card_with_review_data(
    flashcard_id: i64,
    conn: &Connection,
) -> Result<Option<(Flashcard, ReviewData)>> {
    let today = get_current_date(conn)?;
    conn.query_row(
        "SELECT f.term, f.definition, r.flashcard_id, r.easiness_factor, r.interval_days,
                r.repetitions, r.next_review_date, r.last_reviewed_at
         FROM flashcards f
         JOIN review_data r ON f.id = r.flashcard_id
         WHERE f.id = ?1",
        params![flashcard_id],
        |row| {
            Ok((
                Flashcard::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?),
                review_data_from_row(row, 2, today)?,
            ))
        },
    )
    .optional()
}

/// Overwrites a card's memory state and last review time.
/// Returns false if the card has no scheduling record.
pub fn update_review_data(review_data: &ReviewData, conn: &Connection) -> Result<bool> {
    let state = &review_data.state;
    let updated = conn.execute(
        "UPDATE review_data
         SET easiness_factor = ?1, interval_days = ?2, repetitions = ?3, next_review_date = ?4,
             last_reviewed_at = ?5
         WHERE flashcard_id = ?6",
        params![
            state.ease_factor,
            state.interval_days,
            state.repetitions,
            state.next_review_date.format(DATE_FORMAT).to_string(),
            review_data.last_reviewed_at,
            review_data.flashcard_id
        ],
    )?;

    Ok(updated > 0)
}

/// Persists a scheduled review: the new memory state and its history entry
/// are written in one transaction.
///
/// Returns false, writing nothing, if the card has no scheduling record.
pub fn record_review(review_data: &ReviewData, log: &ReviewLog, conn: &Connection) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;

    if !update_review_data(review_data, &tx)? {
        tracing::warn!("No scheduling record for card {}, review dropped", review_data.flashcard_id);
        return Ok(false);
    }
    tx.execute(
        "INSERT INTO review_history
             (flashcard_id, quality, ease_before, ease_after, interval_before, interval_after,
              reviewed_on, reviewed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            log.flashcard_id,
            log.quality,
            log.ease_before,
            log.ease_after,
            log.interval_before,
            log.interval_after,
            log.reviewed_on.format(DATE_FORMAT).to_string(),
            log.reviewed_at
        ],
    )?;

    tx.commit()?;
    Ok(true)
}

/// Rates a card on the current (possibly simulated) date: reschedules it with
/// SM-2 and records the review.
///
/// Returns the stored record and its history entry, or `None` if the card
/// does not exist.
pub fn grade_card(
    flashcard_id: i64,
    quality: ReviewQuality,
    conn: &Connection,
) -> Result<Option<(ReviewData, ReviewLog)>> {
    let Some(current) = get_review_data(flashcard_id, conn)? else {
        return Ok(None);
    };
    let today = get_current_date(conn)?;
    let now = Utc::now();

    let review_data = ReviewData {
        flashcard_id,
        state: schedule_on(&current.state, quality, today),
        last_reviewed_at: Some(now),
    };
    let log = ReviewLog::new(flashcard_id, quality, &current.state, &review_data.state, today, now);
    if !record_review(&review_data, &log, conn)? {
        return Ok(None);
    }

    tracing::debug!(
        "Card {} rated {}: ease {:.2} -> {:.2}, interval {} -> {} days, due {}",
        flashcard_id,
        quality,
        log.ease_before,
        log.ease_after,
        log.interval_before,
        log.interval_after,
        review_data.state.next_review_date
    );
    Ok(Some((review_data, log)))
}

/// Review history of a card, oldest first
pub fn get_review_history(flashcard_id: i64, conn: &Connection) -> Result<Vec<ReviewLog>> {
    let today = get_current_date(conn)?;
    let mut stmt = conn.prepare(
        "SELECT flashcard_id, quality, ease_before, ease_after, interval_before, interval_after,
                reviewed_on, reviewed_at
         FROM review_history WHERE flashcard_id = ?1 ORDER BY id ASC",
    )?;

    let history = stmt
        .query_map(params![flashcard_id], |row| {
            Ok(ReviewLog {
                flashcard_id: row.get(0)?,
                quality: row.get(1)?,
                ease_before: row.get(2)?,
                ease_after: row.get(3)?,
                interval_before: non_negative_count(row.get(4)?),
                interval_after: non_negative_count(row.get(5)?),
                reviewed_on: parse_date_or(&row.get::<_, String>(6)?, today),
                reviewed_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(history)
}

/// All cards of a deck with their scheduling records, ordered by ID
pub fn get_cards_with_review_data(
    deck_name: &str,
    conn: &Connection,
) -> Result<Vec<(i64, Flashcard, ReviewData)>> {
    let today = get_current_date(conn)?;
    let mut stmt = conn.prepare(
        "SELECT f.id, f.term, f.definition, r.flashcard_id, r.easiness_factor, r.interval_days,
                r.repetitions, r.next_review_date, r.last_reviewed_at
         FROM flashcards f
         JOIN review_data r ON f.id = r.flashcard_id
         WHERE f.deck_name = ?1
         ORDER BY f.id ASC",
    )?;

    let cards = stmt
        .query_map(params![deck_name], |row| {
            Ok((
                row.get(0)?,
                Flashcard::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
                review_data_from_row(row, 3, today)?,
            ))
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(cards)
}

/// Retrieves flashcards due for review in a deck
///
/// A card is due when its next review date is the current date or earlier.
/// Ordered by next review date (oldest first), then by ID.
pub fn get_flashcards_due_for_review(
    deck_name: &str,
    conn: &Connection,
) -> Result<Vec<(i64, Flashcard, ReviewData)>> {
    let today = get_current_date(conn)?;

    let mut due_cards: Vec<_> = get_cards_with_review_data(deck_name, conn)?
        .into_iter()
        .filter(|(_, _, rd)| is_due_on(rd.state.next_review_date, today))
        .collect();
    due_cards.sort_by_key(|(id, _, rd)| (rd.state.next_review_date, *id));

    Ok(due_cards)
}

pub fn deck_stats(deck_name: &str, conn: &Connection) -> Result<DeckStats> {
    let today = get_current_date(conn)?;
    let cards = get_cards_with_review_data(deck_name, conn)?;

    let reviews_today: i64 = conn.query_row(
        "SELECT COUNT(*)
         FROM review_history h
         JOIN flashcards f ON f.id = h.flashcard_id
         WHERE f.deck_name = ?1 AND h.reviewed_on = ?2",
        params![deck_name, today.format(DATE_FORMAT).to_string()],
        |row| row.get(0),
    )?;

    Ok(DeckStats {
        total_cards: cards.len(),
        due_cards: cards
            .iter()
            .filter(|(_, _, rd)| is_due_on(rd.state.next_review_date, today))
            .count(),
        new_cards: cards
            .iter()
            .filter(|(_, _, rd)| rd.last_reviewed_at.is_none())
            .count(),
        reviews_today: usize::try_from(reviews_today).unwrap_or(0),
    })
}

/// Retrieves all deck names from database
pub fn get_all_decks(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM decks ORDER BY name")?;
    let decks = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>>>()?;
    Ok(decks)
}

/// Loads all decks with their flashcards into memory
///
/// Does not load SM-2 memory state - that's fetched separately when starting a learning session.
pub fn load_all_decks(conn: &Connection) -> Result<DeckSet> {
    let mut decks = Vec::new();

    for deck_name in get_all_decks(conn)? {
        let flashcards_with_ids = get_flashcards_for_deck(&deck_name, conn)?;
        // Strip IDs - we only need them for review sessions
        let flashcards = flashcards_with_ids.into_iter().map(|(_, fc)| fc).collect();

        decks.push(Deck {
            name: deck_name,
            flashcards,
        });
    }

    Ok(DeckSet { decks })
}

/// Loads one deck including each card's memory state, for export
pub fn load_deck_with_memory(deck_name: &str, conn: &Connection) -> Result<Option<Deck>> {
    if !deck_exists(deck_name, conn)? {
        return Ok(None);
    }

    let flashcards = get_cards_with_review_data(deck_name, conn)?
        .into_iter()
        .map(|(_, mut fc, rd)| {
            fc.memory = Some(rd.state);
            fc
        })
        .collect();

    Ok(Some(Deck {
        name: deck_name.to_string(),
        flashcards,
    }))
}

/// Inserts an imported deck, creating it if needed.
///
/// Cards carrying a memory state keep it with the ease factor raised to the
/// SM-2 floor, others start fresh. Cards whose term already exists in the deck
/// are left untouched. Returns the number of cards added.
pub fn import_deck(deck: &Deck, conn: &Connection) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let today = get_current_date(&tx)?;

    if !deck_exists(&deck.name, &tx)? {
        new_deck(&deck.name, &tx)?;
    }

    let before = get_flashcards_for_deck(&deck.name, &tx)?.len();
    for card in &deck.flashcards {
        let state = card
            .memory
            .clone()
            .map(CardMemoryState::clamped)
            .unwrap_or_else(|| CardMemoryState::new(today));
        insert_flashcard(&deck.name, &card.term, &card.definition, &state, &tx)?;
    }
    let added = get_flashcards_for_deck(&deck.name, &tx)?.len() - before;

    tx.commit()?;
    tracing::info!("Imported {} cards into deck '{}'", added, deck.name);
    Ok(added)
}

/// Builds a `ReviewData` from the six review_data columns starting at `offset`
fn review_data_from_row(row: &Row<'_>, offset: usize, today: NaiveDate) -> Result<ReviewData> {
    let flashcard_id: i64 = row.get(offset)?;
    let next_review_date: String = row.get(offset + 4)?;

    Ok(ReviewData {
        flashcard_id,
        state: CardMemoryState {
            ease_factor: row.get(offset + 1)?,
            interval_days: non_negative_count(row.get(offset + 2)?),
            repetitions: non_negative_count(row.get(offset + 3)?),
            next_review_date: parse_date_or(&next_review_date, today),
        },
        last_reviewed_at: row.get(offset + 5)?,
    })
}

fn parse_date_or_today(value: &str) -> NaiveDate {
    parse_date_or(value, due::today())
}

/// Unreadable dates fall back to `fallback`, which makes the card due.
fn parse_date_or(value: &str, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::parse_from_str(value, DATE_FORMAT).unwrap_or_else(|e| {
        tracing::warn!("Unreadable stored date '{}' ({}), using {}", value, e, fallback);
        fallback
    })
}
