use clap::{Parser, Subcommand};
use flashcard_scheduler::config::{self, Config};
use flashcard_scheduler::database::db;
use flashcard_scheduler::error::{AppError, Result};
use flashcard_scheduler::export::json::{export_json_to_path, import_json};
use flashcard_scheduler::models::due::days_until_due_from;
use flashcard_scheduler::models::sm2::{format_interval, preview_intervals};
use flashcard_scheduler::{LearningSession, ReviewQuality};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flashcards")]
#[command(about = "Flashcards with SM-2 spaced repetition scheduling")]
struct Cli {
    /// SQLite database file (overrides config.toml and DATABASE_PATH)
    #[arg(short, long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List decks with due and new card counts
    Decks,
    /// Create an empty deck
    AddDeck {
        name: String,
    },
    /// Add a card to a deck, due today
    AddCard {
        deck: String,
        term: String,
        definition: String,
    },
    /// List cards due for review in a deck
    Due {
        deck: String,
    },
    /// Review due cards interactively
    Study {
        deck: String,
    },
    /// Record a single review: again, hard, good, easy (or 1-4)
    Grade {
        card_id: i64,
        quality: String,
    },
    /// Show what each rating would schedule for a card
    Preview {
        card_id: i64,
    },
    /// Show every recorded review of a card, oldest first
    History {
        card_id: i64,
    },
    /// Delete a card together with its schedule and history
    DeleteCard {
        card_id: i64,
    },
    /// Show the current (simulated) date
    Today,
    /// Advance the simulated date by one day
    NextDay,
    /// Reset the simulated date to the real date
    ResetDay,
    /// Write a deck and its scheduling state to a JSON file
    Export {
        deck: String,
        path: PathBuf,
    },
    /// Load a deck from a JSON file, skipping terms already present
    Import {
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashcard_scheduler=info,flashcards=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }

    let conn = db::init_database(&config.database_path)?;
    if config.seed_sample_deck && db::get_all_decks(&conn)?.is_empty() {
        seed_sample_deck(&conn)?;
    }

    match cli.command {
        Commands::Decks => {
            let today = db::get_current_date(&conn)?;
            let deck_set = db::load_all_decks(&conn)?;
            println!(
                "Today: {} ({} cards in {} decks)",
                today,
                deck_set.total_cards(),
                deck_set.decks.len()
            );
            for deck in deck_set.decks {
                let stats = db::deck_stats(&deck.name, &conn)?;
                println!(
                    "  - {} ({} cards, {} due, {} new, {} reviewed today)",
                    deck.name,
                    stats.total_cards,
                    stats.due_cards,
                    stats.new_cards,
                    stats.reviews_today
                );
            }
        }
        Commands::AddDeck { name } => {
            db::new_deck(&name, &conn)?;
            println!("Deck '{}' created.", name);
        }
        Commands::AddCard {
            deck,
            term,
            definition,
        } => {
            require_deck(&deck, &conn)?;
            let id = db::add_flashcard(&deck, &term, &definition, &conn)?;
            println!("Card {} in '{}': {} -> {}", id, deck, term, definition);
        }
        Commands::Due { deck } => {
            require_deck(&deck, &conn)?;
            let today = db::get_current_date(&conn)?;
            let due = db::get_flashcards_due_for_review(&deck, &conn)?;
            println!("{} cards due in '{}' on {}", due.len(), deck, today);
            for (id, card, rd) in due {
                let overdue = -days_until_due_from(rd.state.next_review_date, today);
                println!(
                    "  [{}] {} (ease {:.2}, {} overdue)",
                    id,
                    card.term,
                    rd.state.ease_factor,
                    if overdue == 0 {
                        "not".to_string()
                    } else {
                        format!("{}d", overdue)
                    }
                );
            }
        }
        Commands::Study { deck } => study(&deck, conn)?,
        Commands::Grade { card_id, quality } => {
            let quality: ReviewQuality = quality.parse()?;
            let (rd, _) = db::grade_card(card_id, quality, &conn)?.ok_or(AppError::CardNotFound(card_id))?;
            println!(
                "Card {} rated {}: next review {} ({}), ease {:.2}",
                card_id,
                quality,
                rd.state.next_review_date,
                format_interval(rd.state.interval_days),
                rd.state.ease_factor
            );
        }
        Commands::Preview { card_id } => {
            let (card, rd) =
                db::get_card_with_review_data(card_id, &conn)?.ok_or(AppError::CardNotFound(card_id))?;
            let today = db::get_current_date(&conn)?;
            println!("{} (repetitions {}, ease {:.2})", card.term, rd.state.repetitions, rd.state.ease_factor);
            for (quality, state) in preview_intervals(&rd.state, today) {
                println!(
                    "  {:<5} -> {:>4}  ease {:.2}",
                    quality,
                    format_interval(state.interval_days),
                    state.ease_factor
                );
            }
        }
        Commands::History { card_id } => {
            let history = db::get_review_history(card_id, &conn)?;
            if history.is_empty() {
                println!("No reviews recorded for card {}", card_id);
            }
            for log in history {
                println!(
                    "  {} {:<5} ease {:.2} -> {:.2}, interval {} -> {}{}",
                    log.reviewed_on,
                    log.quality,
                    log.ease_before,
                    log.ease_after,
                    log.interval_before,
                    log.interval_after,
                    if log.was_lapse() { " (lapse)" } else { "" }
                );
            }
        }
        Commands::DeleteCard { card_id } => {
            if !db::delete_flashcard(card_id, &conn)? {
                return Err(AppError::CardNotFound(card_id));
            }
            println!("Card {} deleted.", card_id);
        }
        Commands::Today => println!("{}", db::get_current_date(&conn)?),
        Commands::NextDay => println!("{}", db::advance_day(&conn)?),
        Commands::ResetDay => println!("{}", db::reset_current_date(&conn)?),
        Commands::Export { deck, path } => {
            let deck = db::load_deck_with_memory(&deck, &conn)?.ok_or(AppError::DeckNotFound(deck))?;
            export_json_to_path(&deck, &path)?;
            println!("Deck '{}' exported to '{}'", deck.name, path.display());
        }
        Commands::Import { path } => {
            let deck = import_json(&path)?;
            let added = db::import_deck(&deck, &conn)?;
            println!("Deck '{}' imported: {} new cards", deck.name, added);
        }
    }

    Ok(())
}

fn seed_sample_deck(conn: &Connection) -> Result<()> {
    db::new_deck(config::SAMPLE_DECK_NAME, conn)?;
    for (term, definition) in config::SAMPLE_CARDS {
        db::add_flashcard(config::SAMPLE_DECK_NAME, term, definition, conn)?;
    }
    println!("Sample data created!");
    Ok(())
}

fn require_deck(deck: &str, conn: &Connection) -> Result<()> {
    if db::deck_exists(deck, conn)? {
        Ok(())
    } else {
        Err(AppError::DeckNotFound(deck.to_string()))
    }
}

/// Interactive review loop: Enter reveals the definition, then a rating is read.
fn study(deck: &str, conn: Connection) -> Result<()> {
    let mut session = LearningSession::start(deck, Arc::new(Mutex::new(conn)))?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut current_round = 0;

    while !session.is_completed() {
        if session.round_number != current_round {
            current_round = session.round_number;
            println!("\n{}", session.phase_message());
        }
        let Some(card) = session.current_card() else {
            break;
        };

        print!("\n{}  [Enter to reveal, q to quit] ", card.flashcard.term);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        if line?.trim() == "q" {
            break;
        }
        session.toggle_definition();
        if let Some(card) = session.current_card() {
            println!("  {}", card.flashcard.definition);
        }

        let quality = loop {
            print!("  Rate 1=again 2=hard 3=good 4=easy: ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return finish(&session);
            };
            match line?.parse::<ReviewQuality>() {
                Ok(quality) => break quality,
                Err(e) => println!("  {}", e),
            }
        };

        if let Some(state) = session.grade_current_card(quality)? {
            println!(
                "  Next review {} ({})",
                state.next_review_date,
                format_interval(state.interval_days)
            );
        }
        session.next_card();
    }

    finish(&session)
}

fn finish(session: &LearningSession) -> Result<()> {
    if session.is_completed() {
        println!("\nSession complete: {} reviews recorded.", session.reviews_recorded);
    } else {
        println!(
            "\nSession paused: {} reviews recorded, {} cards left this round.",
            session.reviews_recorded,
            session.remaining_count()
        );
    }
    Ok(())
}
