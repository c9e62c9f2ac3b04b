//! Application configuration.
//!
//! Values are resolved with priority: config.toml > .env / environment > defaults.

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_PATH: &str = "db.sqlite3";
pub const CONFIG_FILE: &str = "config.toml";

/// Name of the deck created on first run.
pub const SAMPLE_DECK_NAME: &str = "Polish Vocabulary";

/// Cards of the sample deck as (term, definition)
pub const SAMPLE_CARDS: [(&str, &str); 3] = [
    ("cześć", "hello"),
    ("dziękuję", "thank you"),
    ("proszę", "please"),
];

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<DatabaseSection>,
    study: Option<StudySection>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StudySection {
    seed_sample_deck: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub seed_sample_deck: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            seed_sample_deck: true,
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory, falling back to .env and defaults.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new(CONFIG_FILE), std::env::var("DATABASE_PATH").ok())
    }

    /// Resolves configuration from an optional TOML file and an optional
    /// `DATABASE_PATH` value. A missing file is fine, a malformed one is not.
    pub fn load_from(config_file: &Path, env_database_path: Option<String>) -> Result<Self> {
        let file_config = match std::fs::read_to_string(config_file) {
            Ok(contents) => toml::from_str::<FileConfig>(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self::resolve(file_config, env_database_path))
    }

    fn resolve(file_config: FileConfig, env_database_path: Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(path) = file_config.database.and_then(|db| db.path) {
            tracing::info!("Using database from config.toml: {}", path);
            config.database_path = PathBuf::from(path);
        } else if let Some(path) = env_database_path {
            tracing::info!("Using database from DATABASE_PATH env: {}", path);
            config.database_path = PathBuf::from(path);
        } else {
            tracing::info!(
                "Using default database path: {}",
                config.database_path.display()
            );
        }

        if let Some(seed) = file_config.study.and_then(|s| s.seed_sample_deck) {
            config.seed_sample_deck = seed;
        }

        config
    }
}
