//! Command line and environment configuration. Every knob has an environment
//! fallback so a desktop launcher can configure the app without arguments.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use directories::BaseDirs;

use crate::db::{AssetDir, DatasetSource, EmbeddedDataset, RemoteAssets};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".cancionero";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "cancionero.sqlite";
/// Log file written while the TUI owns the terminal.
const LOG_FILE_NAME: &str = "cancionero.log";

#[derive(Debug, Parser)]
#[command(name = "cancionero", version, about = "Browse song lyrics offline")]
pub struct Cli {
    /// SQLite database file.
    #[arg(long, env = "CANCIONERO_DB", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Where to load the seed dataset from: `bundled`, an http(s) asset root,
    /// or an asset directory containing data/songs.json.
    #[arg(long, env = "CANCIONERO_ASSETS", value_name = "SRC", default_value = "bundled")]
    pub assets: AssetSource,

    /// Log file used by the interactive browser.
    #[arg(long, env = "CANCIONERO_LOG", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive list/detail browser (default).
    Browse,
    /// Print every song, ordered by title.
    List,
    /// Print songs whose title or lyrics contain QUERY.
    Search { query: String },
    /// Print one song with its lyrics. Anything that is not a positive
    /// integer is reported as not found.
    Show { id: String },
    /// Print catalog statistics.
    Stats,
}

/// Origin of the bundled dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Bundled,
    Remote(String),
    Directory(PathBuf),
}

impl std::str::FromStr for AssetSource {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("asset source cannot be empty".to_string());
        }
        if trimmed.eq_ignore_ascii_case("bundled") {
            Ok(Self::Bundled)
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(Self::Remote(trimmed.to_string()))
        } else {
            Ok(Self::Directory(PathBuf::from(trimmed)))
        }
    }
}

impl AssetSource {
    pub fn into_dataset(self) -> Box<dyn DatasetSource> {
        match self {
            Self::Bundled => Box::new(EmbeddedDataset),
            Self::Remote(url) => Box::new(RemoteAssets::new(url)),
            Self::Directory(root) => Box::new(AssetDir::new(root)),
        }
    }
}

/// Interpret a song id typed by the user. Only positive integers can name a
/// song; everything else yields `None`.
pub fn parse_song_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Fully resolved settings used by the bootstrap.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub assets: AssetSource,
    pub log_file: PathBuf,
    pub command: Command,
}

impl Cli {
    /// Fill in defaults that depend on the user's home directory.
    pub fn resolve(self) -> Result<Settings> {
        let db_path = match self.db {
            Some(path) => path,
            None => data_dir()?.join(DB_FILE_NAME),
        };
        let log_file = match self.log_file {
            Some(path) => path,
            None => db_path
                .parent()
                .map(|dir| dir.join(LOG_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME)),
        };

        Ok(Settings {
            db_path,
            assets: self.assets,
            log_file,
            command: self.command.unwrap_or(Command::Browse),
        })
    }
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
