use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::unsync::OnceCell;
use rusqlite::Connection;

use crate::error::{CatalogError, Result};

/// How long a second process waits for the write lock while another one is
/// seeding the same file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the embedded database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private in-memory database, gone when the handle drops.
    Memory,
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}

/// Owner of the single SQLite connection used by the whole application.
///
/// The connection is opened lazily on the first [`Store::acquire`] and then
/// reused for the lifetime of the handle, so schema creation runs once per
/// process. Construct one at startup and pass it by reference to the
/// hydrator, the queries and the UI.
#[derive(Debug)]
pub struct Store {
    location: StoreLocation,
    conn: OnceCell<Connection>,
}

impl Store {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            conn: OnceCell::new(),
        }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Whether the underlying connection has been established yet.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Return the live connection, opening the database and creating the
    /// schema on first use. A failed open leaves the handle untouched so the
    /// caller may retry.
    pub fn acquire(&self) -> Result<&Connection> {
        self.conn.get_or_try_init(|| open_connection(&self.location))
    }
}

/// Open (creating if absent) the database at `location` and make sure every
/// table exists.
fn open_connection(location: &StoreLocation) -> Result<Connection> {
    let conn = match location {
        StoreLocation::File(path) => {
            ensure_parent_dir(path)?;
            Connection::open(path)
        }
        StoreLocation::Memory => Connection::open_in_memory(),
    }
    .map_err(|err| {
        CatalogError::initialization(format!("failed to open {location}"), err)
    })?;

    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|err| CatalogError::initialization("failed to set busy timeout", err))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(|err| CatalogError::initialization("failed to enable foreign keys", err))?;

    ensure_schema(&conn)?;

    tracing::info!(store = %location, "song store opened");
    Ok(conn)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|err| {
                CatalogError::initialization(
                    format!("failed to create data directory {}", parent.display()),
                    err,
                )
            }),
        _ => Ok(()),
    }
}

/// Create the catalog and the collection/override tables. Collections and
/// overrides are not read or written by anything yet; they are kept so that
/// databases created by this version stay compatible once they are.
fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT,
            lyrics TEXT,
            "key" TEXT,
            category TEXT
        )"#,
        [],
    )
    .map_err(|err| CatalogError::initialization("failed to create songs table", err))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )
    .map_err(|err| CatalogError::initialization("failed to create collections table", err))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS collection_songs (
            collection_id INTEGER NOT NULL,
            song_id INTEGER NOT NULL,
            PRIMARY KEY (collection_id, song_id),
            FOREIGN KEY(collection_id) REFERENCES collections(id) ON DELETE CASCADE,
            FOREIGN KEY(song_id) REFERENCES songs(id) ON DELETE CASCADE
        )",
        [],
    )
    .map_err(|err| {
        CatalogError::initialization("failed to create collection_songs table", err)
    })?;

    conn.execute(
        r#"CREATE TABLE IF NOT EXISTS user_overrides (
            song_id INTEGER PRIMARY KEY,
            "key" TEXT,
            FOREIGN KEY(song_id) REFERENCES songs(id) ON DELETE CASCADE
        )"#,
        [],
    )
    .map_err(|err| CatalogError::initialization("failed to create user_overrides table", err))?;

    Ok(())
}
