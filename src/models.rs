//! Domain models that mirror the SQLite schema and the bundled dataset. They
//! stay light-weight data holders so the persistence and presentation layers
//! can pass them around freely.

use std::fmt;

use rusqlite::Row;
use serde::Deserialize;

/// Column list shared by every query that decodes a [`Song`]. The order must
/// match [`Song::from_row`].
pub(crate) const SONG_COLUMNS: &str = r#"id, title, artist, lyrics, "key", category"#;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A song as stored in the catalog. Optional columns decode to empty strings
/// so views never have to juggle `Option`s.
pub struct Song {
    /// Store-assigned primary key, stable for the lifetime of the row.
    pub id: i64,
    pub title: String,
    pub artist: String,
    /// Multi-line lyrics, rendered verbatim.
    pub lyrics: String,
    /// Musical key notation (e.g. `G`, `Am`).
    pub key: String,
    pub category: String,
}

impl Song {
    /// Fixed decoder for rows selected with [`SONG_COLUMNS`]. NULL optional
    /// columns become empty strings.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            artist: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            lyrics: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            key: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            category: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        })
    }

    /// Compose a `Title - Artist` string that omits the hyphen if the artist
    /// is blank.
    pub fn display_title(&self) -> String {
        if self.artist.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artist)
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// One entry of the bundled dataset. Every field is optional on the wire;
/// real-world song dumps are sloppy and a record without a title is still
/// accepted.
pub struct SongRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl SongRecord {
    /// Convenience constructor for a record that only carries a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Field values in insert order (`title, artist, lyrics, key, category`)
    /// with missing values defaulted to empty strings.
    pub(crate) fn column_values(&self) -> [&str; 5] {
        [
            self.title.as_deref().unwrap_or_default(),
            self.artist.as_deref().unwrap_or_default(),
            self.lyrics.as_deref().unwrap_or_default(),
            self.key.as_deref().unwrap_or_default(),
            self.category.as_deref().unwrap_or_default(),
        ]
    }
}
