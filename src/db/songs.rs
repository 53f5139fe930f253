use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{CatalogError, Result};
use crate::models::{Song, SONG_COLUMNS};

/// Escape character used with `LIKE ... ESCAPE` in [`search`].
const LIKE_ESCAPE: char = '\\';

/// Number of rows in the catalog. The hydrator uses this as its "already
/// seeded" gate.
pub fn count_songs(conn: &Connection) -> Result<u64> {
    conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get::<_, i64>(0))
        .map(|count| count.max(0) as u64)
        .map_err(|err| CatalogError::query("failed to count songs", err))
}

/// Fetch every song ordered by title (store collation), ties broken by
/// insertion order.
pub fn list_all(conn: &Connection) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SONG_COLUMNS} FROM songs ORDER BY title ASC, id ASC"
        ))
        .map_err(|err| CatalogError::query("failed to prepare song list", err))?;

    let songs = stmt
        .query_map([], Song::from_row)
        .map_err(|err| CatalogError::query("failed to iterate songs", err))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|err| CatalogError::query("failed to collect songs", err))?;

    tracing::debug!(count = songs.len(), "listed songs");
    Ok(songs)
}

/// Look a song up by its identifier. Ids that are not positive can never
/// match a row and short-circuit to `None`.
pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Song>> {
    if id <= 0 {
        return Ok(None);
    }

    conn.query_row(
        &format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?1"),
        params![id],
        Song::from_row,
    )
    .optional()
    .map_err(|err| CatalogError::query(format!("failed to load song {id}"), err))
}

/// Case-insensitive substring search over titles and lyrics, ordered like
/// [`list_all`]. The query is bound as a parameter and its `%`/`_` wildcards
/// are escaped, so it always matches literally. Only the empty string lists
/// every song; whitespace is searched for like any other text.
pub fn search(conn: &Connection, query: &str) -> Result<Vec<Song>> {
    if query.is_empty() {
        return list_all(conn);
    }

    let pattern = format!("%{}%", escape_like(query));
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SONG_COLUMNS}
             FROM songs
             WHERE title LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
                OR lyrics LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
             ORDER BY title ASC, id ASC"
        ))
        .map_err(|err| CatalogError::query("failed to prepare song search", err))?;

    let songs = stmt
        .query_map(params![pattern], Song::from_row)
        .map_err(|err| CatalogError::query("failed to run song search", err))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|err| CatalogError::query("failed to collect search results", err))?;

    tracing::debug!(query, count = songs.len(), "searched songs");
    Ok(songs)
}

/// Prefix every LIKE metacharacter (and the escape character itself) so the
/// text matches only itself.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}
