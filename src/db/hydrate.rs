use rusqlite::{Transaction, TransactionBehavior};

use crate::db::connection::Store;
use crate::db::dataset::DatasetSource;
use crate::db::songs::count_songs;
use crate::error::{CatalogError, Result};

/// What [`hydrate_if_empty`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// The catalog already had rows; nothing was fetched or written.
    AlreadyHydrated { existing: u64 },
    /// The catalog was empty and the whole dataset was committed.
    Seeded { inserted: usize },
}

/// Seed the catalog from `source` if, and only if, it is currently empty.
///
/// The dataset is fetched only after the emptiness check, and every record is
/// inserted inside one IMMEDIATE transaction: either the full dataset is
/// committed or nothing is. Emptiness is re-checked once the write lock is
/// held, so two processes launching against the same file never both seed.
pub fn hydrate_if_empty<S>(store: &Store, source: &S) -> Result<Hydration>
where
    S: DatasetSource + ?Sized,
{
    let conn = store.acquire()?;

    let existing = count_songs(conn).map_err(as_hydration_failure)?;
    if existing > 0 {
        tracing::info!(existing, "catalog already hydrated");
        return Ok(Hydration::AlreadyHydrated { existing });
    }

    tracing::info!(origin = %source.origin(), "hydrating catalog");
    let records = source.fetch()?;

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|err| CatalogError::hydration("failed to begin transaction", err))?;

    // Another process may have seeded while we were fetching.
    let existing = count_songs(&tx).map_err(as_hydration_failure)?;
    if existing > 0 {
        tracing::info!(existing, "catalog hydrated concurrently, skipping");
        return Ok(Hydration::AlreadyHydrated { existing });
    }

    {
        let mut stmt = tx
            .prepare(
                r#"INSERT INTO songs (title, artist, lyrics, "key", category)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
            )
            .map_err(|err| CatalogError::hydration("failed to prepare song insert", err))?;

        for (index, record) in records.iter().enumerate() {
            stmt.execute(record.column_values()).map_err(|err| {
                tracing::error!(index, error = %err, "song insert failed, rolling back");
                CatalogError::hydration(format!("failed to insert record {index}"), err)
            })?;
        }
    }

    tx.commit()
        .map_err(|err| CatalogError::hydration("failed to commit hydration", err))?;

    tracing::info!(inserted = records.len(), "catalog hydrated");
    Ok(Hydration::Seeded {
        inserted: records.len(),
    })
}

/// A failed emptiness check aborts seeding, so it is reported as a hydration
/// failure rather than an ordinary read failure.
fn as_hydration_failure(err: CatalogError) -> CatalogError {
    match err {
        CatalogError::Query { context, source } => CatalogError::Hydration { context, source },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::db::dataset::StaticDataset;
    use crate::db::songs::{get_by_id, list_all};
    use crate::models::SongRecord;

    /// Dataset that counts how often it was fetched.
    struct CountingDataset {
        inner: StaticDataset,
        fetches: Cell<usize>,
    }

    impl DatasetSource for CountingDataset {
        fn origin(&self) -> String {
            "counting".to_string()
        }

        fn fetch(&self) -> Result<Vec<SongRecord>> {
            self.fetches.set(self.fetches.get() + 1);
            self.inner.fetch()
        }
    }

    struct FailingDataset;

    impl DatasetSource for FailingDataset {
        fn origin(&self) -> String {
            "nowhere".to_string()
        }

        fn fetch(&self) -> Result<Vec<SongRecord>> {
            Err(CatalogError::fetch(
                self.origin(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "404"),
            ))
        }
    }

    fn dataset(titles: &[&str]) -> StaticDataset {
        StaticDataset::new(titles.iter().map(|t| SongRecord::titled(*t)).collect())
    }

    #[test]
    fn seeds_empty_catalog_and_skips_afterwards() {
        let store = Store::in_memory();
        let source = CountingDataset {
            inner: dataset(&["Zeta", "Alpha", "Mu"]),
            fetches: Cell::new(0),
        };

        assert_eq!(
            hydrate_if_empty(&store, &source).unwrap(),
            Hydration::Seeded { inserted: 3 }
        );
        for _ in 0..4 {
            assert_eq!(
                hydrate_if_empty(&store, &source).unwrap(),
                Hydration::AlreadyHydrated { existing: 3 }
            );
        }

        assert_eq!(source.fetches.get(), 1);
        assert_eq!(count_songs(store.acquire().unwrap()).unwrap(), 3);
    }

    #[test]
    fn ids_follow_dataset_order() {
        let store = Store::in_memory();
        hydrate_if_empty(&store, &dataset(&["Zeta", "Alpha"])).unwrap();

        let conn = store.acquire().unwrap();
        let songs = list_all(conn).unwrap();
        assert_eq!(songs[0].title, "Alpha");
        assert_eq!(songs[1].title, "Zeta");
        assert!(songs[1].id < songs[0].id);
    }

    #[test]
    fn failed_insert_rolls_back_everything() {
        let store = Store::in_memory();
        let conn = store.acquire().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON songs
             WHEN NEW.title = 'Boom'
             BEGIN SELECT RAISE(ABORT, 'simulated insert failure'); END;",
        )
        .unwrap();

        let err = hydrate_if_empty(&store, &dataset(&["One", "Two", "Boom", "Four"])).unwrap_err();
        assert!(matches!(err, CatalogError::Hydration { .. }));
        assert_eq!(count_songs(conn).unwrap(), 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn retry_after_rollback_can_succeed() {
        let store = Store::in_memory();
        let conn = store.acquire().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON songs
             WHEN NEW.title = 'Boom'
             BEGIN SELECT RAISE(ABORT, 'simulated insert failure'); END;",
        )
        .unwrap();
        assert!(hydrate_if_empty(&store, &dataset(&["A", "Boom"])).is_err());

        conn.execute_batch("DROP TRIGGER reject_boom").unwrap();
        assert_eq!(
            hydrate_if_empty(&store, &dataset(&["A", "Boom"])).unwrap(),
            Hydration::Seeded { inserted: 2 }
        );
    }

    #[test]
    fn failed_emptiness_check_is_a_hydration_failure() {
        let store = Store::in_memory();
        let conn = store.acquire().unwrap();
        conn.execute_batch(
            "DROP TABLE collection_songs;
             DROP TABLE user_overrides;
             DROP TABLE songs;",
        )
        .unwrap();

        let err = hydrate_if_empty(&store, &dataset(&["Alpha"])).unwrap_err();
        assert!(matches!(err, CatalogError::Hydration { .. }));
        assert!(err.is_startup_failure());
    }

    #[test]
    fn fetch_failure_writes_nothing() {
        let store = Store::in_memory();
        let err = hydrate_if_empty(&store, &FailingDataset).unwrap_err();
        assert!(matches!(err, CatalogError::Fetch { .. }));
        assert_eq!(count_songs(store.acquire().unwrap()).unwrap(), 0);
    }

    #[test]
    fn empty_dataset_is_a_successful_no_op() {
        let store = Store::in_memory();
        assert_eq!(
            hydrate_if_empty(&store, &StaticDataset::default()).unwrap(),
            Hydration::Seeded { inserted: 0 }
        );
        assert!(list_all(store.acquire().unwrap()).unwrap().is_empty());
    }

    #[test]
    fn quoted_text_round_trips_exactly() {
        let store = Store::in_memory();
        let source = StaticDataset::new(vec![
            SongRecord::titled("O'Brien's Song").with_lyrics("it's \"quoted\"\nline two"),
            SongRecord::titled("'); DROP TABLE songs; --"),
            SongRecord::titled("Neighbour").with_artist("Someone"),
        ]);
        hydrate_if_empty(&store, &source).unwrap();

        let conn = store.acquire().unwrap();
        let songs = list_all(conn).unwrap();
        assert_eq!(songs.len(), 3);

        let obrien = songs.iter().find(|s| s.title.starts_with("O'")).unwrap();
        let fetched = get_by_id(conn, obrien.id).unwrap().unwrap();
        assert_eq!(fetched.title, "O'Brien's Song");
        assert_eq!(fetched.lyrics, "it's \"quoted\"\nline two");

        let neighbour = songs.iter().find(|s| s.title == "Neighbour").unwrap();
        assert_eq!(neighbour.artist, "Someone");
        assert_eq!(neighbour.lyrics, "");
    }

    #[test]
    fn record_without_title_is_stored_with_empty_title() {
        let store = Store::in_memory();
        let source = StaticDataset::new(vec![SongRecord {
            lyrics: Some("untitled verse".into()),
            ..SongRecord::default()
        }]);
        hydrate_if_empty(&store, &source).unwrap();

        let songs = list_all(store.acquire().unwrap()).unwrap();
        assert_eq!(songs[0].title, "");
        assert_eq!(songs[0].lyrics, "untitled verse");
    }
}
