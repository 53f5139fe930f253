// Integration tests for first-run seeding and the read path against an
// on-disk store, including simulated application restarts.

use std::fs;
use std::path::{Path, PathBuf};

use cancionero::db::{
    count_songs, AssetDir, DatasetSource, EmbeddedDataset, StaticDataset, DATASET_PATH,
};
use cancionero::{
    get_by_id, hydrate_if_empty, list_all, search, CatalogError, Hydration, SongRecord, Store,
};

/// Dataset whose fetch lets a second launch seed the same file first, the way
/// two processes starting together would interleave.
struct SeededMeanwhile {
    db_path: PathBuf,
}

impl DatasetSource for SeededMeanwhile {
    fn origin(&self) -> String {
        "seeded meanwhile".to_string()
    }

    fn fetch(&self) -> Result<Vec<SongRecord>, CatalogError> {
        let other_launch = Store::at_path(&self.db_path);
        let other = StaticDataset::new(vec![SongRecord::titled("Other")]);
        hydrate_if_empty(&other_launch, &other)?;

        Ok(vec![SongRecord::titled("Mine"), SongRecord::titled("Also Mine")])
    }
}

fn write_dataset(root: &Path, json: &str) {
    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(root.join(DATASET_PATH), json).unwrap();
}

#[test]
fn seeding_survives_restarts_without_duplicating_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("db").join("cancionero.sqlite");
    let assets = dir.path().join("assets");
    write_dataset(
        &assets,
        r#"[
            {"title": "Zeta", "lyrics": "last letter"},
            {"title": "Alpha", "artist": "First", "key": "C", "category": "Test"}
        ]"#,
    );

    // Given: a first launch against an empty store
    {
        let store = Store::at_path(&db_path);
        let outcome = hydrate_if_empty(&store, &AssetDir::new(&assets)).unwrap();
        assert_eq!(outcome, Hydration::Seeded { inserted: 2 });
    }

    // When: the application is launched three more times
    for _ in 0..3 {
        let store = Store::at_path(&db_path);
        let outcome = hydrate_if_empty(&store, &AssetDir::new(&assets)).unwrap();
        assert_eq!(outcome, Hydration::AlreadyHydrated { existing: 2 });
    }

    // Then: the catalog holds the dataset once, sorted by title
    let store = Store::at_path(&db_path);
    let songs = list_all(store.acquire().unwrap()).unwrap();
    let titles: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Alpha", "Zeta"]);
    assert_eq!(songs[0].artist, "First");
    assert_eq!(songs[0].key, "C");
    assert_eq!(songs[0].category, "Test");
}

#[test]
fn seeded_store_does_not_need_the_dataset_again() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cancionero.sqlite");
    let assets = dir.path().join("assets");
    write_dataset(&assets, r#"[{"title": "Only"}]"#);

    hydrate_if_empty(&Store::at_path(&db_path), &AssetDir::new(&assets)).unwrap();
    fs::remove_dir_all(&assets).unwrap();

    // The dataset is gone, but the gate never reaches the fetch.
    let outcome = hydrate_if_empty(&Store::at_path(&db_path), &AssetDir::new(&assets)).unwrap();
    assert_eq!(outcome, Hydration::AlreadyHydrated { existing: 1 });
}

#[test]
fn concurrent_launch_seeds_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cancionero.sqlite");

    // Given: our handle sees an empty catalog and starts fetching
    let store = Store::at_path(&db_path);
    let source = SeededMeanwhile {
        db_path: db_path.clone(),
    };

    // When: another handle seeds the same file before we take the write lock
    let outcome = hydrate_if_empty(&store, &source).unwrap();

    // Then: our batch is discarded and only the other launch's rows remain
    assert_eq!(outcome, Hydration::AlreadyHydrated { existing: 1 });
    let conn = store.acquire().unwrap();
    assert_eq!(count_songs(conn).unwrap(), 1);
    let titles: Vec<_> = list_all(conn).unwrap().into_iter().map(|s| s.title).collect();
    assert_eq!(titles, ["Other"]);
}

#[test]
fn missing_dataset_fails_and_leaves_store_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::at_path(dir.path().join("cancionero.sqlite"));

    let err = hydrate_if_empty(&store, &AssetDir::new(dir.path().join("nope"))).unwrap_err();
    assert!(matches!(err, CatalogError::Fetch { .. }));
    assert!(err.is_startup_failure());
    assert_eq!(count_songs(store.acquire().unwrap()).unwrap(), 0);
}

#[test]
fn empty_dataset_hydrates_to_empty_catalog() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), "[]");
    let store = Store::in_memory();

    let outcome = hydrate_if_empty(&store, &AssetDir::new(dir.path())).unwrap();
    assert_eq!(outcome, Hydration::Seeded { inserted: 0 });
    assert!(list_all(store.acquire().unwrap()).unwrap().is_empty());
}

#[test]
fn hostile_text_round_trips_and_search_stays_literal() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(
        dir.path(),
        r#"[
            {"title": "O'Brien's Song", "lyrics": "it's a 'quoted' line"},
            {"title": "Amazing Grace", "lyrics": "how sweet the sound"},
            {"title": "Silent Night", "lyrics": "amazing things"}
        ]"#,
    );
    let store = Store::in_memory();
    hydrate_if_empty(&store, &AssetDir::new(dir.path())).unwrap();
    let conn = store.acquire().unwrap();

    let obrien = search(conn, "o'brien").unwrap();
    assert_eq!(obrien.len(), 1);
    let fetched = get_by_id(conn, obrien[0].id).unwrap().unwrap();
    assert_eq!(fetched.title, "O'Brien's Song");
    assert_eq!(fetched.lyrics, "it's a 'quoted' line");

    assert!(search(conn, "'; DROP TABLE songs; --").unwrap().is_empty());
    assert_eq!(count_songs(conn).unwrap(), 3);

    let amazing: Vec<_> = search(conn, "Amazing")
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(amazing, ["Amazing Grace", "Silent Night"]);

    assert!(get_by_id(conn, 999_999).unwrap().is_none());
}

#[test]
fn bundled_dataset_seeds_a_browsable_catalog() {
    let store = Store::in_memory();
    let expected = EmbeddedDataset.fetch().unwrap().len();

    let outcome = hydrate_if_empty(&store, &EmbeddedDataset).unwrap();
    assert_eq!(outcome, Hydration::Seeded { inserted: expected });

    let songs = list_all(store.acquire().unwrap()).unwrap();
    assert_eq!(songs.len(), expected);
    assert!(songs.windows(2).all(|pair| pair[0].title <= pair[1].title));
}
