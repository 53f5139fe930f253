use std::fs;
use std::path::PathBuf;

use crate::error::{CatalogError, Result};
use crate::models::SongRecord;

/// Location of the dataset relative to an asset root, shared by the directory
/// and HTTP sources.
pub const DATASET_PATH: &str = "data/songs.json";

/// The dataset shipped inside the binary.
const EMBEDDED_JSON: &str = include_str!("../../data/songs.json");

/// Anything that can hand the hydrator the seed songs.
pub trait DatasetSource {
    /// Human readable location used in logs and errors.
    fn origin(&self) -> String;

    /// Retrieve and decode the full, ordered list of records.
    fn fetch(&self) -> Result<Vec<SongRecord>>;
}

/// Decode a dataset document. Missing or `null` fields become `None` and are
/// defaulted to empty strings at insert time; anything that is not a JSON
/// array of objects is rejected.
pub fn parse_dataset(bytes: &[u8]) -> serde_json::Result<Vec<SongRecord>> {
    serde_json::from_slice(bytes)
}

/// The copy of `data/songs.json` compiled into the executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDataset;

impl DatasetSource for EmbeddedDataset {
    fn origin(&self) -> String {
        "bundled dataset".to_string()
    }

    fn fetch(&self) -> Result<Vec<SongRecord>> {
        parse_dataset(EMBEDDED_JSON.as_bytes()).map_err(|err| CatalogError::fetch(self.origin(), err))
    }
}

/// An asset directory on disk; the dataset is read from `<root>/data/songs.json`.
#[derive(Debug, Clone)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dataset_path(&self) -> PathBuf {
        self.root.join(DATASET_PATH)
    }
}

impl DatasetSource for AssetDir {
    fn origin(&self) -> String {
        self.dataset_path().display().to_string()
    }

    fn fetch(&self) -> Result<Vec<SongRecord>> {
        let bytes =
            fs::read(self.dataset_path()).map_err(|err| CatalogError::fetch(self.origin(), err))?;
        parse_dataset(&bytes).map_err(|err| CatalogError::fetch(self.origin(), err))
    }
}

/// An asset root served over HTTP; one GET of `<base_url>/data/songs.json`.
#[derive(Debug, Clone)]
pub struct RemoteAssets {
    base_url: String,
}

impl RemoteAssets {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn dataset_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), DATASET_PATH)
    }
}

impl DatasetSource for RemoteAssets {
    fn origin(&self) -> String {
        self.dataset_url()
    }

    fn fetch(&self) -> Result<Vec<SongRecord>> {
        let url = self.dataset_url();
        let bytes = reqwest::blocking::get(&url)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .map_err(|err| CatalogError::fetch(url.clone(), err))?;
        parse_dataset(&bytes).map_err(|err| CatalogError::fetch(url, err))
    }
}

/// Records held in memory. Handy for tests and for callers that already have
/// the dataset decoded.
#[derive(Debug, Clone, Default)]
pub struct StaticDataset {
    records: Vec<SongRecord>,
}

impl StaticDataset {
    pub fn new(records: Vec<SongRecord>) -> Self {
        Self { records }
    }
}

impl DatasetSource for StaticDataset {
    fn origin(&self) -> String {
        format!("{} in-memory records", self.records.len())
    }

    fn fetch(&self) -> Result<Vec<SongRecord>> {
        Ok(self.records.clone())
    }
}
