//! Persistence module split across logical submodules: the store handle, the
//! dataset sources, the one-time hydrator and the read-only song queries.

mod connection;
mod dataset;
mod hydrate;
mod songs;

pub use connection::{Store, StoreLocation};
pub use dataset::{
    parse_dataset, AssetDir, DatasetSource, EmbeddedDataset, RemoteAssets, StaticDataset,
    DATASET_PATH,
};
pub use hydrate::{hydrate_if_empty, Hydration};
pub use songs::{count_songs, get_by_id, list_all, search};
