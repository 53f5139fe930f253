//! Core library surface for the Cancionero song-lyrics browser.
//!
//! The persistence layer (`db`) seeds an embedded SQLite catalog from a
//! bundled dataset exactly once and serves read-only song queries. The `ui`
//! module is a terminal front-end on top of those queries, and `config` /
//! `logging` carry the bootstrap concerns shared with `main.rs`.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer. `main.rs` opens the
/// store, hydrates it and then hands it to either the TUI or a one-shot
/// command.
pub use db::{get_by_id, hydrate_if_empty, list_all, search, Hydration, Store};

pub use error::CatalogError;

/// The two domain types that other layers manipulate.
pub use models::{Song, SongRecord};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
