//! Terminal front-end: a song list with incremental search and a lyrics
//! detail view. It only ever reads through the query functions in `db`.

mod app;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
