//! Binary entry point: resolve configuration, bring up logging, open the
//! store, seed it on first run, then either drive the TUI or answer a
//! one-shot command.
use anyhow::{Context, Result};
use clap::Parser;

use cancionero::config::{parse_song_id, Cli, Command, Settings};
use cancionero::db::count_songs;
use cancionero::logging::{self, LogTarget};
use cancionero::{
    get_by_id, hydrate_if_empty, list_all, run_app, search, App, CatalogError, Song, Store,
};

/// Initialize persistence, seed the catalog if needed, and dispatch.
///
/// Startup failures (unopenable store, unreachable dataset) bubble up to the
/// terminal with a hint that re-running is safe.
fn main() -> Result<()> {
    let settings = Cli::parse().resolve()?;

    match settings.command {
        Command::Browse => logging::init(LogTarget::File(&settings.log_file))?,
        _ => logging::init(LogTarget::Stderr)?,
    }

    let store = Store::at_path(&settings.db_path);
    if let Err(err) = bootstrap(&store, &settings) {
        if err.is_startup_failure() {
            eprintln!("Could not prepare the songbook. Re-running is safe and will retry.");
        }
        return Err(err.into());
    }

    run_command(store, settings.command)
}

fn bootstrap(store: &Store, settings: &Settings) -> Result<(), CatalogError> {
    let dataset = settings.assets.clone().into_dataset();
    let outcome = hydrate_if_empty(store, dataset.as_ref())?;
    tracing::debug!(?outcome, "bootstrap finished");
    Ok(())
}

fn run_command(store: Store, command: Command) -> Result<()> {
    match command {
        Command::Browse => {
            let mut app = App::new(store)?;
            run_app(&mut app)
        }
        Command::List => {
            let songs = list_all(store.acquire()?).context("failed to list songs")?;
            print_song_rows(&songs);
            Ok(())
        }
        Command::Search { query } => {
            let songs = search(store.acquire()?, &query).context("failed to search songs")?;
            if songs.is_empty() {
                println!("No songs match \"{query}\".");
            } else {
                print_song_rows(&songs);
            }
            Ok(())
        }
        Command::Show { id } => {
            let song = match parse_song_id(&id) {
                Some(song_id) => {
                    get_by_id(store.acquire()?, song_id).context("failed to load song")?
                }
                None => None,
            };
            match song {
                Some(song) => print_song(&song),
                None => println!("Song {id} not found."),
            }
            Ok(())
        }
        Command::Stats => {
            let total = count_songs(store.acquire()?).context("failed to count songs")?;
            println!("{total} songs in {}", store.location());
            Ok(())
        }
    }
}

fn print_song_rows(songs: &[Song]) {
    for song in songs {
        println!("{:>5}  {}", song.id, song.display_title());
    }
}

fn print_song(song: &Song) {
    println!("{}", song.title);
    if !song.artist.trim().is_empty() {
        println!("{}", song.artist.trim());
    }
    if !song.key.trim().is_empty() {
        println!("Key: {}", song.key.trim());
    }
    if !song.category.trim().is_empty() {
        println!("Category: {}", song.category.trim());
    }
    println!();
    println!("{}", song.lyrics);
}
