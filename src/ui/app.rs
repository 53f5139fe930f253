use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::db::{get_by_id, list_all, search, Store};
use crate::models::Song;

use super::helpers::{centered_rect, empty_list_message, song_meta_line, surface_error};
use super::screens::{DetailScreen, ListScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE: isize = 10;

/// High-level navigation states.
enum Screen {
    List,
    Detail(DetailScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    Searching(SearchState),
    Help,
}

/// State for an active inline search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: Store,
    list: ListScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app around an opened, hydrated store and load the full list.
    pub fn new(store: Store) -> Result<Self> {
        let songs = list_all(store.acquire()?).context("failed to load songs")?;
        Ok(Self {
            store,
            list: ListScreen::new(songs),
            screen: Screen::List,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::Help => Mode::Normal,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if let Screen::Detail(detail) = &mut self.screen {
            match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => {
                    self.screen = Screen::List;
                    self.clear_status();
                }
                KeyCode::Up => detail.scroll_by(-1),
                KeyCode::Down => detail.scroll_by(1),
                KeyCode::PageUp => detail.scroll_by(-(PAGE as i32)),
                KeyCode::PageDown => detail.scroll_by(PAGE as i32),
                KeyCode::Home => detail.scroll_to_top(),
                KeyCode::Char('?') => return Ok(Mode::Help),
                _ => {}
            }
            return Ok(Mode::Normal);
        }

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.list.has_query() {
                    self.apply_query(None);
                } else {
                    *exit = true;
                }
            }
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::PageUp => self.list.move_selection(-PAGE),
            KeyCode::PageDown => self.list.move_selection(PAGE),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(),
            KeyCode::Enter | KeyCode::Right => self.open_selected(),
            KeyCode::Char('/') => {
                self.clear_status();
                let query = self.list.query.clone().unwrap_or_default();
                return Ok(Mode::Searching(SearchState { query }));
            }
            KeyCode::Char('r') => {
                let query = self.list.query.clone();
                self.apply_query(query);
                if self.status.is_none() {
                    self.set_status("Reloaded songs.", StatusKind::Info);
                }
            }
            KeyCode::Char('?') => return Ok(Mode::Help),
            _ => {}
        }

        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.apply_query(None);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                if let Some(song) = self.list.current_song() {
                    let title = song.title.clone();
                    self.set_status(
                        format!("{} result(s); showing \"{title}\" first.", self.list.songs.len()),
                        StatusKind::Info,
                    );
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                self.list.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.list.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Ok(Mode::Searching(state)),
        }

        if state.query.trim().is_empty() {
            self.apply_query(None);
        } else {
            self.apply_query(Some(state.query.clone()));
        }

        Ok(Mode::Searching(state))
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::List => self.draw_list(frame, content_area),
            Screen::Detail(detail) => self.draw_detail(frame, content_area, detail),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Help => self.draw_help(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let title = match &self.list.query {
            Some(query) if self.list.has_query() => {
                format!("Results for \"{}\" • {}", query.trim(), self.list.songs.len())
            }
            _ => format!("Cancionero • {} songs", self.list.songs.len()),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.list.songs.is_empty() {
            let message = Paragraph::new(empty_list_message(self.list.has_query()))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self.list.songs.iter().map(song_list_item).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, detail: &DetailScreen) {
        let song = &detail.song;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let mut header_lines = vec![Line::from(Span::styled(
            song.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if !song.artist.trim().is_empty() {
            header_lines.push(Line::from(Span::styled(
                song.artist.trim().to_string(),
                Style::default().fg(Color::Gray),
            )));
        }
        header_lines.push(song_meta_line(song));

        let header = Paragraph::new(header_lines)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL).title("Song"));
        frame.render_widget(header, chunks[0]);

        let lyrics = if song.lyrics.trim().is_empty() {
            Text::from(Line::from(Span::styled(
                "No lyrics for this song.",
                Style::default().fg(Color::DarkGray),
            )))
        } else {
            Text::from(song.lyrics.clone())
        };
        let body = Paragraph::new(lyrics)
            .block(Block::default().borders(Borders::ALL).title("Lyrics"))
            .wrap(Wrap { trim: false })
            .scroll((detail.scroll, 0));
        frame.render_widget(body, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let lines = vec![
            Line::from("Song list"),
            Line::from("  ↑/↓ PgUp/PgDn Home/End   move"),
            Line::from("  Enter                    open song"),
            Line::from("  /                        search titles and lyrics"),
            Line::from("  r                        reload"),
            Line::from("  Esc                      clear search / quit"),
            Line::from(""),
            Line::from("Song view"),
            Line::from("  ↑/↓ PgUp/PgDn Home       scroll lyrics"),
            Line::from("  Esc / ←                  back to list"),
            Line::from(""),
            Line::from("Press any key to close."),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => Line::from(vec![
                Span::styled("[type]", key_style),
                Span::raw(" Filter   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Keep results   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::Help) => Line::from(vec![
                Span::styled("[any key]", key_style),
                Span::raw(" Close help"),
            ]),
            (Screen::Detail(_), Mode::Normal) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Scroll   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[?]", key_style),
                Span::raw(" Help   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::List, Mode::Normal) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Open   "),
                Span::styled("[/]", key_style),
                Span::raw(" Search   "),
                Span::styled("[?]", key_style),
                Span::raw(" Help   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    /// Re-run the list query (`None` lists everything) and surface failures in
    /// the footer instead of pretending the result was empty.
    fn apply_query(&mut self, query: Option<String>) {
        match self.fetch_songs(query.as_deref()) {
            Ok(songs) => {
                self.list.set_results(songs, query);
                self.clear_status();
            }
            Err(err) => self.set_status(
                format!("Search failed: {}", surface_error(&err)),
                StatusKind::Error,
            ),
        }
    }

    fn fetch_songs(&self, query: Option<&str>) -> Result<Vec<Song>> {
        let conn = self.store.acquire()?;
        let songs = match query {
            Some(query) => search(conn, query)?,
            None => list_all(conn)?,
        };
        Ok(songs)
    }

    /// Look the selected song up again by id so the detail view always shows
    /// what is in the store.
    fn open_selected(&mut self) {
        let Some(id) = self.list.current_song().map(|song| song.id) else {
            self.set_status("No song selected.", StatusKind::Error);
            return;
        };

        let lookup = self
            .store
            .acquire()
            .and_then(|conn| get_by_id(conn, id))
            .with_context(|| format!("failed to load song {id}"));

        match lookup {
            Ok(Some(song)) => {
                self.clear_status();
                self.screen = Screen::Detail(DetailScreen::new(song));
            }
            Ok(None) => self.set_status("Song not found.", StatusKind::Error),
            Err(err) => self.set_status(
                format!("Could not open song: {}", surface_error(&err)),
                StatusKind::Error,
            ),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

/// One row of the song list: bold title followed by the artist in gray.
fn song_list_item(song: &Song) -> ListItem<'static> {
    let mut spans = vec![Span::styled(
        song.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if !song.artist.trim().is_empty() {
        spans.push(Span::styled(
            format!("  {}", song.artist.trim()),
            Style::default().fg(Color::Gray),
        ));
    }
    ListItem::new(Line::from(spans))
}
