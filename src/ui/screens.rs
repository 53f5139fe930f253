use crate::models::Song;

/// The song list, either the full catalog or the latest search results.
pub(crate) struct ListScreen {
    pub(crate) songs: Vec<Song>,
    pub(crate) selected: usize,
    /// Query that produced `songs`; `None` means the full catalog.
    pub(crate) query: Option<String>,
}

impl ListScreen {
    pub(crate) fn new(songs: Vec<Song>) -> Self {
        Self {
            songs,
            selected: 0,
            query: None,
        }
    }

    /// Swap in a fresh result set, keeping the selection on the same song
    /// when it is still present.
    pub(crate) fn set_results(&mut self, songs: Vec<Song>, query: Option<String>) {
        let focused = self.current_song().map(|song| song.id);
        self.songs = songs;
        self.query = query;
        self.selected = focused
            .and_then(|id| self.songs.iter().position(|song| song.id == id))
            .unwrap_or(0);
        self.ensure_in_bounds();
    }

    pub(crate) fn has_query(&self) -> bool {
        self.query
            .as_ref()
            .map(|q| !q.trim().is_empty())
            .unwrap_or(false)
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.songs.is_empty() {
            return;
        }
        let len = self.songs.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.songs.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.songs.len() {
            self.selected = self.songs.len().saturating_sub(1);
        }
    }
}

/// A single song with scrollable lyrics.
pub(crate) struct DetailScreen {
    pub(crate) song: Song,
    pub(crate) scroll: u16,
}

impl DetailScreen {
    pub(crate) fn new(song: Song) -> Self {
        Self { song, scroll: 0 }
    }

    fn line_count(&self) -> u16 {
        u16::try_from(self.song.lyrics.lines().count()).unwrap_or(u16::MAX)
    }

    pub(crate) fn scroll_by(&mut self, offset: i32) {
        let max = i32::from(self.line_count().saturating_sub(1));
        let new = (i32::from(self.scroll) + offset).clamp(0, max.max(0));
        self.scroll = new as u16;
    }

    pub(crate) fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }
}
