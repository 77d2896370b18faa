//! UI-side state: cursor position, the open-folder prompt and status line.
//!
//! Playback state is not kept here; the runtime asks the controller for a
//! snapshot on every frame.

use std::path::PathBuf;

use crate::playlist::SortKey;

/// What the open-folder prompt produced when confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// Nothing was typed.
    Empty,
    Folder(PathBuf),
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    /// Index of the highlighted row.
    pub cursor: usize,
    /// Move the cursor along with the playing track.
    pub follow_playback: bool,
    /// Last applied sort, if any.
    pub sort_key: Option<SortKey>,
    pub current_dir: Option<PathBuf>,
    /// Input buffer while the open-folder prompt is shown.
    pub prompt: Option<String>,
    pub status: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            follow_playback: true,
            ..Self::default()
        }
    }

    /// Move the cursor down one row, wrapping to the top.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % len;
    }

    /// Move the cursor up one row, wrapping to the bottom.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + len - 1) % len;
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.cursor = len.saturating_sub(1);
    }

    /// Keep the cursor inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Jump to the playing track when following is on.
    pub fn follow(&mut self, playing: Option<usize>) {
        if !self.follow_playback {
            return;
        }
        if let Some(i) = playing {
            self.cursor = i;
        }
    }

    /// The sort after the current one in the `S` cycle.
    pub fn cycle_sort(&mut self) -> SortKey {
        let key = self.sort_key.map_or(SortKey::Name, SortKey::next);
        self.sort_key = Some(key);
        key
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    /// Show the prompt, pre-filled with the current folder.
    pub fn open_prompt(&mut self) {
        let seed = self
            .current_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        self.prompt = Some(seed);
    }

    pub fn push_prompt_char(&mut self, c: char) {
        if let Some(buf) = self.prompt.as_mut() {
            buf.push(c);
        }
    }

    pub fn pop_prompt_char(&mut self) {
        if let Some(buf) = self.prompt.as_mut() {
            buf.pop();
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Close the prompt and hand back what was typed. A leading `~` expands
    /// to `$HOME`.
    pub fn submit_prompt(&mut self) -> PromptResult {
        let raw = self.prompt.take().unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            return PromptResult::Empty;
        }

        let expanded = match (raw.strip_prefix('~'), std::env::var_os("HOME")) {
            (Some(rest), Some(home)) => {
                PathBuf::from(home).join(rest.trim_start_matches('/'))
            }
            _ => PathBuf::from(raw),
        };
        PromptResult::Folder(expanded)
    }
}
