use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::library::Track;

use super::sort::SortKey;

/// Ordered tracks plus the current position.
///
/// `current` is `Some(i)` with `i < tracks.len()` whenever the playlist is
/// non-empty, and `None` when it is empty.
#[derive(Debug, Default, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: Option<usize>,
    /// Position of each path in the order it was loaded; sorting leaves it alone.
    load_rank: HashMap<PathBuf, usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the playlist wholesale.
    ///
    /// Every track starts selected. Later duplicates of an already-seen path
    /// are dropped. The current index becomes `persisted_index` clamped into
    /// range, or 0. Returns how many duplicates were dropped.
    pub fn load<I>(&mut self, entries: I, persisted_index: Option<usize>) -> usize
    where
        I: IntoIterator<Item = Track>,
    {
        let mut seen = HashSet::new();
        let mut dropped = 0;

        self.tracks = entries
            .into_iter()
            .filter_map(|mut track| {
                if !seen.insert(track.path.clone()) {
                    warn!("duplicate track ignored: {}", track.path.display());
                    dropped += 1;
                    return None;
                }
                track.selected = true;
                Some(track)
            })
            .collect();

        self.load_rank = self
            .tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.path.clone(), i))
            .collect();

        self.current = if self.tracks.is_empty() {
            None
        } else {
            Some(persisted_index.unwrap_or(0).min(self.tracks.len() - 1))
        };

        debug!(
            "playlist loaded: {} tracks, current {:?}",
            self.tracks.len(),
            self.current
        );
        dropped
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    /// Where the current track sat when the playlist was loaded, whatever
    /// sorting happened since. This is the index to persist across restarts.
    pub fn current_load_position(&self) -> Option<usize> {
        self.current_track()
            .and_then(|t| self.load_rank.get(&t.path))
            .copied()
    }

    /// Move the current position, clamped into range. No-op on an empty playlist.
    pub fn set_current(&mut self, index: usize) -> Option<usize> {
        if !self.tracks.is_empty() {
            self.current = Some(index.min(self.tracks.len() - 1));
        }
        self.current
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.tracks.iter().position(|t| t.path == path)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.tracks.get(index).is_some_and(|t| t.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.selected).count()
    }

    /// Set one track's inclusion flag. Returns false when `index` is out of range.
    pub fn set_selected(&mut self, index: usize, value: bool) -> bool {
        match self.tracks.get_mut(index) {
            Some(track) => {
                track.selected = value;
                true
            }
            None => false,
        }
    }

    pub fn set_all_selected(&mut self, value: bool) {
        for track in &mut self.tracks {
            track.selected = value;
        }
    }

    /// Stable in-place sort that keeps the current track current.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Track, &Track) -> Ordering,
    {
        let current_path = self.current_track().map(|t| t.path.clone());

        self.tracks.sort_by(compare);

        self.current = match current_path.and_then(|p| self.position_of(&p)) {
            Some(i) => Some(i),
            None if self.tracks.is_empty() => None,
            None => Some(0),
        };
    }

    pub fn sort(&mut self, key: SortKey) {
        self.sort_by(|a, b| key.compare(a, b));
    }
}
