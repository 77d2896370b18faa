use std::path::PathBuf;
use std::time::Duration;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    /// No playlist loaded, or it is empty.
    #[default]
    Idle,
    /// A track is chosen but nothing plays.
    Stopped,
    /// Waiting for the backend to finish opening the current track.
    Loading,
    Playing,
    Paused,
    /// Advancing found nothing selected and playable; playback ended.
    Exhausted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// The index `steps` positions away from `from`, wrapping around `len`.
    pub(crate) fn step(self, from: usize, steps: usize, len: usize) -> usize {
        let steps = steps % len;
        match self {
            Direction::Forward => (from + steps) % len,
            Direction::Backward => (from + len - steps) % len,
        }
    }
}

/// Read-only view of the controller state handed to the UI.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackSession {
    pub state: PlayerState,
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub is_loading: bool,
    /// Mirrors the path of the track at `current_index`.
    pub current_track_path: Option<PathBuf>,
    pub elapsed: Duration,
}

impl PlaybackSession {
    pub(crate) fn set_state(&mut self, state: PlayerState) {
        self.state = state;
        self.is_playing = state == PlayerState::Playing;
        self.is_loading = state == PlayerState::Loading;
    }
}
