use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::backend::{BackendEvent, BackendState, LoadTicket, MediaBackend};
use crate::library::Track;
use crate::playlist::{Playlist, SortKey};
use crate::selection;
use crate::store::{LAST_FOLDER, LAST_INDEX, PreferenceStore};

use super::session::{Direction, PlaybackSession, PlayerState};

/// A directional search for the next selected track that opens cleanly.
///
/// Candidate `k` is `origin` moved `k` steps in `direction`; at most `limit`
/// candidates are examined.
#[derive(Debug, Clone, Copy)]
struct Scan {
    origin: usize,
    direction: Direction,
    probed: usize,
    limit: usize,
}

/// Work requested while a load was in flight. Only the latest is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Play(usize),
    Advance(Direction),
}

/// A completion or stop notification waiting out the debounce delay.
#[derive(Debug, Clone, Copy)]
struct Notice {
    ticket: LoadTicket,
    completed: bool,
    at: Instant,
}

pub struct Controller<B: MediaBackend, S: PreferenceStore> {
    backend: B,
    store: S,
    events: Option<Receiver<BackendEvent>>,
    playlist: Playlist,
    session: PlaybackSession,
    /// Ticket of the newest `open`; events with any other ticket are stale.
    ticket: LoadTicket,
    scan: Option<Scan>,
    queued: Option<Request>,
    notice: Option<Notice>,
    debounce: Duration,
    /// Playback failures since the last natural completion or user action.
    error_streak: usize,
    /// False for explicit file lists, whose positions are not remembered.
    persist_position: bool,
    disposed: bool,
}

impl<B: MediaBackend, S: PreferenceStore> Controller<B, S> {
    pub fn new(mut backend: B, store: S, debounce: Duration) -> Self {
        let events = backend.take_events();
        if events.is_none() {
            warn!("media backend has no event stream; tracks will not auto-advance");
        }

        Self {
            backend,
            store,
            events,
            playlist: Playlist::new(),
            session: PlaybackSession::default(),
            ticket: 0,
            scan: None,
            queued: None,
            notice: None,
            debounce,
            error_streak: 0,
            persist_position: false,
            disposed: false,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Copy of the session for rendering.
    pub fn snapshot(&self) -> PlaybackSession {
        let mut session = self.session.clone();
        if matches!(session.state, PlayerState::Playing | PlayerState::Paused) {
            session.elapsed = self.backend.elapsed();
        }
        session
    }

    /// Folder remembered from the previous run.
    pub fn last_folder(&self) -> Option<PathBuf> {
        match self.store.get_string(LAST_FOLDER) {
            Ok(folder) => folder.map(PathBuf::from),
            Err(err) => {
                warn!("cannot read last folder: {err}");
                None
            }
        }
    }

    fn last_index(&self) -> Option<usize> {
        match self.store.get_int(LAST_INDEX) {
            Ok(index) => index.and_then(|i| usize::try_from(i).ok()),
            Err(err) => {
                warn!("cannot read last index: {err}");
                None
            }
        }
    }

    /// Replace the playlist with freshly ingested `tracks`.
    ///
    /// `folder` is the scanned directory, or `None` for an explicit file list.
    /// The remembered index is reused only when reopening the remembered folder.
    pub fn load(&mut self, tracks: Vec<Track>, folder: Option<&Path>) {
        if self.disposed {
            return;
        }
        self.halt();

        let same_folder = folder.is_some() && self.last_folder().as_deref() == folder;
        let persisted = if same_folder { self.last_index() } else { None };

        self.playlist.load(tracks, persisted);
        self.persist_position = folder.is_some();
        selection::restore(&mut self.playlist, &self.store);

        if let Some(dir) = folder {
            if let Err(err) = self.store.set_string(LAST_FOLDER, &dir.to_string_lossy()) {
                warn!("cannot remember folder: {err}");
            }
        }

        self.session.set_state(if self.playlist.is_empty() {
            PlayerState::Idle
        } else {
            PlayerState::Stopped
        });
        self.sync_current();
        info!(
            "loaded {} tracks ({} selected)",
            self.playlist.len(),
            self.playlist.selected_count()
        );
    }

    /// Play the track at `index`, or the current one.
    ///
    /// An unselected target is not played; the controller advances forward
    /// from it instead. While a load is in flight an explicit index is queued
    /// (latest wins) and a bare `play(None)` is dropped.
    pub fn play(&mut self, index: Option<usize>) {
        if self.disposed || self.playlist.is_empty() {
            return;
        }
        if self.session.is_loading {
            match index {
                Some(i) => {
                    debug!("load in flight, queueing play({i})");
                    self.queued = Some(Request::Play(i));
                }
                None => debug!("load in flight, play ignored"),
            }
            return;
        }

        self.error_streak = 0;
        let index = index.or(self.playlist.current()).unwrap_or(0);
        self.play_index(index);
    }

    fn play_index(&mut self, index: usize) {
        let Some(target) = self.playlist.set_current(index) else {
            return;
        };
        self.sync_current();
        let len = self.playlist.len();

        if !self.playlist.is_selected(target) {
            debug!("track {target} is not selected, advancing");
            self.begin_scan(target, Direction::Forward, len);
            return;
        }

        // The target itself is the first attempt, so the fallback scan skips it.
        self.scan = Some(Scan {
            origin: target,
            direction: Direction::Forward,
            probed: 0,
            limit: len - 1,
        });
        if let Err(err) = self.begin_load(target) {
            warn!("cannot start track {target}: {err}");
            self.continue_scan();
        }
    }

    /// Pause from `Playing`; anything else is a no-op.
    pub fn pause(&mut self) {
        if self.disposed || self.session.state != PlayerState::Playing {
            return;
        }
        match self.backend.pause() {
            Ok(()) => self.session.set_state(PlayerState::Paused),
            Err(err) => self.on_failure(&err.to_string()),
        }
    }

    /// The single play/pause affordance.
    pub fn resume_or_play(&mut self) {
        if self.disposed {
            return;
        }
        match self.session.state {
            PlayerState::Playing => self.pause(),
            PlayerState::Paused => {
                self.error_streak = 0;
                match self.backend.resume() {
                    Ok(()) => self.session.set_state(PlayerState::Playing),
                    Err(err) => self.on_failure(&err.to_string()),
                }
            }
            PlayerState::Loading => debug!("load in flight, toggle ignored"),
            PlayerState::Idle | PlayerState::Stopped | PlayerState::Exhausted => self.play(None),
        }
    }

    pub fn next(&mut self) {
        self.error_streak = 0;
        self.advance(Direction::Forward);
    }

    pub fn previous(&mut self) {
        self.error_streak = 0;
        self.advance(Direction::Backward);
    }

    /// Move to the nearest selected track in `direction`, wrapping around.
    ///
    /// Examines at most `len` candidates. The current track is the last
    /// candidate, so a lone selected track is replayed. When nothing is
    /// found playback ends in `Exhausted` and the current index is kept.
    pub fn advance(&mut self, direction: Direction) {
        if self.disposed || self.playlist.is_empty() {
            return;
        }
        if self.session.is_loading {
            debug!("load in flight, queueing advance {direction:?}");
            self.queued = Some(Request::Advance(direction));
            return;
        }
        let origin = self.playlist.current().unwrap_or(0);
        self.begin_scan(origin, direction, self.playlist.len());
    }

    pub fn stop(&mut self) {
        if self.disposed {
            return;
        }
        self.halt();
        self.session.set_state(if self.playlist.is_empty() {
            PlayerState::Idle
        } else {
            PlayerState::Stopped
        });
    }

    pub fn toggle_selected(&mut self, index: usize) {
        if let Some(selected) = self.playlist.get(index).map(|t| t.selected) {
            self.set_selected(index, !selected);
        }
    }

    /// Change one track's flag and persist the selection map.
    ///
    /// Deselecting the track that is playing moves on immediately.
    pub fn set_selected(&mut self, index: usize, value: bool) {
        if self.disposed || !self.playlist.set_selected(index, value) {
            return;
        }
        self.persist_selections();

        if !value
            && self.playlist.current() == Some(index)
            && self.session.state == PlayerState::Playing
        {
            debug!("playing track {index} was deselected");
            self.advance(Direction::Forward);
        }
    }

    pub fn select_all(&mut self) {
        if self.disposed {
            return;
        }
        self.playlist.set_all_selected(true);
        self.persist_selections();
    }

    pub fn deselect_all(&mut self) {
        if self.disposed {
            return;
        }
        self.playlist.set_all_selected(false);
        self.persist_selections();
        if self.session.state == PlayerState::Playing {
            self.advance(Direction::Forward);
        }
    }

    /// Reorder the playlist; the current track stays current.
    pub fn sort(&mut self, key: SortKey) {
        if self.disposed {
            return;
        }
        self.playlist.sort(key);
        self.sync_current();
        debug!("sorted by {}", key.label());
    }

    /// React to one backend notification.
    ///
    /// Completion and stop notices are held for the debounce delay and acted
    /// on by `tick`; errors are handled at once.
    pub fn handle_event(&mut self, event: BackendEvent, now: Instant) {
        if self.disposed {
            return;
        }
        if event.ticket() != self.ticket {
            debug!("ignoring stale {event:?}");
            return;
        }

        match event {
            BackendEvent::Loaded { duration, .. } => self.on_loaded(duration),
            BackendEvent::Error { message, .. } => self.on_failure(&message),
            BackendEvent::Completed { ticket } => {
                self.notice = Some(Notice {
                    ticket,
                    completed: true,
                    at: now,
                });
            }
            BackendEvent::StateChanged {
                ticket,
                state: BackendState::Stopped,
            } => {
                // A pending completion already covers the stop it causes.
                if !self.notice.is_some_and(|n| n.completed) {
                    self.notice = Some(Notice {
                        ticket,
                        completed: false,
                        at: now,
                    });
                }
            }
            BackendEvent::StateChanged { state, .. } => debug!("backend reports {state:?}"),
        }
    }

    /// Act on a debounced notice once its delay has passed.
    pub fn tick(&mut self, now: Instant) {
        let Some(notice) = self.notice else {
            return;
        };
        if now.saturating_duration_since(notice.at) < self.debounce {
            return;
        }
        self.notice = None;
        if self.disposed || notice.ticket != self.ticket {
            return;
        }

        if notice.completed {
            if self.session.state == PlayerState::Playing {
                debug!("track finished");
                self.error_streak = 0;
                self.advance(Direction::Forward);
            } else if self.session.state == PlayerState::Paused {
                // The sink is gone; resuming would claim to play nothing.
                info!("track finished while paused");
                self.session.set_state(PlayerState::Stopped);
            }
        } else if matches!(
            self.session.state,
            PlayerState::Playing | PlayerState::Paused
        ) {
            info!("backend stopped on its own");
            self.session.set_state(PlayerState::Stopped);
        }
    }

    /// Drain pending backend events without blocking, then `tick`.
    pub fn pump(&mut self, now: Instant) {
        let events: Vec<BackendEvent> = match &self.events {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        };
        for event in events {
            self.handle_event(event, now);
        }
        self.tick(now);
    }

    /// Release the backend and stop listening to it. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.ticket += 1;
        self.scan = None;
        self.queued = None;
        self.notice = None;
        self.events = None;
        self.backend.release();
        self.session.set_state(PlayerState::Idle);
        info!("playback controller disposed");
    }

    fn on_loaded(&mut self, duration: Option<Duration>) {
        if self.session.state != PlayerState::Loading {
            return;
        }
        let Some(index) = self.playlist.current() else {
            return;
        };

        // The flag may have been cleared while the source was opening.
        if !self.playlist.is_selected(index) {
            debug!("track {index} was deselected while loading");
            if self.scan.is_none() {
                self.begin_scan(index, Direction::Forward, self.playlist.len());
            } else {
                self.continue_scan();
            }
            return;
        }

        if let Err(err) = self.backend.play() {
            self.on_failure(&err.to_string());
            return;
        }
        self.scan = None;
        self.session.set_state(PlayerState::Playing);
        self.persist_index();
        debug!("playing track {index} ({duration:?})");

        if let Some(request) = self.queued.take() {
            match request {
                Request::Play(i) => self.play_index(i),
                Request::Advance(direction) => self.advance(direction),
            }
        }
    }

    /// Recover from a backend failure by moving forward. After one failure
    /// per track without a natural completion in between, give up.
    fn on_failure(&mut self, message: &str) {
        warn!(
            "playback failed on track {:?}: {message}",
            self.playlist.current()
        );
        self.error_streak += 1;
        if self.error_streak >= self.playlist.len() {
            self.scan = None;
            self.exhaust();
            return;
        }

        if self.scan.is_some() {
            self.continue_scan();
        } else {
            let origin = self.playlist.current().unwrap_or(0);
            self.begin_scan(origin, Direction::Forward, self.playlist.len());
        }
    }

    fn begin_scan(&mut self, origin: usize, direction: Direction, limit: usize) {
        self.scan = Some(Scan {
            origin,
            direction,
            probed: 0,
            limit,
        });
        self.continue_scan();
    }

    fn continue_scan(&mut self) {
        let len = self.playlist.len();
        while let Some(mut scan) = self.scan {
            if len == 0 || scan.probed >= scan.limit {
                self.scan = None;
                self.exhaust();
                return;
            }
            scan.probed += 1;
            self.scan = Some(scan);

            let index = scan.direction.step(scan.origin, scan.probed, len);
            if !self.playlist.is_selected(index) {
                continue;
            }
            match self.begin_load(index) {
                Ok(()) => return,
                Err(err) => warn!("cannot start track {index}: {err}"),
            }
        }
    }

    /// Stop what is playing and ask the backend to open track `index`.
    fn begin_load(&mut self, index: usize) -> Result<(), crate::backend::BackendError> {
        let Some(path) = self.playlist.get(index).map(|t| t.path.clone()) else {
            return Ok(());
        };

        self.stop_backend();
        self.ticket += 1;
        self.notice = None;
        self.playlist.set_current(index);
        self.sync_current();
        self.session.set_state(PlayerState::Loading);

        debug!("opening {} (ticket {})", path.display(), self.ticket);
        self.backend.open(&path, self.ticket)
    }

    fn exhaust(&mut self) {
        self.stop_backend();
        self.ticket += 1;
        self.queued = None;
        self.notice = None;
        self.session.set_state(PlayerState::Exhausted);
        info!("no selected track left to play");
    }

    /// Stop the backend and forget everything tied to the current source.
    fn halt(&mut self) {
        self.stop_backend();
        self.ticket += 1;
        self.scan = None;
        self.queued = None;
        self.notice = None;
    }

    fn stop_backend(&mut self) {
        if matches!(
            self.session.state,
            PlayerState::Playing | PlayerState::Paused | PlayerState::Loading
        ) {
            if let Err(err) = self.backend.stop() {
                warn!("backend stop failed: {err}");
            }
        }
    }

    fn sync_current(&mut self) {
        self.session.current_index = self.playlist.current();
        self.session.current_track_path = self.playlist.current_track().map(|t| t.path.clone());
    }

    /// Remember the current track by its load-order position, which is what
    /// `load` restores against before any sorting.
    fn persist_index(&mut self) {
        if !self.persist_position {
            return;
        }
        let Some(index) = self.playlist.current_load_position() else {
            return;
        };
        if let Err(err) = self.store.set_int(LAST_INDEX, index as i64) {
            warn!("cannot remember track index: {err}");
        }
    }

    fn persist_selections(&mut self) {
        if let Err(err) = selection::save(&self.playlist, &mut self.store) {
            warn!("cannot save selections: {err}");
        }
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}

impl<B: MediaBackend, S: PreferenceStore> Drop for Controller<B, S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
