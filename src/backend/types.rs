//! Backend capability trait, its events and errors.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use thiserror::Error;

/// Identifies one `open` request. Events carry the ticket of the source they
/// belong to so late notifications about a replaced source can be ignored.
pub type LoadTicket = u64;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendState {
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// The source is decoded and ready; playback has not started yet.
    Loaded {
        ticket: LoadTicket,
        duration: Option<Duration>,
    },
    /// Opening or playing the source failed.
    Error { ticket: LoadTicket, message: String },
    /// The source played to its end.
    Completed { ticket: LoadTicket },
    /// The backend's own transport state changed.
    StateChanged {
        ticket: LoadTicket,
        state: BackendState,
    },
}

impl BackendEvent {
    pub fn ticket(&self) -> LoadTicket {
        match self {
            BackendEvent::Loaded { ticket, .. }
            | BackendEvent::Error { ticket, .. }
            | BackendEvent::Completed { ticket }
            | BackendEvent::StateChanged { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("cannot open {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("audio output unavailable: {0}")]
    Output(String),

    #[error("audio thread is gone")]
    Disconnected,
}

/// Playback capability owned exclusively by the controller.
///
/// Commands return once they are handed to the backend; outcomes of `open`
/// arrive later as `Loaded` or `Error` events.
pub trait MediaBackend {
    /// Replace the current source with `path`, prepared but paused.
    fn open(&mut self, path: &Path, ticket: LoadTicket) -> Result<(), BackendError>;
    fn play(&mut self) -> Result<(), BackendError>;
    fn pause(&mut self) -> Result<(), BackendError>;
    fn resume(&mut self) -> Result<(), BackendError>;
    fn stop(&mut self) -> Result<(), BackendError>;
    /// Position within the current source.
    fn elapsed(&self) -> Duration;
    /// Hand out the event stream. Only the first call returns `Some`.
    fn take_events(&mut self) -> Option<Receiver<BackendEvent>>;
    /// Free the output device. Blocks until the backend has shut down.
    fn release(&mut self);
}
