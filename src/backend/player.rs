use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use super::thread::{AudioCmd, ElapsedHandle, spawn_audio_thread};
use super::types::{BackendError, BackendEvent, LoadTicket, MediaBackend};

/// `MediaBackend` backed by rodio on a dedicated audio thread.
pub struct RodioBackend {
    tx: Sender<AudioCmd>,
    events: Option<Receiver<BackendEvent>>,
    elapsed: ElapsedHandle,
    join: Option<JoinHandle<()>>,
}

impl RodioBackend {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<BackendEvent>();
        let elapsed: ElapsedHandle = Arc::new(Mutex::new(Duration::ZERO));

        let join = spawn_audio_thread(rx, event_tx, elapsed.clone());

        Self {
            tx,
            events: Some(event_rx),
            elapsed,
            join,
        }
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), BackendError> {
        self.tx.send(cmd).map_err(|_| BackendError::Disconnected)
    }
}

impl MediaBackend for RodioBackend {
    fn open(&mut self, path: &Path, ticket: LoadTicket) -> Result<(), BackendError> {
        self.send(AudioCmd::Open {
            path: path.to_path_buf(),
            ticket,
        })
    }

    fn play(&mut self) -> Result<(), BackendError> {
        self.send(AudioCmd::Play)
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.send(AudioCmd::Pause)
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        self.send(AudioCmd::Play)
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        self.send(AudioCmd::Stop)
    }

    fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|d| *d).unwrap_or(Duration::ZERO)
    }

    fn take_events(&mut self) -> Option<Receiver<BackendEvent>> {
        self.events.take()
    }

    fn release(&mut self) {
        let _ = self.send(AudioCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.release();
    }
}
