use super::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Open(PathBuf, LoadTicket),
    Play,
    Pause,
    Resume,
    Stop,
    Release,
}

/// Records every command. `open` answers immediately on the event channel:
/// `Error` for paths marked broken, `Loaded` otherwise.
pub(crate) struct FakeBackend {
    pub(crate) calls: Vec<Call>,
    broken: HashSet<PathBuf>,
    tx: Sender<BackendEvent>,
    rx: Option<Receiver<BackendEvent>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            calls: Vec::new(),
            broken: HashSet::new(),
            tx,
            rx: Some(rx),
        }
    }

    pub(crate) fn with_broken(paths: &[&str]) -> Self {
        let mut backend = Self::new();
        backend.broken = paths.iter().map(PathBuf::from).collect();
        backend
    }

    /// A sender tests use to deliver events as if they came from the device.
    pub(crate) fn injector(&self) -> Sender<BackendEvent> {
        self.tx.clone()
    }

    pub(crate) fn opened(&self) -> Vec<PathBuf> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Open(p, _) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_ticket(&self) -> Option<LoadTicket> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Open(_, t) => Some(*t),
            _ => None,
        })
    }

    pub(crate) fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl MediaBackend for FakeBackend {
    fn open(&mut self, path: &Path, ticket: LoadTicket) -> Result<(), BackendError> {
        self.calls.push(Call::Open(path.to_path_buf(), ticket));
        let event = if self.broken.contains(path) {
            BackendEvent::Error {
                ticket,
                message: "corrupt".into(),
            }
        } else {
            BackendEvent::Loaded {
                ticket,
                duration: Some(Duration::from_secs(60)),
            }
        };
        let _ = self.tx.send(event);
        Ok(())
    }

    fn play(&mut self) -> Result<(), BackendError> {
        self.calls.push(Call::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.calls.push(Call::Pause);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        self.calls.push(Call::Resume);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        self.calls.push(Call::Stop);
        Ok(())
    }

    fn elapsed(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn take_events(&mut self) -> Option<Receiver<BackendEvent>> {
        self.rx.take()
    }

    fn release(&mut self) {
        self.calls.push(Call::Release);
    }
}

#[test]
fn event_ticket_is_reported_for_every_variant() {
    let events = [
        BackendEvent::Loaded {
            ticket: 1,
            duration: None,
        },
        BackendEvent::Error {
            ticket: 2,
            message: String::new(),
        },
        BackendEvent::Completed { ticket: 3 },
        BackendEvent::StateChanged {
            ticket: 4,
            state: BackendState::Paused,
        },
    ];
    let tickets: Vec<LoadTicket> = events.iter().map(BackendEvent::ticket).collect();
    assert_eq!(tickets, vec![1, 2, 3, 4]);
}

#[test]
fn rodio_backend_reports_unopenable_source_as_error_event() {
    let mut backend = RodioBackend::new();
    let events = backend.take_events().unwrap();
    assert!(backend.take_events().is_none());

    backend
        .open(Path::new("/definitely/not/here.mp3"), 7)
        .unwrap();

    // Either the file or the output device is missing; both surface as an error for ticket 7.
    let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(event, BackendEvent::Error { ticket: 7, .. }));

    backend.release();
    assert!(matches!(backend.play(), Err(BackendError::Disconnected)));
}
