use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use rodio::{OutputStreamBuilder, Sink};

use super::sink::create_sink;
use super::types::{BackendError, BackendEvent, BackendState, LoadTicket};

/// How often the audio thread checks whether the current sink ran dry.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub(super) enum AudioCmd {
    /// Replace the current source; answered with `Loaded` or `Error`.
    Open { path: PathBuf, ticket: LoadTicket },
    Play,
    Pause,
    Stop,
    Quit,
}

pub(super) type ElapsedHandle = Arc<Mutex<Duration>>;

struct Current {
    sink: Sink,
    ticket: LoadTicket,
    paused: bool,
}

/// Spawn the audio thread. `None` when the OS refuses; every command then
/// fails with `BackendError::Disconnected` because `rx` is dropped.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<BackendEvent>,
    elapsed: ElapsedHandle,
) -> Option<JoinHandle<()>> {
    thread::Builder::new()
        .name("folio-audio".into())
        .spawn(move || run(rx, events, elapsed))
        .map_err(|e| warn!("cannot spawn audio thread: {e}"))
        .ok()
}

fn run(rx: Receiver<AudioCmd>, events: Sender<BackendEvent>, elapsed: ElapsedHandle) {
    let stream = match OutputStreamBuilder::open_default_stream() {
        Ok(mut stream) => {
            // rodio logs to stderr when OutputStream is dropped, which would
            // draw over the TUI.
            stream.log_on_drop(false);
            Ok(stream)
        }
        Err(e) => {
            warn!("no audio output device: {e}");
            Err(e.to_string())
        }
    };

    let mut current: Option<Current> = None;

    let set_elapsed = |d: Duration| {
        if let Ok(mut e) = elapsed.lock() {
            *e = d;
        }
    };
    let emit = |event: BackendEvent| {
        // The controller may already be gone during shutdown.
        let _ = events.send(event);
    };

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(AudioCmd::Open { path, ticket }) => {
                if let Some(old) = current.take() {
                    old.sink.stop();
                }
                set_elapsed(Duration::ZERO);

                let opened = match &stream {
                    Ok(stream) => create_sink(stream, &path),
                    Err(msg) => Err(BackendError::Output(msg.clone())),
                };
                match opened {
                    Ok((sink, duration)) => {
                        debug!("opened {} (ticket {ticket})", path.display());
                        current = Some(Current {
                            sink,
                            ticket,
                            paused: true,
                        });
                        emit(BackendEvent::Loaded { ticket, duration });
                    }
                    Err(err) => emit(BackendEvent::Error {
                        ticket,
                        message: err.to_string(),
                    }),
                }
            }
            Ok(AudioCmd::Play) => {
                if let Some(c) = current.as_mut() {
                    c.sink.play();
                    c.paused = false;
                    emit(BackendEvent::StateChanged {
                        ticket: c.ticket,
                        state: BackendState::Playing,
                    });
                }
            }
            Ok(AudioCmd::Pause) => {
                if let Some(c) = current.as_mut() {
                    c.sink.pause();
                    c.paused = true;
                    emit(BackendEvent::StateChanged {
                        ticket: c.ticket,
                        state: BackendState::Paused,
                    });
                }
            }
            Ok(AudioCmd::Stop) => {
                if let Some(c) = current.take() {
                    c.sink.stop();
                    set_elapsed(Duration::ZERO);
                    emit(BackendEvent::StateChanged {
                        ticket: c.ticket,
                        state: BackendState::Stopped,
                    });
                }
            }
            Ok(AudioCmd::Quit) => {
                if let Some(c) = current.take() {
                    c.sink.stop();
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                let finished = match current.as_ref() {
                    Some(c) => {
                        set_elapsed(c.sink.get_pos());
                        !c.paused && c.sink.empty()
                    }
                    None => false,
                };
                if finished {
                    if let Some(c) = current.take() {
                        emit(BackendEvent::Completed { ticket: c.ticket });
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("audio thread exiting");
}
