//! Utilities for creating `rodio` sinks from files.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` ready to start.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::BackendError;

/// Create a paused `Sink` for `path`, returning it with the source's total duration when known.
pub(super) fn create_sink(
    stream: &OutputStream,
    path: &Path,
) -> Result<(Sink, Option<Duration>), BackendError> {
    let open_err = |message: String| BackendError::Open {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| open_err(e.to_string()))?;
    let source = Decoder::new(BufReader::new(file)).map_err(|e| open_err(e.to_string()))?;
    let duration = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, duration))
}
