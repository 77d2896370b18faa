//! Per-file metadata probing.
//!
//! The scanner asks a `Probe` for the duration and tags of every candidate
//! file. A failed probe means the file is not playable and gets skipped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::prelude::Accessor;
use lofty::read_from_path;
use thiserror::Error;

/// What a successful probe knows about a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeInfo {
    pub duration: Duration,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot probe {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },
}

pub trait Probe {
    fn probe(&self, path: &Path) -> Result<ProbeInfo, ProbeError>;
}

/// Reads container properties and tags with `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyProbe;

fn non_blank(value: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Probe for LoftyProbe {
    fn probe(&self, path: &Path) -> Result<ProbeInfo, ProbeError> {
        let tagged = read_from_path(path).map_err(|e| ProbeError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut info = ProbeInfo {
            duration: tagged.properties().duration(),
            ..ProbeInfo::default()
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            info.title = non_blank(tag.title());
            info.artist = non_blank(tag.artist());
            info.album = non_blank(tag.album());
        }

        Ok(info)
    }
}
