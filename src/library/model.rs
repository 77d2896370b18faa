use std::path::PathBuf;
use std::time::Duration;

/// One playable audio file with derived metadata and its inclusion flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub display: String,
    /// Whether automatic advancement may land on this track.
    pub selected: bool,
}
