//! Track model and folder ingestion.
//!
//! `scan` walks a folder, `scan_files` takes an explicit file list; both
//! probe each candidate and skip whatever cannot be read.

mod display;
mod model;
mod probe;
mod scan;

pub use model::Track;
pub use probe::{LoftyProbe, Probe, ProbeError, ProbeInfo};
pub use scan::{scan, scan_files, scan_iter};
