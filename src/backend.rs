//! Media backend seam.
//!
//! The controller drives playback through `MediaBackend` and learns about
//! asynchronous outcomes (source ready, failure, natural end) from the
//! `BackendEvent` channel. `RodioBackend` is the real implementation.

mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioBackend;
pub use types::{BackendError, BackendEvent, BackendState, LoadTicket, MediaBackend};

#[cfg(test)]
pub(crate) mod tests;
