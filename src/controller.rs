//! Playback controller: the playlist state machine.
//!
//! The controller owns the playlist, the media backend and the preference
//! store. UI code calls its transport operations and feeds it backend events
//! through `pump`; it reads state back only through `snapshot`.
//!
//! States: `Idle` (nothing loaded), `Stopped`, `Loading` (an `open` is in
//! flight), `Playing`, `Paused`, and `Exhausted` (an advance found no
//! selected, playable track).

mod machine;
mod session;

pub use machine::Controller;
pub use session::{Direction, PlaybackSession, PlayerState};
