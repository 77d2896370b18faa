//! Application module: the UI model used by the TUI and runtime.
//!
//! `App` lives in `app::model` and holds cursor, prompt and status state.
//! The playlist and playback state belong to the controller.

mod model;

pub use model::*;
