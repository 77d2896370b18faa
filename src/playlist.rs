//! Playlist model: the ordered tracks and which one is current.

mod model;
mod sort;

pub use model::Playlist;
pub use sort::SortKey;
