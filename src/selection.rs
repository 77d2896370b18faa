//! Persist and restore per-track selection flags.
//!
//! The flags are stored as one JSON object (`path -> bool`) under the
//! `selections` key. Tracks missing from the stored map count as selected.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::playlist::Playlist;
use crate::store::{PreferenceStore, SELECTIONS, StoreError};

/// Write every track's flag, replacing whatever was stored before.
pub fn save(playlist: &Playlist, store: &mut dyn PreferenceStore) -> Result<(), StoreError> {
    let map: BTreeMap<String, bool> = playlist
        .tracks()
        .iter()
        .map(|t| (t.path.to_string_lossy().into_owned(), t.selected))
        .collect();

    // A map of strings to bools always encodes.
    let encoded = serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string());
    store.set_string(SELECTIONS, &encoded)
}

/// Apply the stored flags to `playlist`.
///
/// An absent key leaves the playlist untouched. Unreadable or corrupt data is
/// logged and treated the same way.
pub fn restore(playlist: &mut Playlist, store: &dyn PreferenceStore) {
    let raw = match store.get_string(SELECTIONS) {
        Ok(Some(raw)) => raw,
        Ok(None) => return,
        Err(err) => {
            warn!("cannot read selections: {err}");
            return;
        }
    };

    let map: BTreeMap<String, bool> = match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(err) => {
            warn!("ignoring corrupt selections: {err}");
            return;
        }
    };

    let flags: Vec<bool> = playlist
        .tracks()
        .iter()
        .map(|t| {
            map.get(&*t.path.to_string_lossy())
                .copied()
                .unwrap_or(true)
        })
        .collect();

    for (i, selected) in flags.into_iter().enumerate() {
        playlist.set_selected(i, selected);
    }
    debug!(
        "restored selections: {}/{} selected",
        playlist.selected_count(),
        playlist.len()
    );
}
