use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::display_from_fields;
use super::model::Track;
use super::probe::Probe;

fn allowed_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_audio_file(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Probe one candidate file. `None` when the probe fails; the caller skips it.
fn build_track(path: &Path, settings: &LibrarySettings, probe: &dyn Probe) -> Option<Track> {
    let info = match probe.probe(path) {
        Ok(info) => info,
        Err(err) => {
            debug!("skipping {}: {}", path.display(), err);
            return None;
        }
    };

    let title = info.title.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string()
    });

    let display = display_from_fields(
        path,
        &title,
        info.artist.as_deref(),
        info.album.as_deref(),
        &settings.display_fields,
        &settings.display_separator,
    );

    Some(Track {
        path: path.to_path_buf(),
        title,
        artist: info.artist,
        album: info.album,
        duration: Some(info.duration),
        display,
        selected: true,
    })
}

/// Lazily walk `dir`, yielding a `Track` for every audio file that probes cleanly.
///
/// Unreadable directory entries and files the probe rejects are skipped, never fatal.
pub fn scan_iter<'a>(
    dir: &Path,
    settings: &'a LibrarySettings,
    probe: &'a dyn Probe,
) -> impl Iterator<Item = Track> + 'a {
    let exts = allowed_extensions(settings);

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(move |e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(move |entry| {
            let path = entry.path();
            path.is_file() && is_audio_file(path, &exts)
        })
        .filter_map(move |entry| build_track(entry.path(), settings, probe))
}

/// Scan `dir` and return its tracks ordered by display name, case-insensitive.
pub fn scan(dir: &Path, settings: &LibrarySettings, probe: &dyn Probe) -> Vec<Track> {
    let mut tracks: Vec<Track> = scan_iter(dir, settings, probe).collect();
    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    tracks
}

/// Build tracks from an explicit list of files, keeping the given order.
pub fn scan_files(paths: &[PathBuf], settings: &LibrarySettings, probe: &dyn Probe) -> Vec<Track> {
    let exts = allowed_extensions(settings);

    paths
        .iter()
        .filter(|path| {
            let keep = path.is_file() && is_audio_file(path, &exts);
            if !keep {
                debug!("ignoring {}: not an audio file", path.display());
            }
            keep
        })
        .filter_map(|path| build_track(path, settings, probe))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackDisplayField;
    use crate::library::tests::FakeProbe;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let exts = allowed_extensions(&LibrarySettings::default());
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &exts));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &exts));
        assert!(is_audio_file(Path::new("/tmp/a.m4a"), &exts));
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &exts));
        assert!(is_audio_file(Path::new("/tmp/a.AAC"), &exts));
        assert!(!is_audio_file(Path::new("/tmp/a.flac"), &exts));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &exts));
        assert!(!is_audio_file(Path::new("/tmp/a"), &exts));
    }

    #[test]
    fn allowed_extensions_normalizes_dots_and_case() {
        let settings = LibrarySettings {
            extensions: vec![".MP3".into(), "  wav ".into(), "".into()],
            ..LibrarySettings::default()
        };
        assert_eq!(allowed_extensions(&settings), vec!["mp3", "wav"]);
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_by_display_case_insensitive() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.wav"), b"not a real wav").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let settings = LibrarySettings {
            display_fields: vec![TrackDisplayField::Title],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings, &FakeProbe::default());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "A");
        assert_eq!(tracks[0].display, "A");
        assert_eq!(tracks[1].title, "b");
        assert!(tracks.iter().all(|t| t.selected));
    }

    #[test]
    fn scan_skips_files_that_fail_to_probe() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.mp3"), b"x").unwrap();
        fs::write(dir.path().join("broken.mp3"), b"x").unwrap();
        fs::write(dir.path().join("also-good.m4a"), b"x").unwrap();

        let probe = FakeProbe::failing(&["broken.mp3"]);
        let tracks = scan(dir.path(), &LibrarySettings::default(), &probe);

        let names: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(names, vec!["also-good", "good"]);
    }

    #[test]
    fn scan_uses_probed_tags_and_duration() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("01.mp3"), b"x").unwrap();

        let probe = FakeProbe::default().with_tags("01.mp3", "Song", "Artist", 42);
        let tracks = scan(dir.path(), &LibrarySettings::default(), &probe);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "Artist - Song");
        assert_eq!(tracks[0].artist.as_deref(), Some("Artist"));
        assert_eq!(tracks[0].duration, Some(std::time::Duration::from_secs(42)));
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings, &FakeProbe::default());

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "visible");
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings, &FakeProbe::default());
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "root");
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir depth counts root as 0, children as 1, grandchildren as 2...
        let settings = LibrarySettings {
            max_depth: Some(2),
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings, &FakeProbe::default());

        let names: Vec<String> = tracks.iter().map(|t| t.display.clone()).collect();
        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"one".to_string()));
        assert!(!names.contains(&"two".to_string()));
    }

    #[test]
    fn scan_of_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let tracks = scan(
            &dir.path().join("does-not-exist"),
            &LibrarySettings::default(),
            &FakeProbe::default(),
        );
        assert!(tracks.is_empty());
    }

    #[test]
    fn scan_files_keeps_given_order_and_drops_non_audio() {
        let dir = tempdir().unwrap();
        let z = dir.path().join("z.mp3");
        let a = dir.path().join("a.wav");
        let txt = dir.path().join("notes.txt");
        for p in [&z, &a, &txt] {
            fs::write(p, b"x").unwrap();
        }
        let missing = dir.path().join("gone.mp3");

        let tracks = scan_files(
            &[z.clone(), txt, missing, a.clone()],
            &LibrarySettings::default(),
            &FakeProbe::default(),
        );
        let paths: Vec<PathBuf> = tracks.into_iter().map(|t| t.path).collect();
        assert_eq!(paths, vec![z, a]);
    }
}
