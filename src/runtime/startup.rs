use std::env;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::App;
use crate::backend::MediaBackend;
use crate::config::{PlaybackSettings, Settings};
use crate::controller::Controller;
use crate::library::{Probe, scan, scan_files};
use crate::playlist::SortKey;
use crate::store::PreferenceStore;

/// What to load at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Folder(PathBuf),
    Files(Vec<PathBuf>),
}

/// `folio [DIR | FILE...]`. Without arguments, reopen the remembered folder
/// when it still exists, otherwise the working directory.
pub fn source_from_args(
    args: &[String],
    last_folder: Option<PathBuf>,
    playback: &PlaybackSettings,
) -> Source {
    match args {
        [] => {
            if playback.resume_last_folder {
                if let Some(dir) = last_folder.filter(|d| d.is_dir()) {
                    return Source::Folder(dir);
                }
            }
            Source::Folder(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
        }
        [one] if Path::new(one).is_dir() => Source::Folder(PathBuf::from(one)),
        many => Source::Files(many.iter().map(PathBuf::from).collect()),
    }
}

pub fn load_source<B: MediaBackend, S: PreferenceStore>(
    controller: &mut Controller<B, S>,
    app: &mut App,
    source: Source,
    settings: &Settings,
    probe: &dyn Probe,
) {
    match source {
        Source::Folder(dir) => {
            load_folder(controller, app, &dir, settings, probe);
        }
        Source::Files(paths) => load_files(controller, app, &paths, settings, probe),
    }
}

/// Scan `dir` and replace the playlist with what it holds. Returns false,
/// leaving the playlist alone, when `dir` is not a directory.
pub fn load_folder<B: MediaBackend, S: PreferenceStore>(
    controller: &mut Controller<B, S>,
    app: &mut App,
    dir: &Path,
    settings: &Settings,
    probe: &dyn Probe,
) -> bool {
    if !dir.is_dir() {
        warn!("not a folder: {}", dir.display());
        app.set_status(format!("Not a folder: {}", dir.display()));
        return false;
    }
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

    let tracks = scan(&dir, &settings.library, probe);
    info!("scanned {}: {} tracks", dir.display(), tracks.len());
    controller.load(tracks, Some(&dir));

    app.current_dir = Some(dir);
    finish_load(controller, app, settings);
    true
}

/// Load exactly `paths`, in order. Nothing is remembered as the last folder.
pub fn load_files<B: MediaBackend, S: PreferenceStore>(
    controller: &mut Controller<B, S>,
    app: &mut App,
    paths: &[PathBuf],
    settings: &Settings,
    probe: &dyn Probe,
) {
    let tracks = scan_files(paths, &settings.library, probe);
    info!("loaded {} of {} files", tracks.len(), paths.len());
    controller.load(tracks, None);

    app.current_dir = None;
    finish_load(controller, app, settings);
}

fn finish_load<B: MediaBackend, S: PreferenceStore>(
    controller: &mut Controller<B, S>,
    app: &mut App,
    settings: &Settings,
) {
    app.sort_key = SortKey::from_setting(settings.playback.default_sort);
    if let Some(key) = app.sort_key {
        controller.sort(key);
    }

    let playlist = controller.playlist();
    app.cursor = playlist.current().unwrap_or(0);
    app.follow_playback = true;
    if playlist.is_empty() {
        app.set_status("No audio files found");
    } else {
        app.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::FakeBackend;
    use crate::config::SortSetting;
    use crate::controller::PlayerState;
    use crate::library::tests::FakeProbe;
    use crate::store::tests::MemoryStore;
    use crate::store::{LAST_FOLDER, LAST_INDEX};
    use std::time::Duration;

    fn controller(store: MemoryStore) -> Controller<FakeBackend, MemoryStore> {
        Controller::new(FakeBackend::new(), store, Duration::ZERO)
    }

    fn music_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    #[test]
    fn no_args_resumes_remembered_folder() {
        let dir = tempfile::tempdir().unwrap();
        let playback = PlaybackSettings::default();

        let source = source_from_args(&[], Some(dir.path().to_path_buf()), &playback);
        assert_eq!(source, Source::Folder(dir.path().to_path_buf()));
    }

    #[test]
    fn no_args_ignores_missing_or_disabled_folder() {
        let cwd = env::current_dir().unwrap();
        let mut playback = PlaybackSettings::default();

        let source = source_from_args(&[], Some("/definitely/not/here".into()), &playback);
        assert_eq!(source, Source::Folder(cwd.clone()));

        let dir = tempfile::tempdir().unwrap();
        playback.resume_last_folder = false;
        let source = source_from_args(&[], Some(dir.path().to_path_buf()), &playback);
        assert_eq!(source, Source::Folder(cwd));
    }

    #[test]
    fn args_pick_folder_or_file_list() {
        let dir = tempfile::tempdir().unwrap();
        let playback = PlaybackSettings::default();
        let folder = dir.path().to_string_lossy().into_owned();

        assert_eq!(
            source_from_args(&[folder.clone()], None, &playback),
            Source::Folder(dir.path().to_path_buf())
        );
        assert_eq!(
            source_from_args(&["a.mp3".into(), "b.mp3".into()], None, &playback),
            Source::Files(vec!["a.mp3".into(), "b.mp3".into()])
        );
    }

    #[test]
    fn load_folder_remembers_folder_and_restores_index() {
        let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3", "notes.txt"]);
        let canonical = dir.path().canonicalize().unwrap();

        let mut store = MemoryStore::default();
        store
            .strings
            .insert(LAST_FOLDER.into(), canonical.to_string_lossy().into_owned());
        store.ints.insert(LAST_INDEX.into(), 1);

        let mut c = controller(store);
        let mut app = App::new();
        assert!(load_folder(
            &mut c,
            &mut app,
            dir.path(),
            &Settings::default(),
            &FakeProbe::default()
        ));

        assert_eq!(c.playlist().len(), 3);
        assert_eq!(c.snapshot().current_index, Some(1));
        assert_eq!(c.snapshot().state, PlayerState::Stopped);
        assert_eq!(app.cursor, 1);
        assert_eq!(app.current_dir.as_deref(), Some(canonical.as_path()));
        assert_eq!(c.last_folder(), Some(canonical));
    }

    #[test]
    fn load_folder_applies_default_sort() {
        let dir = music_dir(&["a.mp3", "b.mp3"]);
        let probe = FakeProbe::default()
            .with_tags("a.mp3", "Long", "Zed", 300)
            .with_tags("b.mp3", "Short", "Abba", 10);
        let mut settings = Settings::default();
        settings.playback.default_sort = SortSetting::Duration;

        let mut c = controller(MemoryStore::default());
        let mut app = App::new();
        load_folder(&mut c, &mut app, dir.path(), &settings, &probe);

        let titles: Vec<&str> = c.playlist().tracks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Short", "Long"]);
        assert_eq!(app.sort_key, Some(SortKey::Duration));
    }

    #[test]
    fn restart_with_default_sort_resumes_the_played_track() {
        let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
        let probe = FakeProbe::default()
            .with_tags("a.mp3", "Long", "Abba", 300)
            .with_tags("b.mp3", "Short", "Moby", 10)
            .with_tags("c.mp3", "Middle", "Zed", 100);
        let mut settings = Settings::default();
        settings.playback.default_sort = SortSetting::Duration;

        let mut c = controller(MemoryStore::default());
        let mut app = App::new();
        load_folder(&mut c, &mut app, dir.path(), &settings, &probe);
        c.play(Some(2));
        let now = std::time::Instant::now();
        for _ in 0..8 {
            c.pump(now);
        }
        let played = c.snapshot().current_track_path.clone();
        assert_eq!(played, Some(dir.path().canonicalize().unwrap().join("a.mp3")));

        let mut store = MemoryStore::default();
        store.strings = c.store().strings.clone();
        store.ints = c.store().ints.clone();
        let mut restarted = controller(store);
        let mut app = App::new();
        load_folder(&mut restarted, &mut app, dir.path(), &settings, &probe);

        let s = restarted.snapshot();
        assert_eq!(s.current_track_path, played);
        assert_eq!(s.current_index, Some(2));
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn load_folder_rejects_non_directory() {
        let mut c = controller(MemoryStore::default());
        let mut app = App::new();
        assert!(!load_folder(
            &mut c,
            &mut app,
            Path::new("/definitely/not/here"),
            &Settings::default(),
            &FakeProbe::default()
        ));
        assert!(app.status.is_some());
        assert_eq!(c.snapshot().state, PlayerState::Idle);
    }

    #[test]
    fn load_files_keeps_order_and_forgets_folder() {
        let dir = music_dir(&["a.mp3", "b.mp3"]);
        let paths = vec![dir.path().join("b.mp3"), dir.path().join("a.mp3")];

        let mut c = controller(MemoryStore::default());
        let mut app = App::new();
        load_files(&mut c, &mut app, &paths, &Settings::default(), &FakeProbe::default());

        let loaded: Vec<PathBuf> = c.playlist().tracks().iter().map(|t| t.path.clone()).collect();
        assert_eq!(loaded, paths);
        assert_eq!(c.last_folder(), None);
        assert!(app.current_dir.is_none());
    }

    #[test]
    fn empty_folder_reports_status() {
        let dir = music_dir(&["cover.jpg"]);
        let mut c = controller(MemoryStore::default());
        let mut app = App::new();
        load_folder(&mut c, &mut app, dir.path(), &Settings::default(), &FakeProbe::default());

        assert_eq!(c.snapshot().state, PlayerState::Idle);
        assert_eq!(app.status.as_deref(), Some("No audio files found"));
    }
}
