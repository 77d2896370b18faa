use super::*;
use std::collections::HashMap;

/// In-memory store; `fail_writes` makes every setter error out.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pub(crate) strings: HashMap<String, String>,
    pub(crate) ints: HashMap<String, i64>,
    pub(crate) fail_writes: bool,
    pub(crate) writes: usize,
}

impl MemoryStore {
    fn check_writable(&mut self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io(std::io::Error::other("read-only")));
        }
        self.writes += 1;
        Ok(())
    }
}

impl PreferenceStore for MemoryStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.strings.get(key).cloned())
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.strings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.ints.get(key).copied())
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.check_writable()?;
        self.ints.insert(key.to_string(), value);
        Ok(())
    }
}

#[test]
fn toml_store_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.toml");

    let mut store = TomlStore::open(&path);
    assert_eq!(store.get_string(LAST_FOLDER).unwrap(), None);
    store.set_string(LAST_FOLDER, "/music").unwrap();
    store.set_int(LAST_INDEX, 7).unwrap();
    store.set_string(SELECTIONS, r#"{"/music/a.mp3":false}"#).unwrap();

    let reopened = TomlStore::open(&path);
    assert_eq!(reopened.path(), path.as_path());
    assert_eq!(
        reopened.get_string(LAST_FOLDER).unwrap().as_deref(),
        Some("/music")
    );
    assert_eq!(reopened.get_int(LAST_INDEX).unwrap(), Some(7));
    assert_eq!(
        reopened.get_string(SELECTIONS).unwrap().as_deref(),
        Some(r#"{"/music/a.mp3":false}"#)
    );
}

#[test]
fn toml_store_treats_corrupt_file_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.toml");
    std::fs::write(&path, "this is = = not toml [").unwrap();

    let mut store = TomlStore::open(&path);
    assert_eq!(store.get_int(LAST_INDEX).unwrap(), None);

    store.set_int(LAST_INDEX, 1).unwrap();
    assert_eq!(TomlStore::open(&path).get_int(LAST_INDEX).unwrap(), Some(1));
}

#[test]
fn toml_store_reports_type_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.toml");
    std::fs::write(&path, "lastIndex = \"three\"\n").unwrap();

    let store = TomlStore::open(&path);
    assert!(matches!(
        store.get_int(LAST_INDEX),
        Err(StoreError::WrongType { .. })
    ));
}
