use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use toml::{Table, Value};

use super::{PreferenceStore, StoreError};

/// Flat TOML table on disk, rewritten on every change.
#[derive(Debug)]
pub struct TomlStore {
    path: PathBuf,
    table: Table,
}

impl TomlStore {
    /// Open the store at `path`. A missing or unparsable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let table = match fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<Table>(&text) {
                Ok(table) => table,
                Err(err) => {
                    warn!("ignoring corrupt state file {}: {err}", path.display());
                    Table::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no state file at {}", path.display());
                Table::new()
            }
            Err(err) => {
                warn!("cannot read state file {}: {err}", path.display());
                Table::new()
            }
        };
        Self { path, table }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string(&self.table)?;

        // Atomic replace.
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for TomlStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.table.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(StoreError::WrongType { key: key.into() }),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.table.insert(key.to_string(), Value::String(value.to_string()));
        self.persist()
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        match self.table.get(key) {
            None => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(*i)),
            Some(_) => Err(StoreError::WrongType { key: key.into() }),
        }
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.table.insert(key.to_string(), Value::Integer(value));
        self.persist()
    }
}
