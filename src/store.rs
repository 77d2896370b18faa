//! Key-value preference storage.
//!
//! The controller persists three values: the last scanned folder, the last
//! playing index and the selection map. Anything that can hold strings and
//! integers under a key can back it.

mod toml_store;

use thiserror::Error;

pub use toml_store::TomlStore;

pub const LAST_FOLDER: &str = "lastFolder";
pub const LAST_INDEX: &str = "lastIndex";
pub const SELECTIONS: &str = "selections";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("preference {key:?} has an unexpected type")]
    WrongType { key: String },
}

pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError>;
    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError>;
}

#[cfg(test)]
pub(crate) mod tests;
