use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExpansionError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value capability the expansion state is persisted through.
/// Browser local storage, a cookie or a server session all fit behind it.
pub trait ExpansionStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, ExpansionError>;
    fn save(&self, key: &str, value: &str) -> Result<(), ExpansionError>;
}

impl<S: ExpansionStore + ?Sized> ExpansionStore for &S {
    fn load(&self, key: &str) -> Result<Option<String>, ExpansionError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ExpansionError> {
        (**self).save(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryExpansionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryExpansionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry, e.g. state sent along with a request.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        store
    }
}

impl ExpansionStore for MemoryExpansionStore {
    fn load(&self, key: &str) -> Result<Option<String>, ExpansionError> {
        let entries = self.entries.lock().map_err(|_| ExpansionError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ExpansionError> {
        let mut entries = self.entries.lock().map_err(|_| ExpansionError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileExpansionStore {
    dir: PathBuf,
}

impl JsonFileExpansionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ExpansionError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(ExpansionError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl ExpansionStore for JsonFileExpansionStore {
    fn load(&self, key: &str) -> Result<Option<String>, ExpansionError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ExpansionError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }
}
