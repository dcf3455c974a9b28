//! Alias persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

/// Durable storage for the alias table.
pub trait AliasStore {
    fn load(&self) -> Result<BTreeMap<String, String>, PersistenceError>;
    fn save(&self, aliases: &BTreeMap<String, String>) -> Result<(), PersistenceError>;
}

/// Stores aliases as a flat, pretty-printed JSON object.
#[derive(Debug, Clone)]
pub struct JsonAliasStore {
    path: PathBuf,
}

impl JsonAliasStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl AliasStore for JsonAliasStore {
    fn load(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(|source| PersistenceError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, aliases: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(aliases).map_err(|source| {
            PersistenceError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAliasStore::new(dir.path().join("nested").join("aliases.json"));
        let mut aliases = BTreeMap::new();
        aliases.insert("gb".to_string(), "greet bob".to_string());
        store.save(&aliases).unwrap();
        assert_eq!(store.load().unwrap(), aliases);
    }

    #[test]
    fn missing_and_corrupt_files_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAliasStore::new(dir.path().join("aliases.json"));
        assert!(matches!(store.load(), Err(PersistenceError::Io { .. })));

        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Json { .. })));

        fs::write(store.path(), "[1, 2]").unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Json { .. })));
    }
}
