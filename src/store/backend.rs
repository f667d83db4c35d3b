use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String-keyed blob storage underneath [`super::LocalStore`].
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// One file per key inside a directory. Writes go through a temp file and a
/// rename so a crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

fn io_error(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io { key: key.to_owned(), source }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;
        let tmp = self.dir.join(format!(".{key}.tmp"));
        std::fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        std::fs::rename(&tmp, self.path_for(key)).map_err(|e| io_error(key, e))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.values().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("best6-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = scratch_dir();
        let storage = FileStorage::new(&dir);

        assert_eq!(storage.get("rounds").unwrap(), None);
        storage.set("rounds", "[]").unwrap();
        assert_eq!(storage.get("rounds").unwrap().as_deref(), Some("[]"));
        storage.set("rounds", "[1]").unwrap();
        assert_eq!(storage.get("rounds").unwrap().as_deref(), Some("[1]"));

        storage.remove("rounds").unwrap();
        storage.remove("rounds").unwrap();
        assert_eq!(storage.get("rounds").unwrap(), None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        storage.set("profileName", "Sam").unwrap();
        assert_eq!(storage.get("profileName").unwrap().as_deref(), Some("Sam"));
        storage.remove("profileName").unwrap();
        assert_eq!(storage.get("profileName").unwrap(), None);
    }
}
