use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Key under which the task collection is persisted.
pub const TASKS_KEY: &str = "mytodo.tasks.v1";

/// Durable string key-value storage.
pub trait StateBackend {
    /// Reads the value stored under `key`, or `None` if nothing was stored.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the value stored under `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        let mut f = match OpenOptions::new().read(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(|e| StoreError::io(&path, e))?;
        Ok(Some(s))
    }

    /// Writes to a sibling temp file first and renames it over the target, so
    /// a failed write leaves the previous contents intact.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .map_err(|e| StoreError::io(&tmp, e))?;
        f.write_all(value.as_bytes()).map_err(|e| StoreError::io(&tmp, e))?;
        f.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

/// In-memory storage, used by tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-populated with `value` under `key`.
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut backend = Self::default();
        backend.entries.insert(key.to_string(), value.into());
        backend
    }

    /// Makes every subsequent write fail, like a full or disabled storage.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("quota exceeded".into()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backend_reads_missing_key_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        assert!(backend.read(TASKS_KEY).unwrap().is_none());
    }

    #[test]
    fn file_backend_overwrites_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path().join("nested"));
        backend.write(TASKS_KEY, "[1]").unwrap();
        backend.write(TASKS_KEY, "[2]").unwrap();
        assert_eq!(backend.read(TASKS_KEY).unwrap().as_deref(), Some("[2]"));
        assert!(!dir.path().join("nested").join("mytodo.tasks.v1.json.tmp").exists());

        backend.remove(TASKS_KEY).unwrap();
        backend.remove(TASKS_KEY).unwrap();
        assert!(backend.read(TASKS_KEY).unwrap().is_none());
    }

    #[test]
    fn memory_backend_can_refuse_writes() {
        let mut backend = MemoryBackend::with_entry(TASKS_KEY, "[]");
        backend.set_fail_writes(true);
        assert!(backend.write(TASKS_KEY, "[1]").is_err());
        assert_eq!(backend.get(TASKS_KEY), Some("[]"));
    }
}
