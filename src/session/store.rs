//! Persisted session identifiers.
//!
//! Each identifier lives in its own small JSON file inside the state
//! directory: `assistant_data.json` holds `{"assistantId": ...}` and
//! `thread_data.json` holds `{"threadId": ...}`.

use crate::error::PersistenceError;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which remote resource an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Assistant,
    Thread,
}

impl ResourceKind {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Assistant => "assistant_data.json",
            Self::Thread => "thread_data.json",
        }
    }

    fn field(self) -> &'static str {
        match self {
            Self::Assistant => "assistantId",
            Self::Thread => "threadId",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assistant => write!(f, "assistant"),
            Self::Thread => write!(f, "thread"),
        }
    }
}

/// Storage for write-once session identifiers.
pub trait SessionStore: Send + Sync {
    fn load(&self, kind: ResourceKind) -> Result<String, PersistenceError>;
    fn save(&self, kind: ResourceKind, id: &str) -> Result<(), PersistenceError>;
    /// Drop the local record. The remote resource is left alone.
    fn forget(&self, kind: ResourceKind) -> Result<(), PersistenceError>;
}

/// JSON files in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: ResourceKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self, kind: ResourceKind) -> Result<String, PersistenceError> {
        let path = self.path_for(kind);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::Missing)
            }
            Err(e) => return Err(e.into()),
        };

        let record: Value = serde_json::from_str(&contents)
            .map_err(|e| PersistenceError::Corrupt(format!("{}: {e}", path.display())))?;
        match record[kind.field()].as_str() {
            Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
            _ => Err(PersistenceError::Corrupt(format!(
                "{}: no usable {}",
                path.display(),
                kind.field()
            ))),
        }
    }

    fn save(&self, kind: ResourceKind, id: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        let record = serde_json::json!({ (kind.field()): id });
        let contents = serde_json::to_string_pretty(&record)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        std::fs::write(self.path_for(kind), contents)?;
        Ok(())
    }

    fn forget(&self, kind: ResourceKind) -> Result<(), PersistenceError> {
        match std::fs::remove_file(self.path_for(kind)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save(ResourceKind::Thread, "thread_abc").unwrap();
        assert_eq!(store.load(ResourceKind::Thread).unwrap(), "thread_abc");

        let raw = std::fs::read_to_string(dir.path().join("thread_data.json")).unwrap();
        let v: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["threadId"], "thread_abc");
    }

    #[test]
    fn test_missing_and_corrupt_records() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(matches!(
            store.load(ResourceKind::Assistant),
            Err(PersistenceError::Missing)
        ));

        std::fs::write(dir.path().join("assistant_data.json"), "{not json").unwrap();
        assert!(matches!(
            store.load(ResourceKind::Assistant),
            Err(PersistenceError::Corrupt(_))
        ));

        std::fs::write(dir.path().join("assistant_data.json"), r#"{"threadId":"t"}"#).unwrap();
        assert!(matches!(
            store.load(ResourceKind::Assistant),
            Err(PersistenceError::Corrupt(_))
        ));
    }

    #[test]
    fn test_forget_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.save(ResourceKind::Assistant, "asst_1").unwrap();

        store.forget(ResourceKind::Assistant).unwrap();
        store.forget(ResourceKind::Assistant).unwrap();
        assert!(store.load(ResourceKind::Assistant).is_err());
    }
}
